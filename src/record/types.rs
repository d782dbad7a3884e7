//! Record and record-set types

use super::xml::{XmlCursor, XmlNode};
use crate::query::DATA_FIELD;
use crate::types::JsonValue;
use bytes::Bytes;

/// One page of records as returned by the server.
///
/// Both shapes yield the same [`Record`] view, so naming and writing code is
/// written once.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordSet {
    /// Plain list of key-value objects
    JsonRecordList(Vec<JsonValue>),
    /// XML collection element whose children are the records
    XmlNodeCursor(XmlNode),
}

impl RecordSet {
    /// An empty page
    pub fn empty() -> Self {
        Self::JsonRecordList(Vec::new())
    }

    /// Iterate over the records of this page
    pub fn iter(&self) -> Records<'_> {
        match self {
            Self::JsonRecordList(items) => Records::Json(items.iter()),
            Self::XmlNodeCursor(root) => Records::Xml(root.first_child()),
        }
    }

    /// Number of records in this page
    pub fn len(&self) -> usize {
        match self {
            Self::JsonRecordList(items) => items.len(),
            Self::XmlNodeCursor(root) => root.children.len(),
        }
    }

    /// Check if the page holds no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = Record<'a>;
    type IntoIter = Records<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the records of one page
#[derive(Debug, Clone)]
pub enum Records<'a> {
    /// Walks a JSON array
    Json(std::slice::Iter<'a, JsonValue>),
    /// Walks XML siblings
    Xml(Option<XmlCursor<'a>>),
}

impl<'a> Iterator for Records<'a> {
    type Item = Record<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Json(iter) => iter.next().map(Record::Json),
            Self::Xml(cursor) => {
                let current = cursor.take()?;
                *cursor = current.next_sibling();
                Some(Record::Xml(current.node()))
            }
        }
    }
}

/// Borrowed view of a single record
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Record<'a> {
    /// A JSON value (normally an object)
    Json(&'a JsonValue),
    /// An XML element
    Xml(&'a XmlNode),
}

impl Record<'_> {
    /// Whether the record came from an XML response
    pub fn is_xml(&self) -> bool {
        matches!(self, Self::Xml(_))
    }

    /// Resolve a named attribute.
    ///
    /// XML records are looked up by attribute, JSON records by field. A
    /// leading `@` (field expression syntax) is ignored, and JSON objects
    /// carrying `@name` keys are matched too.
    pub fn attribute(&self, name: &str) -> Option<String> {
        let bare = name.strip_prefix('@').unwrap_or(name);
        match self {
            Self::Xml(node) => node.attribute(bare).map(String::from),
            Self::Json(value) => {
                let map = value.as_object()?;
                map.get(bare)
                    .or_else(|| map.get(&format!("@{bare}")))
                    .and_then(scalar_to_string)
            }
        }
    }

    /// Raw payload written to disk for this record.
    ///
    /// JSON records carrying a string `data` field are written verbatim;
    /// other JSON records are pretty-printed. XML records are the element's
    /// source text as received (serialized only for hand-built nodes).
    pub fn payload(&self) -> Bytes {
        match self {
            Self::Xml(node) => Bytes::from(node.raw_xml()),
            Self::Json(value) => {
                if let Some(JsonValue::String(data)) = value.get(DATA_FIELD) {
                    return Bytes::from(data.clone());
                }
                let text = serde_json::to_string_pretty(value).unwrap_or_default();
                Bytes::from(text)
            }
        }
    }
}

/// Convert a scalar JSON value to a string for filename substitution
fn scalar_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}
