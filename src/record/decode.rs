//! Response body decoding
//!
//! Turns a query response body into a [`RecordSet`] or a count.

use super::types::RecordSet;
use super::xml::XmlNode;
use crate::error::{Error, Result};
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};

/// Key holding the record array in an enveloped JSON response
const RECORDS_KEY: &str = "records";

/// Key or attribute holding the result of a count query
const COUNT_KEY: &str = "count";

/// Format of a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// JSON format (default)
    #[default]
    Json,
    /// XML format
    Xml,
}

impl ResponseFormat {
    /// Pick the format from a content type, sniffing the body when the
    /// header is missing or generic.
    pub fn detect(content_type: Option<&str>, body: &str) -> Self {
        if let Some(ct) = content_type {
            let ct = ct.to_ascii_lowercase();
            if ct.contains("xml") {
                return Self::Xml;
            }
            if ct.contains("json") {
                return Self::Json;
            }
        }
        if body.trim_start().starts_with('<') {
            Self::Xml
        } else {
            Self::Json
        }
    }
}

/// Decode the records of a select response
pub fn decode_records(body: &str, format: ResponseFormat) -> Result<RecordSet> {
    match format {
        ResponseFormat::Xml => Ok(RecordSet::XmlNodeCursor(XmlNode::parse(body)?)),
        ResponseFormat::Json => {
            let value: JsonValue = serde_json::from_str(body)
                .map_err(|e| Error::decode(format!("Failed to parse JSON: {e}")))?;
            match value {
                JsonValue::Array(items) => Ok(RecordSet::JsonRecordList(items)),
                JsonValue::Object(mut map) => match map.remove(RECORDS_KEY) {
                    Some(JsonValue::Array(items)) => Ok(RecordSet::JsonRecordList(items)),
                    Some(JsonValue::Null) | None => Err(Error::decode(format!(
                        "Expected a JSON array or an object with a '{RECORDS_KEY}' array"
                    ))),
                    Some(other) => Err(Error::decode(format!(
                        "'{RECORDS_KEY}' is not an array: {other}"
                    ))),
                },
                other => Err(Error::decode(format!(
                    "Expected a JSON array of records, got: {other}"
                ))),
            }
        }
    }
}

/// Decode the result of a count response
pub fn decode_count(body: &str, format: ResponseFormat) -> Result<u64> {
    match format {
        ResponseFormat::Json => {
            let value: JsonValue = serde_json::from_str(body)
                .map_err(|e| Error::decode(format!("Failed to parse JSON: {e}")))?;
            let count = value.get(COUNT_KEY).unwrap_or(&value);
            count
                .as_u64()
                .or_else(|| count.as_str().and_then(|s| s.trim().parse().ok()))
                .ok_or_else(|| Error::decode(format!("No '{COUNT_KEY}' in response: {value}")))
        }
        ResponseFormat::Xml => {
            let root = XmlNode::parse(body)?;
            root.attribute(COUNT_KEY)
                .map(str::to_string)
                .or_else(|| root.child(COUNT_KEY).map(|c| c.text.clone()))
                .unwrap_or_else(|| root.text.clone())
                .trim()
                .parse()
                .map_err(|_| Error::decode(format!("No '{COUNT_KEY}' in XML response")))
        }
    }
}
