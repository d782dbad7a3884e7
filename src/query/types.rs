//! Query specification types

use crate::types::{JsonObject, JsonValue, QueryOperation};
use serde::{Deserialize, Serialize};

/// Number of records requested per page unless overridden
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Generic payload field selected when no attribute is needed for naming
pub const DATA_FIELD: &str = "data";

/// Structured description of what to fetch from the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySpec {
    /// Schema id, e.g. `nms:recipient`
    pub schema: String,
    /// Count or select
    pub operation: QueryOperation,
    /// Ordered field expressions to return
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub select_fields: Vec<String>,
    /// First line of the page window, 1-based
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u32>,
    /// Number of lines in the page window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    /// Filter, sort and any other keys passed through verbatim
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl QuerySpec {
    /// Create a count query for a schema
    pub fn count(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            operation: QueryOperation::Count,
            select_fields: Vec::new(),
            start_line: None,
            page_size: None,
            extra: JsonObject::new(),
        }
    }

    /// Create a select query for one page window
    pub fn select(
        schema: impl Into<String>,
        select_fields: Vec<String>,
        start_line: u32,
        page_size: u32,
    ) -> Self {
        Self {
            schema: schema.into(),
            operation: QueryOperation::Select,
            select_fields,
            start_line: Some(start_line),
            page_size: Some(page_size),
            extra: JsonObject::new(),
        }
    }

    /// Overlay `overrides` onto this spec (shallow, override wins).
    ///
    /// Known keys replace the typed fields when their value has the expected
    /// shape; every other key lands in `extra`, replacing any value already
    /// there.
    #[must_use]
    pub fn merged(mut self, overrides: &JsonObject) -> Self {
        for (key, value) in overrides {
            match key.as_str() {
                "schema" => {
                    if let Some(schema) = value.as_str() {
                        self.schema = schema.to_string();
                    }
                }
                "operation" => {
                    if let Ok(op) = serde_json::from_value(value.clone()) {
                        self.operation = op;
                    }
                }
                "selectFields" => {
                    if let Some(fields) = string_list(value) {
                        self.select_fields = fields;
                    }
                }
                "startLine" => {
                    if let Some(n) = positive_u32(value) {
                        self.start_line = Some(n);
                    }
                }
                "pageSize" => {
                    if let Some(n) = positive_u32(value) {
                        self.page_size = Some(n);
                    }
                }
                _ => {
                    self.extra.insert(key.clone(), value.clone());
                }
            }
        }
        self
    }

    /// Serialize to the JSON query definition sent over the wire
    pub fn to_json(&self) -> JsonValue {
        // Derived Serialize on plain fields and a string-keyed map cannot fail.
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }

    /// Check if this is a count query
    pub fn is_count(&self) -> bool {
        self.operation == QueryOperation::Count
    }
}

/// Read a JSON array of strings
pub(crate) fn string_list(value: &JsonValue) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(String::from))
        .collect()
}

/// Read a strictly positive integer that fits a u32
pub(crate) fn positive_u32(value: &JsonValue) -> Option<u32> {
    value
        .as_u64()
        .filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
}
