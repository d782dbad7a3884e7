//! Export configuration
//!
//! The configuration document is an object keyed by schema id plus the
//! reserved `"default"` key:
//!
//! ```json
//! {
//!   "default": { "filename": "{schema}/{name}.xml" },
//!   "nms:recipient": {
//!     "filename": "recipients/{email}.xml",
//!     "queryDef": { "where": { "condition": [{ "expr": "@blackList = 0" }] } }
//!   }
//! }
//! ```
//!
//! Every non-default key is a schema that takes part in the export. The
//! `"default"` entry supplies the filename template and query override for
//! any schema id without its own entry.
//!
//! A `queryDef` is merged shallowly over the generated query and wins on
//! every key except [`RESERVED_QUERY_KEYS`] (`operation`, `startLine`),
//! which drive counting and pagination. A document setting one of them is
//! rejected at load time with an error naming the offending key.

use crate::error::{Error, Result};
use crate::query::{positive_u32, string_list, QuerySpec};
use crate::template::FilenameTemplate;
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Reserved key of the fallback entry
pub const DEFAULT_KEY: &str = "default";

/// Query keys driven by the extractor itself; an override may not set them
pub const RESERVED_QUERY_KEYS: &[&str] = &["operation", "startLine"];

// ============================================================================
// Document Types
// ============================================================================

/// One entry of the configuration document, as written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SchemaEntry {
    /// Filename template
    pub filename: String,

    /// Partial query definition merged over the generated one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_def: Option<JsonObject>,
}

// ============================================================================
// Resolved Types
// ============================================================================

/// Export settings for one schema
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaConfig {
    /// Schema id, or `"default"` for the fallback entry
    pub schema_id: String,
    /// Parsed filename template
    pub filename: FilenameTemplate,
    /// Override merged over every query for this schema
    pub query_override: JsonObject,
}

impl SchemaConfig {
    /// Create a config with no query override
    pub fn new(schema_id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            schema_id: schema_id.into(),
            filename: FilenameTemplate::new(filename),
            query_override: JsonObject::new(),
        }
    }

    /// Set the query override
    #[must_use]
    pub fn with_query_override(mut self, query_override: JsonObject) -> Self {
        self.query_override = query_override;
        self
    }

    fn from_entry(schema_id: &str, entry: SchemaEntry) -> Result<Self> {
        if entry.filename.trim().is_empty() {
            return Err(Error::invalid_value(
                format!("{schema_id}.filename"),
                "filename template must not be empty",
            ));
        }

        let query_override = entry.query_def.unwrap_or_default();
        validate_override(schema_id, &query_override)?;

        Ok(Self::new(schema_id, entry.filename).with_query_override(query_override))
    }
}

/// Schema id to export settings, with the mandatory fallback entry
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaConfigs {
    default: SchemaConfig,
    schemas: Vec<SchemaConfig>,
}

impl SchemaConfigs {
    /// Create a config set from its fallback entry
    pub fn new(default: SchemaConfig) -> Self {
        Self {
            default: SchemaConfig {
                schema_id: DEFAULT_KEY.to_string(),
                ..default
            },
            schemas: Vec::new(),
        }
    }

    /// Add or replace a schema entry
    #[must_use]
    pub fn with_schema(mut self, config: SchemaConfig) -> Self {
        self.insert(config);
        self
    }

    fn insert(&mut self, config: SchemaConfig) {
        match self
            .schemas
            .iter_mut()
            .find(|c| c.schema_id == config.schema_id)
        {
            Some(existing) => *existing = config,
            None => self.schemas.push(config),
        }
    }

    /// Load from a JSON or YAML file (chosen by extension)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read {}: {e}", path.display())))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    /// Parse from a JSON document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(content)?;
        Self::from_value(value)
    }

    /// Parse from a YAML document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let value: JsonValue = serde_yaml::from_str(content)?;
        Self::from_value(value)
    }

    /// Build from an already-parsed document, validating it
    pub fn from_value(value: JsonValue) -> Result<Self> {
        let JsonValue::Object(mut doc) = value else {
            return Err(Error::config(
                "Configuration document must be an object keyed by schema id",
            ));
        };

        let default_entry = doc
            .shift_remove(DEFAULT_KEY)
            .ok_or_else(|| Error::missing_field(DEFAULT_KEY))?;
        let default =
            SchemaConfig::from_entry(DEFAULT_KEY, parse_entry(DEFAULT_KEY, default_entry)?)?;
        let mut configs = Self::new(default);

        for (schema_id, entry) in doc {
            if schema_id.trim().is_empty() {
                return Err(Error::config("Schema id must not be empty"));
            }
            let entry = parse_entry(&schema_id, entry)?;
            configs.insert(SchemaConfig::from_entry(&schema_id, entry)?);
        }

        debug!(
            "Loaded export configuration for {} schema(s)",
            configs.schemas.len()
        );
        Ok(configs)
    }

    /// The fallback entry
    pub fn default_config(&self) -> &SchemaConfig {
        &self.default
    }

    /// Schemas taking part in the export, in document order
    pub fn schema_ids(&self) -> impl Iterator<Item = &str> {
        self.schemas.iter().map(|c| c.schema_id.as_str())
    }

    /// Number of exported schemas
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Check if no schema is configured
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Check if a schema has its own entry
    pub fn has_explicit(&self, schema_id: &str) -> bool {
        self.schemas.iter().any(|c| c.schema_id == schema_id)
    }

    /// Settings for a schema: its own entry, else the fallback entry
    pub fn lookup(&self, schema_id: &str) -> &SchemaConfig {
        self.schemas
            .iter()
            .find(|c| c.schema_id == schema_id)
            .unwrap_or(&self.default)
    }

    /// Filename template for a schema
    pub fn filename_template(&self, schema_id: &str) -> &FilenameTemplate {
        &self.lookup(schema_id).filename
    }

    /// Merge the schema's override over `base` (shallow, override wins)
    pub fn resolve_query(&self, schema_id: &str, base: QuerySpec) -> QuerySpec {
        base.merged(&self.lookup(schema_id).query_override)
    }
}

fn parse_entry(schema_id: &str, value: JsonValue) -> Result<SchemaEntry> {
    serde_json::from_value(value)
        .map_err(|e| Error::invalid_value(schema_id, format!("invalid entry: {e}")))
}

/// Reject overrides that would break pagination or that carry mistyped keys
fn validate_override(schema_id: &str, query_override: &JsonObject) -> Result<()> {
    for key in RESERVED_QUERY_KEYS {
        if query_override.contains_key(*key) {
            return Err(Error::invalid_value(
                format!("{schema_id}.queryDef.{key}"),
                "is managed by the exporter and cannot be overridden",
            ));
        }
    }

    if let Some(schema) = query_override.get("schema") {
        if !schema.is_string() {
            return Err(Error::invalid_value(
                format!("{schema_id}.queryDef.schema"),
                "must be a string",
            ));
        }
    }

    if let Some(size) = query_override.get("pageSize") {
        if positive_u32(size).is_none() {
            return Err(Error::invalid_value(
                format!("{schema_id}.queryDef.pageSize"),
                "must be a positive integer",
            ));
        }
    }

    if let Some(fields) = query_override.get("selectFields") {
        if string_list(fields).is_none() {
            return Err(Error::invalid_value(
                format!("{schema_id}.queryDef.selectFields"),
                "must be an array of strings",
            ));
        }
    }

    Ok(())
}
