//! Engine types
//!
//! Options and reports for export runs.

use crate::query::DEFAULT_PAGE_SIZE;
use serde::Serialize;
use std::path::PathBuf;

/// Options for an export run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Records requested per page
    pub page_size: u32,
    /// Fail `pull` when the destination is not empty
    pub require_empty: bool,
    /// Schemas to export (empty = every configured schema)
    pub schemas: Vec<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            require_empty: false,
            schemas: Vec::new(),
        }
    }
}

impl ExportOptions {
    /// Create options with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set page size (0 is ignored)
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        if page_size > 0 {
            self.page_size = page_size;
        }
        self
    }

    /// Require an empty or absent destination before pulling
    #[must_use]
    pub fn with_require_empty(mut self, require_empty: bool) -> Self {
        self.require_empty = require_empty;
        self
    }

    /// Restrict the run to the given schemas
    #[must_use]
    pub fn with_schemas(mut self, schemas: Vec<String>) -> Self {
        self.schemas = schemas;
        self
    }
}

/// Outcome of downloading one schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaReport {
    /// Schema id
    pub schema_id: String,
    /// Records written across all pages
    pub records_written: u64,
    /// Pages examined, including a failed one
    pub pages_fetched: u32,
    /// Records in the last page examined
    pub last_page_count: usize,
    /// Query error that ended pagination, if any
    pub error: Option<String>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SchemaReport {
    /// Create an empty report for a schema
    pub fn new(schema_id: impl Into<String>) -> Self {
        Self {
            schema_id: schema_id.into(),
            ..Self::default()
        }
    }

    /// Whether every page of the schema was fetched without error
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of a `pull` run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullReport {
    /// Destination root
    pub destination: PathBuf,
    /// One report per schema, in run order
    pub schemas: Vec<SchemaReport>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl PullReport {
    /// Total records written
    pub fn total_records(&self) -> u64 {
        self.schemas.iter().map(|s| s.records_written).sum()
    }

    /// Reports of schemas that hit a query error
    pub fn failed(&self) -> impl Iterator<Item = &SchemaReport> {
        self.schemas.iter().filter(|s| !s.is_ok())
    }

    /// Find the report of a schema
    pub fn schema(&self, schema_id: &str) -> Option<&SchemaReport> {
        self.schemas.iter().find(|s| s.schema_id == schema_id)
    }
}

/// Count of one schema, or the warning raised while counting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaCount {
    /// Schema id
    pub schema_id: String,
    /// Number of records, when the count query succeeded
    pub count: Option<u64>,
    /// Warning, when it failed
    pub warning: Option<String>,
}

impl SchemaCount {
    /// A successful count
    pub fn counted(schema_id: impl Into<String>, count: u64) -> Self {
        Self {
            schema_id: schema_id.into(),
            count: Some(count),
            warning: None,
        }
    }

    /// A failed count
    pub fn failed(schema_id: impl Into<String>, warning: impl Into<String>) -> Self {
        Self {
            schema_id: schema_id.into(),
            count: None,
            warning: Some(warning.into()),
        }
    }
}

/// Outcome of a `check` run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    /// Destination root
    pub destination: PathBuf,
    /// One entry per schema, in run order
    pub counts: Vec<SchemaCount>,
}

impl CheckReport {
    /// Sum of the successful counts
    pub fn total(&self) -> u64 {
        self.counts.iter().filter_map(|c| c.count).sum()
    }

    /// Number of schemas whose count failed
    pub fn warnings(&self) -> usize {
        self.counts.iter().filter(|c| c.warning.is_some()).count()
    }
}
