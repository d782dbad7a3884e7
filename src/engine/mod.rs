//! Export engine module
//!
//! Paginated extraction and materialization of schema records.
//!
//! # Overview
//!
//! The engine module provides:
//! - `Exporter` - Drives `check` and `pull` over the configured schemas
//! - `ExportOptions` - Page size, schema filter, strict destination check
//! - Report types (`SchemaReport`, `PullReport`, `CheckReport`)
//!
//! Schemas are processed one after the other, each page awaited before the
//! next is requested. A failed query ends pagination for its schema and is
//! recorded in the report; a failed write aborts the run.

mod types;

pub use types::{CheckReport, ExportOptions, PullReport, SchemaCount, SchemaReport};

use crate::config::{SchemaConfigs, DEFAULT_KEY};
use crate::error::{Error, Result};
use crate::output::{ensure_empty, RecordWriter};
use crate::pagination::PageWindow;
use crate::query::QuerySpec;
use crate::session::Session;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Export engine over one session and one configuration
#[derive(Debug)]
pub struct Exporter {
    /// Session used for every query
    session: Session,
    /// Per-schema configuration
    configs: SchemaConfigs,
    /// Run options
    options: ExportOptions,
}

impl Exporter {
    /// Create an exporter with default options
    pub fn new(session: Session, configs: SchemaConfigs) -> Self {
        Self {
            session,
            configs,
            options: ExportOptions::default(),
        }
    }

    /// Set run options
    #[must_use]
    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    /// Get the session
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Get the configuration
    pub fn configs(&self) -> &SchemaConfigs {
        &self.configs
    }

    /// Get the run options
    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Schemas this run covers, in order.
    ///
    /// Without a filter, every configured schema; with one, the filtered ids
    /// (unconfigured ids use the `"default"` entry).
    pub fn schema_ids(&self) -> Result<Vec<String>> {
        if self.options.schemas.is_empty() {
            return Ok(self.configs.schema_ids().map(String::from).collect());
        }

        let mut ids: Vec<String> = Vec::new();
        for id in &self.options.schemas {
            if id == DEFAULT_KEY {
                return Err(Error::invalid_value(
                    "schema",
                    format!("'{DEFAULT_KEY}' is reserved and cannot be exported"),
                ));
            }
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
        Ok(ids)
    }

    /// Effective select query for one page window of a schema
    pub fn page_query(&self, schema_id: &str, start_line: u32) -> QuerySpec {
        let fields = self.configs.filename_template(schema_id).select_fields();
        let base = QuerySpec::select(schema_id, fields, start_line, self.options.page_size);
        self.configs.resolve_query(schema_id, base)
    }

    /// Effective count query for a schema
    pub fn count_query(&self, schema_id: &str) -> QuerySpec {
        self.configs
            .resolve_query(schema_id, QuerySpec::count(schema_id))
    }

    /// Download every record of one schema.
    ///
    /// Pages are requested until one returns fewer records than the page
    /// size. A query error counts as an empty page and is recorded in the
    /// report; write errors are returned.
    pub async fn download(&self, schema_id: &str, writer: &mut RecordWriter) -> Result<SchemaReport> {
        let start = Instant::now();
        let template = self.configs.filename_template(schema_id);
        let mut report = SchemaReport::new(schema_id);
        let mut window = PageWindow::new();

        loop {
            let spec = self.page_query(schema_id, window.start_line);
            let page_size = spec.page_size.unwrap_or(self.options.page_size);

            let count = match self.session.select(&spec).await {
                Ok(records) => {
                    for record in &records {
                        let filename = template.render(&record, schema_id);
                        writer.write(&filename, &record.payload())?;
                    }
                    records.len()
                }
                Err(e) if !e.is_fatal() => {
                    error!("{}", e);
                    report.error = Some(e.to_string());
                    0
                }
                Err(e) => return Err(e),
            };

            debug!(
                "{}: page at line {} returned {} records",
                schema_id, window.start_line, count
            );

            if window.process_page(count, page_size).is_done() {
                break;
            }
        }

        report.records_written = window.total_fetched;
        report.pages_fetched = window.pages_fetched;
        report.last_page_count = window.last_page_count;
        #[allow(clippy::cast_possible_truncation)]
        {
            report.duration_ms = start.elapsed().as_millis() as u64;
        }

        info!(
            "{}: {} records in {} pages",
            schema_id, report.records_written, report.pages_fetched
        );
        Ok(report)
    }

    /// Export every selected schema below `destination`
    pub async fn pull(&self, destination: &Path) -> Result<PullReport> {
        let start = Instant::now();

        if self.options.require_empty {
            ensure_empty(destination)?;
        }

        let schema_ids = self.schema_ids()?;
        let mut writer = RecordWriter::new(destination);
        let mut report = PullReport {
            destination: destination.to_path_buf(),
            ..PullReport::default()
        };

        for schema_id in &schema_ids {
            info!("Downloading {} to {}", schema_id, destination.display());
            report.schemas.push(self.download(schema_id, &mut writer).await?);
        }

        #[allow(clippy::cast_possible_truncation)]
        {
            report.duration_ms = start.elapsed().as_millis() as u64;
        }
        Ok(report)
    }

    /// Count the records of one schema
    pub async fn count(&self, schema_id: &str) -> Result<u64> {
        self.session.count(&self.count_query(schema_id)).await
    }

    /// Count every selected schema, then require `destination` to be empty
    /// or absent.
    ///
    /// Count failures become warnings in the report; a non-empty destination
    /// is a validation error.
    pub async fn check(&self, destination: &Path) -> Result<CheckReport> {
        let schema_ids = self.schema_ids()?;
        let mut report = CheckReport {
            destination: destination.to_path_buf(),
            ..CheckReport::default()
        };

        for schema_id in &schema_ids {
            match self.count(schema_id).await {
                Ok(count) => {
                    info!("{}: {} records", schema_id, count);
                    report.counts.push(SchemaCount::counted(schema_id, count));
                }
                Err(e) if !e.is_fatal() => {
                    warn!("Failed to count {}: {}", schema_id, e);
                    report.counts.push(SchemaCount::failed(schema_id, e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        ensure_empty(destination)?;
        Ok(report)
    }
}
