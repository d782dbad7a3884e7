// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # campaign-cli
//!
//! Bulk export of schema records from a campaign server to local files.
//!
//! ## Features
//!
//! - **Per-schema configuration**: filename templates and query overrides,
//!   with a mandatory `"default"` entry as fallback
//! - **Filename templates**: `{name}` placeholders (and legacy `%name%`)
//!   substituted from each record's attributes
//! - **Line-window pagination**: `startLine`/`pageSize` pages until a short
//!   page is returned
//! - **JSON and XML responses**: both walked as one record sequence
//! - **Contained failures**: a failed query ends its schema, a failed write
//!   ends the run
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use campaign_cli::config::SchemaConfigs;
//! use campaign_cli::engine::Exporter;
//! use campaign_cli::http::{HttpClient, HttpClientConfig};
//! use campaign_cli::session::{HttpQueryExecutor, Session};
//!
//! #[tokio::main]
//! async fn main() -> campaign_cli::Result<()> {
//!     let configs = SchemaConfigs::from_file("campaign.json")?;
//!     let config = HttpClientConfig::builder()
//!         .base_url("https://acc.example.com")
//!         .build();
//!     let session = Session::new(HttpQueryExecutor::new(HttpClient::new(config)?));
//!
//!     let report = Exporter::new(session, configs)
//!         .pull(std::path::Path::new("export"))
//!         .await?;
//!     println!("{} records", report.total_records());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         CLI (check / pull)                      │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │  Config  │  Session  │    Engine     │ Template  │   Output    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ default  │ Auth      │ Page window   │ {name}    │ mkdir -p    │
//! │ fallback │ HTTP      │ Records       │ %name%    │ overwrite   │
//! │ override │ Archive   │ Check / Pull  │ {schema}  │ preflight   │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Authentication implementations
pub mod auth;

/// HTTP client
pub mod http;

/// Query specifications
pub mod query;

/// Records and response decoding (JSON, XML)
pub mod record;

/// Line-window pagination
pub mod pagination;

/// Record file output and destination checks
pub mod output;

/// Session handle, query execution and call observers
pub mod session;

/// Export engine
pub mod engine;

/// Export configuration
pub mod config;

/// Filename templates
pub mod template;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{SchemaConfig, SchemaConfigs};
pub use engine::{ExportOptions, Exporter};
pub use query::QuerySpec;
pub use record::{Record, RecordSet};
pub use session::{QueryExecutor, QueryResponse, Session};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
