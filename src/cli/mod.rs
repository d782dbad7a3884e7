//! CLI module
//!
//! Command-line interface for exporting schema records.
//!
//! # Commands
//!
//! - `check` - Count records per schema and validate the destination
//! - `pull` - Export every record to one file each
//! - `schemas` - List configured schemas and their filename templates

mod commands;
mod runner;

pub use commands::{AuthMode, Cli, Commands, OutputFormat};
pub use runner::Runner;
