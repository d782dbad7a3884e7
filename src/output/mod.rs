//! Output module
//!
//! Materializes exported records as files under a destination root.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Resolving a computed filename against the destination root
//! - Writing one record payload per file, creating directories as needed
//! - Checking that a destination is empty or absent before an export

mod preflight;
mod writer;

pub use preflight::{ensure_empty, is_empty_or_absent};
pub use writer::{resolve_output_path, write_file, RecordWriter};

#[cfg(test)]
mod tests;
