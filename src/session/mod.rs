//! Session module
//!
//! The authenticated session handle through which every query is issued.
//!
//! # Overview
//!
//! - [`QueryExecutor`] is the remote query seam: it takes a [`QuerySpec`]
//!   and returns a count or a page of records.
//! - [`HttpQueryExecutor`] implements it over HTTP.
//! - [`Session`] wraps an executor and notifies [`CallObserver`]s around each
//!   call. Observers are opt-in; [`ArchiveObserver`] is the one shipped here.
//!
//! [`QuerySpec`]: crate::query::QuerySpec

mod archive;
mod executor;
mod handle;
mod observer;

pub use archive::{archive_path, redact, spec_to_xml, unique_path, ArchiveObserver, REDACTED};
pub use executor::{HttpQueryExecutor, QueryExecutor, QueryResponse, DEFAULT_QUERY_PATH};
pub use handle::Session;
pub use observer::{CallInfo, CallObserver};

#[cfg(test)]
mod tests;
