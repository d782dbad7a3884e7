//! Query module
//!
//! Builds the query definitions sent to the server.
//!
//! # Overview
//!
//! A [`QuerySpec`] is built per request from a base spec (count or one
//! paginated select window) and then overlaid with the schema's
//! `queryDef` override. The overlay is a shallow merge on the serialized
//! form: override keys replace base keys, base-only keys are kept.

mod types;

pub use types::{QuerySpec, DATA_FIELD, DEFAULT_PAGE_SIZE};
pub(crate) use types::{positive_u32, string_list};

#[cfg(test)]
mod tests;
