//! Record module
//!
//! Supports: JSON record lists, XML node collections
//!
//! # Overview
//!
//! Query responses come in two shapes: a JSON array of plain objects, or an
//! XML collection element whose children are walked with a
//! first-child/next-sibling cursor. [`RecordSet`] hides the difference and
//! yields borrowed [`Record`] views exposing attribute lookup and a raw
//! payload.

mod decode;
mod types;
mod xml;

pub use decode::{decode_count, decode_records, ResponseFormat};
pub use types::{Record, RecordSet, Records};
pub use xml::{XmlCursor, XmlNode};
