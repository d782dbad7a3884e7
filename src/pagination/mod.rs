//! Pagination module
//!
//! Line-window pagination: each page is requested as `startLine`/`pageSize`
//! (1-based), and a page shorter than `pageSize` is the last one.
//!
//! # Overview
//!
//! [`PageWindow`] tracks the current window for one schema and decides,
//! from the number of records a page returned, whether another page must be
//! requested.

mod types;

pub use types::{NextPage, PageWindow, FIRST_LINE};
