//! Destination checks run before an export

use crate::error::{Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Check whether `path` is absent or an empty directory.
///
/// An existing regular file counts as non-empty.
pub fn is_empty_or_absent(path: &Path) -> Result<bool> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(e.into()),
    };

    if !metadata.is_dir() {
        return Ok(false);
    }
    Ok(fs::read_dir(path)?.next().is_none())
}

/// Fail with a validation error if `path` exists and is not empty
pub fn ensure_empty(path: &Path) -> Result<()> {
    if is_empty_or_absent(path)? {
        Ok(())
    } else {
        Err(Error::not_empty(path))
    }
}
