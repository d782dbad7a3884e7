//! Record file writer
//!
//! Writes record payloads to files below an output root.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Resolve a computed filename against `root`.
///
/// Empty names, absolute paths and `..` components would write outside the
/// output tree and are rejected as write errors.
pub fn resolve_output_path(root: &Path, filename: &str) -> Result<PathBuf> {
    let relative = Path::new(filename);
    if filename.trim().is_empty() {
        return Err(Error::write(root, "Computed filename is empty"));
    }

    for component in relative.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                return Err(Error::write(
                    root.join(relative),
                    "Filename must not contain '..'",
                ));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(Error::write(relative, "Filename must be relative"));
            }
        }
    }

    Ok(root.join(relative))
}

/// Write `payload` to `path`, creating parent directories and overwriting
/// any existing file.
pub fn write_file(path: &Path, payload: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            Error::write(parent, format!("Failed to create directory: {e}"))
        })?;
    }

    fs::write(path, payload).map_err(|e| Error::write(path, format!("Failed to write file: {e}")))
}

/// Writes records below a destination root and keeps running totals
#[derive(Debug, Clone)]
pub struct RecordWriter {
    /// Destination root
    root: PathBuf,
    /// Number of files written
    files_written: usize,
    /// Number of payload bytes written
    bytes_written: u64,
}

impl RecordWriter {
    /// Create a writer rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files_written: 0,
            bytes_written: 0,
        }
    }

    /// Destination root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write one record payload under its computed filename.
    ///
    /// Returns the full path written.
    pub fn write(&mut self, filename: &str, payload: &[u8]) -> Result<PathBuf> {
        let path = resolve_output_path(&self.root, filename)?;
        write_file(&path, payload)?;

        self.files_written += 1;
        self.bytes_written += payload.len() as u64;
        debug!("Wrote {} ({} bytes)", path.display(), payload.len());
        Ok(path)
    }

    /// Get the number of files written so far
    #[must_use]
    pub fn files_written(&self) -> usize {
        self.files_written
    }

    /// Get the number of payload bytes written so far
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}
