//! Tests for output module

use super::*;
use crate::error::Error;
use std::path::Path;
use tempfile::tempdir;

// ============================================================================
// Path Resolution Tests
// ============================================================================

#[test]
fn test_resolve_relative_path() {
    let root = Path::new("/out");
    let path = resolve_output_path(root, "nms/recipient.xml").unwrap();
    assert_eq!(path, Path::new("/out/nms/recipient.xml"));

    let path = resolve_output_path(root, "./a.xml").unwrap();
    assert_eq!(path, Path::new("/out/./a.xml"));
}

#[test]
fn test_resolve_rejects_escaping_paths() {
    let root = Path::new("/out");

    let err = resolve_output_path(root, "../etc/passwd").unwrap_err();
    assert!(matches!(err, Error::Write { .. }));
    assert!(err.is_fatal());

    assert!(resolve_output_path(root, "a/../../b.xml").is_err());
    assert!(resolve_output_path(root, "/etc/passwd").is_err());
    assert!(resolve_output_path(root, "").is_err());
    assert!(resolve_output_path(root, "   ").is_err());
}

#[test]
fn test_resolve_allows_dots_in_names() {
    let path = resolve_output_path(Path::new("/out"), "a..b.xml").unwrap();
    assert_eq!(path, Path::new("/out/a..b.xml"));
}

// ============================================================================
// Writer Tests
// ============================================================================

#[test]
fn test_write_creates_nested_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a").join("b").join("c").join("record.xml");
    let payload = b"<srcSchema name=\"x\">\xc3\xa9</srcSchema>";

    write_file(&path, payload).unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), payload);
}

#[test]
fn test_write_overwrites_existing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("record.xml");

    write_file(&path, b"first version, longer").unwrap();
    write_file(&path, b"second").unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), b"second");
}

#[test]
fn test_write_failure_is_write_error() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "file").unwrap();

    // Parent is a regular file, so the directory cannot be created
    let err = write_file(&blocker.join("child.xml"), b"x").unwrap_err();
    assert!(matches!(err, Error::Write { .. }));
}

#[test]
fn test_record_writer_totals() {
    let dir = tempdir().unwrap();
    let mut writer = RecordWriter::new(dir.path());

    let first = writer.write("nms/a.xml", b"<a/>").unwrap();
    writer.write("nms/b.xml", b"<bb/>").unwrap();

    assert_eq!(first, dir.path().join("nms/a.xml"));
    assert_eq!(writer.files_written(), 2);
    assert_eq!(writer.bytes_written(), 9);
    assert_eq!(writer.root(), dir.path());
}

#[test]
fn test_record_writer_rejects_escape() {
    let dir = tempdir().unwrap();
    let mut writer = RecordWriter::new(dir.path().join("out"));

    assert!(writer.write("../outside.xml", b"x").is_err());
    assert!(!dir.path().join("outside.xml").exists());
    assert_eq!(writer.files_written(), 0);
}

// ============================================================================
// Preflight Tests
// ============================================================================

#[test]
fn test_ensure_empty_absent_directory() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");
    assert!(is_empty_or_absent(&missing).unwrap());
    assert!(ensure_empty(&missing).is_ok());
}

#[test]
fn test_ensure_empty_empty_directory() {
    let dir = tempdir().unwrap();
    assert!(ensure_empty(dir.path()).is_ok());
}

#[test]
fn test_ensure_empty_rejects_populated_directory() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("existing.xml"), "x").unwrap();

    let err = ensure_empty(dir.path()).unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("not empty"));
}

#[test]
fn test_ensure_empty_rejects_regular_file() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file.txt");
    std::fs::write(&file, "").unwrap();

    assert!(!is_empty_or_absent(&file).unwrap());
    assert!(ensure_empty(&file).is_err());
}
