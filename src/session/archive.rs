//! Archiving observer
//!
//! Writes every request, response and fault of a session to
//! `<root>/archives/YYYY/MM/DD/HH-MM-SS_mmm-<kind>.xml`. Events of the same
//! kind within one millisecond get a `-2`, `-3`, ... suffix.

use super::executor::QueryResponse;
use super::observer::{CallInfo, CallObserver};
use crate::error::Error;
use crate::output::write_file;
use crate::query::QuerySpec;
use crate::record::{RecordSet, XmlNode};
use crate::types::JsonValue;
use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Replacement for redacted values
pub const REDACTED: &str = "***";

/// Key fragments marking a value as a credential
const SENSITIVE_KEYS: &[&str] = &["password", "token", "secret", "credential"];

/// Path of an archive file for an event of `kind` at `at`
pub fn archive_path<Tz>(root: &Path, at: &DateTime<Tz>, kind: &str) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let stamp = at.format("archives/%Y/%m/%d/%H-%M-%S_%3f");
    root.join(format!("{stamp}-{kind}.xml"))
}

/// `path` if it is free, else the first free `<stem>-<n>.<ext>` from n = 2
pub fn unique_path(path: PathBuf) -> PathBuf {
    if !path.exists() {
        return path;
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned());

    let mut n: u32 = 2;
    loop {
        let name = match &extension {
            Some(ext) => format!("{stem}-{n}.{ext}"),
            None => format!("{stem}-{n}"),
        };
        let candidate = path.with_file_name(name);
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Replace the values of credential-looking keys, recursively
pub fn redact(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => JsonValue::Object(
            map.iter()
                .map(|(k, v)| {
                    let key = k.to_ascii_lowercase();
                    let v = if SENSITIVE_KEYS.iter().any(|s| key.contains(s)) {
                        JsonValue::String(REDACTED.to_string())
                    } else {
                        redact(v)
                    };
                    (k.clone(), v)
                })
                .collect(),
        ),
        JsonValue::Array(items) => JsonValue::Array(items.iter().map(redact).collect()),
        other => other.clone(),
    }
}

/// Render a JSON value as an element: scalars become attributes, arrays
/// become repeated children, nested objects become children.
fn json_to_xml(name: &str, value: &JsonValue) -> XmlNode {
    let mut node = XmlNode::new(name);
    match value {
        JsonValue::Object(map) => {
            for (key, child) in map {
                match child {
                    JsonValue::Null => {}
                    JsonValue::Array(items) => {
                        for item in items {
                            node.children.push(json_to_xml(key, item));
                        }
                    }
                    JsonValue::Object(_) => node.children.push(json_to_xml(key, child)),
                    JsonValue::String(s) => node.attributes.push((key.clone(), s.clone())),
                    scalar => node.attributes.push((key.clone(), scalar.to_string())),
                }
            }
        }
        JsonValue::String(s) => node.text = s.clone(),
        JsonValue::Null => {}
        scalar => node.text = scalar.to_string(),
    }
    node
}

/// Render a query definition for archiving, credentials redacted
pub fn spec_to_xml(spec: &QuerySpec) -> XmlNode {
    json_to_xml("queryDef", &redact(&spec.to_json()))
}

fn response_to_xml(response: &QueryResponse) -> XmlNode {
    match response {
        QueryResponse::Count(n) => XmlNode::new("response").with_attribute("count", n.to_string()),
        QueryResponse::Records(RecordSet::XmlNodeCursor(root)) => root.clone(),
        QueryResponse::Records(RecordSet::JsonRecordList(items)) => {
            let mut node = XmlNode::new("response");
            node.children = items
                .iter()
                .map(|item| json_to_xml("record", &redact(item)))
                .collect();
            node
        }
    }
}

/// Observer that archives every call to disk
#[derive(Debug, Clone)]
pub struct ArchiveObserver {
    root: PathBuf,
}

impl ArchiveObserver {
    /// Archive below `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Archive root
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn archive(&self, kind: &str, node: &XmlNode) {
        let path = unique_path(archive_path(&self.root, &Local::now(), kind));
        match write_file(&path, node.raw_xml().as_bytes()) {
            Ok(()) => debug!("Archived {} to {}", kind, path.display()),
            Err(e) => warn!("Failed to archive {}: {}", kind, e),
        }
    }
}

impl CallObserver for ArchiveObserver {
    fn on_call(&self, call: &CallInfo<'_>) {
        self.archive("request", &spec_to_xml(call.spec));
    }

    fn on_success(&self, _call: &CallInfo<'_>, response: &QueryResponse) {
        self.archive("response", &response_to_xml(response));
    }

    fn on_failure(&self, call: &CallInfo<'_>, error: &Error) {
        let fault = XmlNode::new("fault")
            .with_attribute("schema", call.spec.schema.clone())
            .with_attribute("message", error.to_string());
        self.archive("fault", &fault);
    }
}
