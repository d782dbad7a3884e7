//! Filename templates
//!
//! A filename template is plain text with named placeholders that are
//! substituted per record, e.g. `{namespace}/{name}.xml`.
//!
//! One template language with two declared delimiter pairs:
//! - `{name}` is the canonical form (any run of non-`}` characters),
//! - `%name%` is accepted as the legacy spelling of the same token
//!   (identifier characters only, so literal percent signs survive).
//!
//! `{schema}` always resolves to the exported schema id, with `:` replaced
//! by `_`. Every other name is looked up on the record; names that do not
//! resolve are replaced by the empty string.

use crate::record::Record;
use crate::query::DATA_FIELD;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Placeholder resolved from the run context rather than the record
pub const SCHEMA_PLACEHOLDER: &str = "schema";

/// Regex for matching placeholders: {name} or %name%
static PLACEHOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([^}]+?)\}|%([A-Za-z][A-Za-z0-9_]*?)%").unwrap()
});

/// Name captured by either delimiter pair
fn placeholder_name<'t>(caps: &Captures<'t>) -> &'t str {
    caps.get(1)
        .or_else(|| caps.get(2))
        .map_or("", |m| m.as_str())
}

/// Replace every placeholder in one pass.
///
/// `resolve` returns `None` to leave a token untouched.
fn substitute(template: &str, mut resolve: impl FnMut(&str) -> Option<String>) -> String {
    PLACEHOLDER_REGEX
        .replace_all(template, |caps: &Captures<'_>| {
            resolve(placeholder_name(caps)).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Extract all placeholder names from a template, in order of appearance
pub fn extract_placeholders(template: &str) -> Vec<String> {
    PLACEHOLDER_REGEX
        .captures_iter(template)
        .map(|caps| placeholder_name(&caps).to_string())
        .collect()
}

/// Substitute the given placeholders with values read from `record`.
///
/// Missing attributes become empty strings; tokens whose name is not in
/// `placeholders` are left as they are. Never fails.
pub fn compute_filename(template: &str, placeholders: &[String], record: &Record<'_>) -> String {
    substitute(template, |name| {
        placeholders
            .iter()
            .any(|p| p == name)
            .then(|| record.attribute(name).unwrap_or_default())
    })
}

/// Schema id as it appears in filenames
pub fn schema_token(schema_id: &str) -> String {
    schema_id.replace(':', "_")
}

/// A parsed filename template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameTemplate {
    source: String,
    placeholders: Vec<String>,
}

impl FilenameTemplate {
    /// Parse a template string
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let placeholders = extract_placeholders(&source);
        Self {
            source,
            placeholders,
        }
    }

    /// The template text
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Placeholder names in order of appearance
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Distinct placeholder names that must be read from records
    pub fn record_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = Vec::new();
        for name in &self.placeholders {
            if name != SCHEMA_PLACEHOLDER && !fields.contains(name) {
                fields.push(name.clone());
            }
        }
        fields
    }

    /// Field expressions to select so that every record can be named and
    /// written: one `@attr` per record placeholder, then the payload field.
    pub fn select_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = self
            .record_fields()
            .into_iter()
            .filter(|f| f != DATA_FIELD)
            .map(|f| if f.starts_with('@') { f } else { format!("@{f}") })
            .collect();
        fields.push(DATA_FIELD.to_string());
        fields
    }

    /// Compute the filename for one record of `schema_id`
    pub fn render(&self, record: &Record<'_>, schema_id: &str) -> String {
        substitute(&self.source, |name| {
            Some(if name == SCHEMA_PLACEHOLDER {
                schema_token(schema_id)
            } else {
                record.attribute(name).unwrap_or_default()
            })
        })
    }
}

impl std::fmt::Display for FilenameTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}
