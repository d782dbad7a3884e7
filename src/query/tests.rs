//! Tests for query module

use super::*;
use crate::types::{JsonObject, QueryOperation};
use serde_json::json;

fn object(value: serde_json::Value) -> JsonObject {
    value.as_object().cloned().unwrap()
}

// ============================================================================
// Construction Tests
// ============================================================================

#[test]
fn test_count_spec() {
    let spec = QuerySpec::count("nms:recipient");
    assert!(spec.is_count());
    assert_eq!(spec.schema, "nms:recipient");
    assert!(spec.select_fields.is_empty());
    assert_eq!(spec.start_line, None);
    assert_eq!(spec.page_size, None);
}

#[test]
fn test_select_spec() {
    let spec = QuerySpec::select("nms:recipient", vec!["@name".into()], 11, 10);
    assert_eq!(spec.operation, QueryOperation::Select);
    assert_eq!(spec.start_line, Some(11));
    assert_eq!(spec.page_size, Some(10));
}

#[test]
fn test_to_json_count_omits_window() {
    let spec = QuerySpec::count("xtk:srcSchema");
    assert_eq!(
        spec.to_json(),
        json!({"schema": "xtk:srcSchema", "operation": "count"})
    );
}

#[test]
fn test_to_json_select() {
    let spec = QuerySpec::select(
        "xtk:srcSchema",
        vec!["@namespace".into(), "@name".into(), DATA_FIELD.into()],
        1,
        DEFAULT_PAGE_SIZE,
    );
    assert_eq!(
        spec.to_json(),
        json!({
            "schema": "xtk:srcSchema",
            "operation": "select",
            "selectFields": ["@namespace", "@name", "data"],
            "startLine": 1,
            "pageSize": 10
        })
    );
}

// ============================================================================
// Merge Tests
// ============================================================================

#[test]
fn test_merge_empty_override_is_identity() {
    let base = QuerySpec::select("nms:recipient", vec!["data".into()], 1, 10);
    assert_eq!(base.clone().merged(&JsonObject::new()), base);
}

#[test]
fn test_merge_extra_keys_pass_through() {
    let base = QuerySpec::count("nms:recipient");
    let merged = base.merged(&object(json!({
        "where": {"condition": [{"expr": "@email IS NOT NULL"}]},
        "orderBy": {"node": [{"expr": "@id"}]}
    })));

    assert_eq!(
        merged.extra.get("where"),
        Some(&json!({"condition": [{"expr": "@email IS NOT NULL"}]}))
    );
    assert!(merged.extra.contains_key("orderBy"));
    assert!(merged.is_count());
}

#[test]
fn test_merge_override_wins() {
    let base = QuerySpec::select("nms:recipient", vec!["data".into()], 1, 10);
    let merged = base.merged(&object(json!({
        "selectFields": ["@id", "@email"],
        "pageSize": 50
    })));

    assert_eq!(merged.select_fields, vec!["@id", "@email"]);
    assert_eq!(merged.page_size, Some(50));
    // Base-only fields survive
    assert_eq!(merged.start_line, Some(1));
    assert_eq!(merged.schema, "nms:recipient");
}

#[test]
fn test_merge_is_shallow() {
    let mut base = QuerySpec::count("nms:recipient");
    base.extra
        .insert("where".into(), json!({"a": 1, "b": 2}));

    let merged = base.merged(&object(json!({"where": {"c": 3}})));
    assert_eq!(merged.extra.get("where"), Some(&json!({"c": 3})));
}

#[test]
fn test_merge_ignores_malformed_known_keys() {
    let base = QuerySpec::select("nms:recipient", vec!["data".into()], 1, 10);
    let merged = base.clone().merged(&object(json!({
        "pageSize": 0,
        "selectFields": "not-a-list"
    })));
    assert_eq!(merged, base);
}
