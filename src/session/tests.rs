//! Tests for session module

use super::*;
use crate::error::{Error, Result};
use crate::query::QuerySpec;
use crate::record::RecordSet;
use crate::http::{HttpClient, HttpClientConfig};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::json;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

/// Executor answering every select with the same page and every count with 2
struct FixedExecutor {
    fail: bool,
}

#[async_trait]
impl QueryExecutor for FixedExecutor {
    async fn execute(&self, spec: &QuerySpec) -> Result<QueryResponse> {
        if self.fail {
            return Err(Error::http_status(500, "boom"));
        }
        if spec.is_count() {
            Ok(QueryResponse::Count(2))
        } else {
            Ok(QueryResponse::Records(RecordSet::JsonRecordList(vec![
                json!({"name": "a", "password": "hunter2"}),
            ])))
        }
    }
}

/// Observer recording event names
#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl CallObserver for Recorder {
    fn on_call(&self, call: &CallInfo<'_>) {
        self.events.lock().unwrap().push(format!("call:{}", call.id));
    }

    fn on_success(&self, call: &CallInfo<'_>, _response: &QueryResponse) {
        self.events.lock().unwrap().push(format!("ok:{}", call.id));
    }

    fn on_failure(&self, call: &CallInfo<'_>, _error: &Error) {
        self.events.lock().unwrap().push(format!("err:{}", call.id));
    }
}

fn files_under(root: &Path) -> Vec<std::path::PathBuf> {
    let mut found = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                found.push(path);
            }
        }
    }
    found.sort();
    found
}

// ============================================================================
// Session Tests
// ============================================================================

#[tokio::test]
async fn test_session_count_and_select() {
    let session = Session::new(FixedExecutor { fail: false });

    assert_eq!(session.count(&QuerySpec::count("nms:recipient")).await.unwrap(), 2);

    let spec = QuerySpec::select("nms:recipient", vec!["data".into()], 1, 10);
    let page = session.select(&spec).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(session.call_count(), 2);
}

#[tokio::test]
async fn test_session_wraps_failures_as_query_errors() {
    let session = Session::new(FixedExecutor { fail: true });
    let err = session
        .count(&QuerySpec::count("nms:recipient"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Query { ref schema, .. } if schema == "nms:recipient"));
    assert!(!err.is_fatal());
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_session_notifies_observers() {
    let recorder = Arc::new(Recorder::default());
    let session = Session::new(FixedExecutor { fail: false })
        .with_shared_observer(recorder.clone());

    session.count(&QuerySpec::count("a:b")).await.unwrap();
    session.count(&QuerySpec::count("a:c")).await.unwrap();

    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(events, vec!["call:1", "ok:1", "call:2", "ok:2"]);
}

#[tokio::test]
async fn test_session_notifies_failures() {
    let recorder = Arc::new(Recorder::default());
    let session = Session::new(FixedExecutor { fail: true })
        .with_shared_observer(recorder.clone());

    assert!(session.count(&QuerySpec::count("a:b")).await.is_err());
    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(events, vec!["call:1", "err:1"]);
}

#[tokio::test]
async fn test_select_on_count_response_is_query_error() {
    let session = Session::new(FixedExecutor { fail: false });
    let err = session.select(&QuerySpec::count("a:b")).await.unwrap_err();
    assert!(matches!(err, Error::Query { .. }));
}

// ============================================================================
// Archive Tests
// ============================================================================

#[test]
fn test_archive_path_layout() {
    let at = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap()
        + chrono::Duration::milliseconds(42);
    let path = archive_path(Path::new("/tmp/run"), &at, "request");
    assert_eq!(
        path,
        Path::new("/tmp/run/archives/2024/03/07/09-05-02_042-request.xml")
    );
}

#[test]
fn test_redact_nested_credentials() {
    let value = json!({
        "schema": "nms:recipient",
        "sessionToken": "abc",
        "auth": {"Password": "pw", "user": "admin"},
        "items": [{"client_secret": "s"}]
    });

    let redacted = redact(&value);
    assert_eq!(redacted["schema"], "nms:recipient");
    assert_eq!(redacted["sessionToken"], REDACTED);
    assert_eq!(redacted["auth"]["Password"], REDACTED);
    assert_eq!(redacted["auth"]["user"], "admin");
    assert_eq!(redacted["items"][0]["client_secret"], REDACTED);
}

#[test]
fn test_spec_to_xml() {
    let spec = QuerySpec::select(
        "nms:recipient",
        vec!["@name".into(), "data".into()],
        11,
        10,
    );
    let node = spec_to_xml(&spec);

    assert_eq!(node.name, "queryDef");
    assert_eq!(node.attribute("schema"), Some("nms:recipient"));
    assert_eq!(node.attribute("operation"), Some("select"));
    assert_eq!(node.attribute("startLine"), Some("11"));
    let fields: Vec<&str> = node
        .children
        .iter()
        .filter(|c| c.name == "selectFields")
        .map(|c| c.text.as_str())
        .collect();
    assert_eq!(fields, vec!["@name", "data"]);
}

#[tokio::test]
async fn test_archive_observer_writes_request_and_response() {
    let dir = tempdir().unwrap();
    let session = Session::new(FixedExecutor { fail: false })
        .with_observer(ArchiveObserver::new(dir.path()));

    let spec = QuerySpec::select("nms:recipient", vec!["data".into()], 1, 10);
    session.select(&spec).await.unwrap();

    let files = files_under(&dir.path().join("archives"));
    assert_eq!(files.len(), 2);

    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert!(names.iter().any(|n| n.ends_with("-request.xml")));
    assert!(names.iter().any(|n| n.ends_with("-response.xml")));

    for file in &files {
        let content = std::fs::read_to_string(file).unwrap();
        assert!(!content.contains("hunter2"));
    }
}

#[test]
fn test_unique_path_skips_taken_names() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("09-05-02_042-request.xml");
    assert_eq!(unique_path(first.clone()), first);

    std::fs::write(&first, "a").unwrap();
    let second = unique_path(first.clone());
    assert_eq!(second, dir.path().join("09-05-02_042-request-2.xml"));

    std::fs::write(&second, "b").unwrap();
    assert_eq!(
        unique_path(first),
        dir.path().join("09-05-02_042-request-3.xml")
    );
}

#[test]
fn test_archive_observer_keeps_every_event() {
    let dir = tempdir().unwrap();
    let observer = ArchiveObserver::new(dir.path());
    let spec = QuerySpec::count("nms:recipient");

    for id in 1..=5 {
        observer.on_call(&CallInfo { id, spec: &spec });
    }

    assert_eq!(files_under(&dir.path().join("archives")).len(), 5);
}

#[tokio::test]
async fn test_archive_observer_writes_fault() {
    let dir = tempdir().unwrap();
    let session = Session::new(FixedExecutor { fail: true })
        .with_observer(ArchiveObserver::new(dir.path()));

    let _ = session.count(&QuerySpec::count("nms:recipient")).await;

    let files = files_under(&dir.path().join("archives"));
    let fault = files
        .iter()
        .find(|p| p.to_string_lossy().ends_with("-fault.xml"))
        .unwrap();
    let content = std::fs::read_to_string(fault).unwrap();
    assert!(content.contains("nms:recipient"));
}

#[tokio::test]
async fn test_no_archive_without_observer() {
    let dir = tempdir().unwrap();
    let session = Session::new(FixedExecutor { fail: false });
    session.count(&QuerySpec::count("a:b")).await.unwrap();
    assert!(!dir.path().join("archives").exists());
}

// ============================================================================
// HTTP Executor Tests
// ============================================================================

fn executor_for(server: &MockServer) -> HttpQueryExecutor {
    let config = HttpClientConfig::builder().base_url(server.uri()).build();
    HttpQueryExecutor::new(HttpClient::new(config).unwrap())
}

#[tokio::test]
async fn test_http_executor_count_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(DEFAULT_QUERY_PATH))
        .and(body_partial_json(json!({"schema": "nms:recipient", "operation": "count"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 42})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = executor_for(&mock_server)
        .execute(&QuerySpec::count("nms:recipient"))
        .await
        .unwrap();
    assert_eq!(response, QueryResponse::Count(42));
}

#[tokio::test]
async fn test_http_executor_select_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/custom/query"))
        .and(body_partial_json(json!({"startLine": 11, "pageSize": 10})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "a", "data": "<a/>"},
            {"name": "b", "data": "<b/>"}
        ])))
        .mount(&mock_server)
        .await;

    let executor = executor_for(&mock_server).with_query_path("/custom/query");
    let spec = QuerySpec::select("nms:recipient", vec!["@name".into(), "data".into()], 11, 10);
    let records = executor.execute(&spec).await.unwrap().into_records().unwrap();

    assert!(matches!(records, RecordSet::JsonRecordList(_)));
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_http_executor_select_xml() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(DEFAULT_QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<srcSchema-collection><srcSchema name="a"/><srcSchema name="b"/></srcSchema-collection>"#,
            "text/xml",
        ))
        .mount(&mock_server)
        .await;

    let spec = QuerySpec::select("xtk:srcSchema", vec!["data".into()], 1, 10);
    let records = executor_for(&mock_server)
        .execute(&spec)
        .await
        .unwrap()
        .into_records()
        .unwrap();

    let names: Vec<Option<String>> = records.iter().map(|r| r.attribute("name")).collect();
    assert_eq!(names, vec![Some("a".into()), Some("b".into())]);
}

#[tokio::test]
async fn test_http_executor_content_type_wins_over_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(DEFAULT_QUERY_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<count>4</count>", "application/json"),
        )
        .mount(&mock_server)
        .await;

    let err = executor_for(&mock_server)
        .execute(&QuerySpec::count("nms:recipient"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_http_executor_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(DEFAULT_QUERY_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("SOAP fault"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = Session::new(executor_for(&mock_server));
    let err = session
        .count(&QuerySpec::count("nms:recipient"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Query { .. }));
    assert!(err.to_string().contains("SOAP fault"));
}
