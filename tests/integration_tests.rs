//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: configuration file → login → paginated
//! queries → one file per record

use campaign_cli::auth::AuthConfig;
use campaign_cli::config::SchemaConfigs;
use campaign_cli::engine::{ExportOptions, Exporter};
use campaign_cli::http::{HttpClient, HttpClientConfig};
use campaign_cli::session::{ArchiveObserver, HttpQueryExecutor, Session, DEFAULT_QUERY_PATH};
use campaign_cli::Error;
use serde_json::json;
use std::path::Path;
use tempfile::tempdir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

const CONFIG: &str = r#"{
    "default": { "filename": "%schema%_%name%.xml" },
    "nms:recipient": { "filename": "recipient_%name%.xml" },
    "xtk:srcSchema": {
        "filename": "{schema}/{namespace}/{name}.xml",
        "queryDef": { "where": { "condition": [{ "expr": "@namespace != 'xtk'" }] } }
    }
}"#;

fn write_config(dir: &Path) -> SchemaConfigs {
    let file = dir.join("campaign.json");
    std::fs::write(&file, CONFIG).unwrap();
    SchemaConfigs::from_file(&file).unwrap()
}

async fn login_mock(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/nl/jsp/logon.jsp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sessionToken": "tok-123"
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn session_for(server: &MockServer) -> Session {
    let config = HttpClientConfig::builder().base_url(server.uri()).build();
    let auth = AuthConfig::session(
        format!("{}/nl/jsp/logon.jsp", server.uri()),
        "admin",
        "secret",
    );
    let client = HttpClient::with_auth(config, auth).unwrap();
    client.authenticator().unwrap().login().await.unwrap();
    Session::new(HttpQueryExecutor::new(client))
}

fn recipients(prefix: &str, count: usize) -> serde_json::Value {
    let items: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            json!({
                "@name": format!("{prefix}{i}"),
                "data": format!("<recipient name=\"{prefix}{i}\"/>")
            })
        })
        .collect();
    json!({ "records": items })
}

// ============================================================================
// Pull Tests
// ============================================================================

#[tokio::test]
async fn test_pull_end_to_end() {
    let mock_server = MockServer::start().await;
    login_mock(&mock_server).await;

    // nms:recipient: one full page then a short one
    Mock::given(method("POST"))
        .and(path(DEFAULT_QUERY_PATH))
        .and(header("X-Session-Token", "tok-123"))
        .and(body_partial_json(json!({
            "schema": "nms:recipient",
            "operation": "select",
            "startLine": 1,
            "pageSize": 2,
            "selectFields": ["@name", "data"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(recipients("a", 2)))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(DEFAULT_QUERY_PATH))
        .and(body_partial_json(json!({"schema": "nms:recipient", "startLine": 3})))
        .respond_with(ResponseTemplate::new(200).set_body_json(recipients("b", 1)))
        .expect(1)
        .mount(&mock_server)
        .await;

    // xtk:srcSchema: XML response, override merged into the query
    Mock::given(method("POST"))
        .and(path(DEFAULT_QUERY_PATH))
        .and(body_partial_json(json!({
            "schema": "xtk:srcSchema",
            "startLine": 1,
            "where": { "condition": [{ "expr": "@namespace != 'xtk'" }] }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                r#"<?xml version="1.0"?>
<srcSchema-collection>
  <srcSchema namespace="nms" name="recipient" label="Recipients"/>
</srcSchema-collection>"#,
                "application/xml",
            ),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let configs = write_config(dir.path());
    let out = dir.path().join("out");

    let exporter = Exporter::new(session_for(&mock_server).await, configs)
        .with_options(ExportOptions::new().with_page_size(2));
    let report = exporter.pull(&out).await.unwrap();

    assert_eq!(report.total_records(), 4);
    assert_eq!(report.failed().count(), 0);

    let recipient = report.schema("nms:recipient").unwrap();
    assert_eq!(recipient.pages_fetched, 2);
    assert_eq!(recipient.last_page_count, 1);

    assert_eq!(
        std::fs::read_to_string(out.join("recipient_a0.xml")).unwrap(),
        r#"<recipient name="a0"/>"#
    );
    assert!(out.join("recipient_a1.xml").exists());
    assert!(out.join("recipient_b0.xml").exists());
    assert_eq!(
        std::fs::read_to_string(out.join("xtk_srcSchema/nms/recipient.xml")).unwrap(),
        r#"<srcSchema namespace="nms" name="recipient" label="Recipients"/>"#
    );
}

#[tokio::test]
async fn test_pull_contains_query_failure() {
    let mock_server = MockServer::start().await;
    login_mock(&mock_server).await;

    Mock::given(method("POST"))
        .and(path(DEFAULT_QUERY_PATH))
        .and(body_partial_json(json!({"schema": "nms:recipient"})))
        .respond_with(ResponseTemplate::new(500).set_body_string("fault"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(DEFAULT_QUERY_PATH))
        .and(body_partial_json(json!({"schema": "xtk:srcSchema"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let configs = write_config(dir.path());

    let exporter = Exporter::new(session_for(&mock_server).await, configs);
    let report = exporter.pull(&dir.path().join("out")).await.unwrap();

    let failed: Vec<&str> = report.failed().map(|s| s.schema_id.as_str()).collect();
    assert_eq!(failed, vec!["nms:recipient"]);
    assert_eq!(report.total_records(), 0);
}

#[tokio::test]
async fn test_pull_with_archive() {
    let mock_server = MockServer::start().await;
    login_mock(&mock_server).await;

    Mock::given(method("POST"))
        .and(path(DEFAULT_QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let configs = write_config(dir.path());
    let archive_root = dir.path().join("logs");

    let session = session_for(&mock_server)
        .await
        .with_observer(ArchiveObserver::new(&archive_root));
    let exporter = Exporter::new(session, configs).with_options(
        ExportOptions::new().with_schemas(vec!["nms:recipient".to_string()]),
    );
    exporter.pull(&dir.path().join("out")).await.unwrap();

    assert!(archive_root.join("archives").is_dir());
}

// ============================================================================
// Check Tests
// ============================================================================

#[tokio::test]
async fn test_check_counts_with_warning() {
    let mock_server = MockServer::start().await;
    login_mock(&mock_server).await;

    Mock::given(method("POST"))
        .and(path(DEFAULT_QUERY_PATH))
        .and(body_partial_json(json!({"schema": "nms:recipient", "operation": "count"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 12})))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(DEFAULT_QUERY_PATH))
        .and(body_partial_json(json!({"schema": "xtk:srcSchema", "operation": "count"})))
        .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let configs = write_config(dir.path());

    let exporter = Exporter::new(session_for(&mock_server).await, configs);
    let report = exporter.check(&dir.path().join("absent")).await.unwrap();

    assert_eq!(report.total(), 12);
    assert_eq!(report.warnings(), 1);
    assert!(report.counts[1].warning.as_deref().unwrap().contains("denied"));
}

#[tokio::test]
async fn test_check_non_empty_destination() {
    let mock_server = MockServer::start().await;
    login_mock(&mock_server).await;

    Mock::given(method("POST"))
        .and(path(DEFAULT_QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 1})))
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let configs = write_config(dir.path());

    let exporter = Exporter::new(session_for(&mock_server).await, configs);
    // The config file itself makes the directory non-empty
    let err = exporter.check(dir.path()).await.unwrap_err();

    assert!(matches!(err, Error::DestinationNotEmpty { .. }));
    assert!(err.to_string().contains("not empty"));
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[test]
fn test_config_file_yaml() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("campaign.yaml");
    std::fs::write(
        &file,
        "default:\n  filename: \"{schema}/{name}.xml\"\nnms:delivery:\n  filename: \"deliveries/{internalName}.xml\"\n",
    )
    .unwrap();

    let configs = SchemaConfigs::from_file(&file).unwrap();
    assert_eq!(configs.schema_ids().collect::<Vec<_>>(), vec!["nms:delivery"]);
    assert_eq!(
        configs.filename_template("nms:delivery").as_str(),
        "deliveries/{internalName}.xml"
    );
    assert_eq!(
        configs.filename_template("nms:other").as_str(),
        "{schema}/{name}.xml"
    );
}

#[test]
fn test_config_file_missing_default() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("campaign.json");
    std::fs::write(&file, r#"{"nms:recipient": {"filename": "{name}.xml"}}"#).unwrap();

    assert!(SchemaConfigs::from_file(&file).is_err());
}
