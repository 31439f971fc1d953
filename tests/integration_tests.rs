//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: config → token exchange → paged
//! requests → flattened records → JSON-lines output

use clap::Parser;
use futures::StreamExt;
use personio_source::cli::{Cli, Runner};
use personio_source::http::{HttpClientConfig, RetryPolicy};
use personio_source::{
    CheckResult, ConfiguredCatalog, Connector, Error, Message, PersonioSource, Result,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::io::Write;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Fixtures
// ============================================================================

fn config(server: &MockServer) -> Value {
    json!({
        "client_id": "integration-id",
        "client_secret": "integration-secret",
        "base_url": format!("{}/v1", server.uri()),
        "start_date": "2022-01-01"
    })
}

fn source() -> PersonioSource {
    PersonioSource::new().with_http_config(
        HttpClientConfig::default()
            .with_retry(RetryPolicy::new(
                2,
                Duration::from_millis(1),
                Duration::from_millis(1),
            ))
            .unthrottled(),
    )
}

async fn mount_auth(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/v1/auth/"))
        .and(query_param("client_id", "integration-id"))
        .and(query_param("client_secret", "integration-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"token": "integration-token"}
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_employees(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/company/employees"))
        .and(header("Authorization", "Bearer integration-token"))
        .and(header("X-Personio-App-ID", "AIRBYTE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{
                "type": "Employee",
                "attributes": {
                    "id": {"label": "ID", "value": 1, "type": "integer", "universal_id": "id"},
                    "email": {"label": "Email", "value": "ada@example.com", "type": "standard"},
                    "dynamic_42": {"label": "T-shirt size", "value": "M", "type": "standard"},
                    "supervisor": {
                        "label": "Supervisor",
                        "value": {
                            "type": "Employee",
                            "attributes": {
                                "id": {"label": "ID", "value": 1, "type": "integer", "universal_id": "id"}
                            }
                        },
                        "type": "standard",
                        "universal_id": "supervisor"
                    }
                }
            }]
        })))
        .mount(server)
        .await;
}

async fn mount_attributes(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/company/employees/attributes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                {"key": "email", "label": "Email", "type": "standard", "universal_id": "email"}
            ]
        })))
        .mount(server)
        .await;
}

async fn mount_attendances(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/company/attendances"))
        .and(query_param("start_date", "2022-01-01"))
        .and(query_param("limit", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{
                "id": 1_111_111,
                "type": "AttendancePeriod",
                "attributes": {
                    "employee": 22222,
                    "date": "2022-07-14",
                    "updated_at": "2022-07-15T09:00:00+02:00"
                }
            }]
        })))
        .mount(server)
        .await;
}

async fn collect(source: &PersonioSource, config: &Value, streams: &[&str]) -> Result<Vec<Message>> {
    let catalog = source.discover(config).await?;
    let configured = ConfiguredCatalog::select(&catalog, streams)?;
    let mut messages = source.read(config, &configured).await?;

    let mut out = Vec::new();
    while let Some(msg) = messages.next().await {
        out.push(msg?);
    }
    Ok(out)
}

fn records(messages: &[Message]) -> Vec<(String, Value)> {
    messages
        .iter()
        .filter_map(|m| match m {
            Message::Record { stream, data, .. } => Some((stream.clone(), Value::Object(data.clone()))),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Source
// ============================================================================

#[tokio::test]
async fn test_read_all_streams() {
    let server = MockServer::start().await;
    // One token per resource request
    mount_auth(&server, 3).await;
    mount_employees(&server).await;
    mount_attributes(&server).await;
    mount_attendances(&server).await;

    let messages = collect(
        &source(),
        &config(&server),
        &["employees", "attributes", "attendances"],
    )
    .await
    .unwrap();

    assert_eq!(
        records(&messages),
        vec![
            (
                "employees".to_string(),
                json!({"id": 1, "email": "ada@example.com", "supervisor": {"id": 1}})
            ),
            (
                "attributes".to_string(),
                json!({"key": "email", "label": "Email", "type": "standard", "universal_id": "email"})
            ),
            (
                "attendances".to_string(),
                json!({
                    "id": 1_111_111,
                    "type": "AttendancePeriod",
                    "employee": 22222,
                    "date": "2022-07-14",
                    "updated_at": "2022-07-15T09:00:00+02:00"
                })
            ),
        ]
    );

    let states: Vec<&Message> = messages.iter().filter(|m| m.is_state()).collect();
    assert_eq!(
        states,
        vec![&Message::state(
            "attendances",
            json!({"updated_at": "2022-07-15T09:00:00+02:00"})
        )]
    );
}

#[tokio::test]
async fn test_read_selected_stream_only() {
    let server = MockServer::start().await;
    mount_auth(&server, 1).await;
    mount_attributes(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1/company/employees"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(0)
        .mount(&server)
        .await;

    let messages = collect(&source(), &config(&server), &["attributes"])
        .await
        .unwrap();
    assert_eq!(records(&messages).len(), 1);
}

#[tokio::test]
async fn test_failing_stream_ends_read() {
    let server = MockServer::start().await;
    mount_auth(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/v1/company/employees"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/company/employees/attributes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(0)
        .mount(&server)
        .await;

    let source = source();
    let config = config(&server);
    let catalog = source.discover(&config).await.unwrap();
    let mut messages = source
        .read(&config, &ConfiguredCatalog::all(&catalog))
        .await
        .unwrap();

    let mut errors = Vec::new();
    while let Some(msg) = messages.next().await {
        if let Err(e) = msg {
            errors.push(e);
        }
    }

    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], Error::HttpStatus { status: 404, .. }));
}

#[tokio::test]
async fn test_records_before_failing_page_are_delivered() {
    let server = MockServer::start().await;
    mount_auth(&server, 2).await;

    Mock::given(method("GET"))
        .and(path("/v1/company/attendances"))
        .and(query_param("offset", "200"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    let page: Vec<Value> = (0..200)
        .map(|i| json!({"id": i, "type": "AttendancePeriod", "attributes": {"employee": 1}}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/v1/company/attendances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": page})))
        .expect(1)
        .mount(&server)
        .await;

    let source = source();
    let config = config(&server);
    let catalog = source.discover(&config).await.unwrap();
    let configured = ConfiguredCatalog::select(&catalog, &["attendances"]).unwrap();
    let results: Vec<Result<Message>> = source
        .read(&config, &configured)
        .await
        .unwrap()
        .collect()
        .await;

    let records = results
        .iter()
        .filter(|r| matches!(r, Ok(Message::Record { .. })))
        .count();
    assert_eq!(records, 200);

    let errors: Vec<&Error> = results.iter().filter_map(|r| r.as_ref().err()).collect();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], Error::HttpStatus { status: 404, .. }));
    assert!(results.last().unwrap().is_err());
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let server = MockServer::start().await;
    mount_auth(&server, 2).await;

    Mock::given(method("GET"))
        .and(path("/v1/company/employees/attributes"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_attributes(&server).await;

    let messages = collect(&source(), &config(&server), &["attributes"])
        .await
        .unwrap();
    assert_eq!(records(&messages).len(), 1);
}

#[tokio::test]
async fn test_live_check() {
    let server = MockServer::start().await;
    mount_auth(&server, 1).await;

    let result = source().check_connection_live(&config(&server)).await;
    assert_eq!(result, CheckResult::success());
}

#[tokio::test]
async fn test_live_check_rejected_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "success": false,
            "error": {"message": "Wrong credentials"}
        })))
        .mount(&server)
        .await;

    let result = source().check_connection_live(&config(&server)).await;
    assert!(!result.success);
    assert!(result.message.unwrap().contains("403"));
}

#[test]
fn test_structural_check_makes_no_request() {
    let result = tokio_test::block_on(source().check(&json!({
        "client_id": "id",
        "client_secret": "secret",
        "base_url": "http://127.0.0.1:9/v1/"
    })))
    .unwrap();
    assert_eq!(result, CheckResult::success());

    let result = tokio_test::block_on(source().check(&json!({"client_secret": "secret"}))).unwrap();
    assert!(!result.success);
}

// ============================================================================
// CLI
// ============================================================================

#[tokio::test]
async fn test_cli_read_from_config_file() {
    let server = MockServer::start().await;
    mount_auth(&server, 1).await;
    mount_employees(&server).await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", config(&server)).unwrap();
    let config_path = file.path().to_str().unwrap().to_string();

    let cli = Cli::parse_from([
        "personio-source",
        "--config",
        config_path.as_str(),
        "read",
        "--streams",
        "employees",
    ]);
    let mut out = Vec::new();
    Runner::with_source(cli, source())
        .run_with_output(&mut out)
        .await
        .unwrap();

    let lines: Vec<Value> = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let records: Vec<&Value> = lines.iter().filter(|l| l["type"] == "RECORD").collect();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["record"]["stream"], "employees");
    assert_eq!(
        records[0]["record"]["data"],
        json!({"id": 1, "email": "ada@example.com", "supervisor": {"id": 1}})
    );
    assert!(lines.iter().all(|l| l["type"] == "RECORD" || l["type"] == "LOG"));
}

#[tokio::test]
async fn test_cli_max_records() {
    let server = MockServer::start().await;
    mount_auth(&server, 1).await;
    mount_attendances(&server).await;

    let config_json = config(&server).to_string();
    let cli = Cli::parse_from([
        "personio-source",
        "--config-json",
        config_json.as_str(),
        "read",
        "--streams",
        "attendances",
        "--max-records",
        "1",
    ]);
    let mut out = Vec::new();
    Runner::with_source(cli, source())
        .run_with_output(&mut out)
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().filter(|l| l.contains("\"RECORD\"")).count(), 1);
    assert_eq!(text.lines().filter(|l| l.contains("\"STATE\"")).count(), 1);
}

#[tokio::test]
async fn test_cli_live_check() {
    let server = MockServer::start().await;
    mount_auth(&server, 1).await;

    let config_json = config(&server).to_string();
    let cli = Cli::parse_from([
        "personio-source",
        "--config-json",
        config_json.as_str(),
        "check",
        "--live",
    ]);
    let mut out = Vec::new();
    Runner::with_source(cli, source())
        .run_with_output(&mut out)
        .await
        .unwrap();

    let status: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(
        status,
        json!({"type": "CONNECTION_STATUS", "connectionStatus": {"status": "SUCCEEDED"}})
    );
}
