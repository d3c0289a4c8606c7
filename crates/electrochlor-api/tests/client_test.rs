#![allow(clippy::unwrap_used)]
// Integration tests for `ElectrochlorClient` using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use electrochlor_api::{DeviceEndpoint, ElectrochlorClient, Error, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ElectrochlorClient, DeviceEndpoint) {
    setup_with_timeout(Duration::from_secs(5)).await
}

async fn setup_with_timeout(timeout: Duration) -> (MockServer, ElectrochlorClient, DeviceEndpoint) {
    let server = MockServer::start().await;
    let addr = *server.address();
    let endpoint = DeviceEndpoint::new(addr.ip().to_string(), addr.port());
    let client = ElectrochlorClient::new(&TransportConfig::default().with_timeout(timeout)).unwrap();
    (server, client, endpoint)
}

// ── Status tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_status_unwraps_result() {
    let (server, client, endpoint) = setup().await;

    Mock::given(method("GET"))
        .and(path("/electrochlor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {
                "temp": 27.456,
                "ph": 7.31,
                "saltStatus": "NORMAL",
                "status": { "pump": true, "light": false }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let payload = client.fetch_status(&endpoint).await.unwrap();

    assert_eq!(payload.get("temp"), Some(&json!(27.456)));
    assert_eq!(payload.get("saltStatus"), Some(&json!("NORMAL")));
    assert_eq!(
        payload.keys().collect::<Vec<_>>(),
        vec!["temp", "ph", "saltStatus", "status"]
    );
}

#[tokio::test]
async fn test_fetch_status_http_error() {
    let (server, client, endpoint) = setup().await;

    Mock::given(method("GET"))
        .and(path("/electrochlor"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&server)
        .await;

    let result = client.fetch_status(&endpoint).await;

    assert!(
        matches!(result, Err(Error::Http { status: 503, .. })),
        "expected Http 503, got: {result:?}"
    );
}

#[tokio::test]
async fn test_fetch_status_invalid_body() {
    let (server, client, endpoint) = setup().await;

    Mock::given(method("GET"))
        .and(path("/electrochlor"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = client.fetch_status(&endpoint).await;

    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_fetch_status_device_error_flag() {
    let (server, client, endpoint) = setup().await;

    Mock::given(method("GET"))
        .and(path("/electrochlor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": true })))
        .mount(&server)
        .await;

    let result = client.fetch_status(&endpoint).await;

    assert!(
        matches!(result, Err(Error::DeviceReported { .. })),
        "expected DeviceReported, got: {result:?}"
    );
}

#[tokio::test]
async fn test_fetch_status_timeout() {
    let (server, client, endpoint) = setup_with_timeout(Duration::from_millis(200)).await;

    Mock::given(method("GET"))
        .and(path("/electrochlor"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "result": {} }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let result = client.fetch_status(&endpoint).await;

    assert!(
        matches!(result, Err(Error::Timeout { .. })),
        "expected Timeout, got: {result:?}"
    );
    assert!(result.unwrap_err().is_transient());
}

#[tokio::test]
async fn test_fetch_status_connection_refused() {
    let server = MockServer::builder().start().await;
    let addr = *server.address();
    drop(server);

    let client = ElectrochlorClient::new(&TransportConfig::default()).unwrap();
    let endpoint = DeviceEndpoint::new(addr.ip().to_string(), addr.port());
    let result = client.fetch_status(&endpoint).await;

    assert!(
        matches!(result, Err(Error::Transport(_))),
        "expected Transport error, got: {result:?}"
    );
}

// ── Command tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_send_command_posts_multipart_value() {
    let (server, client, endpoint) = setup().await;

    Mock::given(method("POST"))
        .and(path("/electrochlor/light"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(body_string_contains("name=\"value\""))
        .and(body_string_contains("false"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.send_command(&endpoint, "light", false).await.unwrap();
}

#[tokio::test]
async fn test_send_command_non_200_is_error() {
    let (server, client, endpoint) = setup().await;

    Mock::given(method("POST"))
        .and(path("/electrochlor/state"))
        .respond_with(ResponseTemplate::new(500).set_body_string("  relay stuck  "))
        .mount(&server)
        .await;

    let err = client.send_command(&endpoint, "state", true).await.unwrap_err();

    match err {
        Error::Http { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "relay stuck");
        }
        other => panic!("expected Http error, got: {other:?}"),
    }
}
