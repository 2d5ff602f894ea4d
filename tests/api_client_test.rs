//! Integration tests for the gate pass API client.
//!
//! Covers both endpoints against a wiremock server: success paths, the
//! absent/empty/"null" sentinel handling, HTTP error statuses, and malformed
//! bodies.

use gatepass::api::{ExchangeError, GateApiClient, RefreshError, API_URL_ENV, DEFAULT_API_URL};
use serial_test::serial;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GateApiClient {
    GateApiClient::with_base_url(server.uri())
}

// ============================================================================
// Token exchange
// ============================================================================

#[tokio::test]
async fn test_exchange_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/web-app/auth/certificateLogin"))
        .and(query_param("openId", "u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "token": "abc" }
        })))
        .mount(&server)
        .await;

    let token = client_for(&server).exchange_token("u1").await.unwrap();
    assert_eq!(token, "abc");
}

#[tokio::test]
async fn test_exchange_identifier_is_percent_encoded() {
    let server = MockServer::start().await;

    // wiremock matches against the decoded query value
    Mock::given(method("GET"))
        .and(path("/web-app/auth/certificateLogin"))
        .and(query_param("openId", "user & co"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "token": "tok" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let token = client_for(&server).exchange_token("user & co").await.unwrap();
    assert_eq!(token, "tok");
}

#[tokio::test]
async fn test_exchange_token_null_literal_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/web-app/auth/certificateLogin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "token": "null" }
        })))
        .mount(&server)
        .await;

    let result = client_for(&server).exchange_token("u1").await;
    assert!(matches!(result, Err(ExchangeError::InvalidIdentifier)));
}

#[tokio::test]
async fn test_exchange_empty_token_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/web-app/auth/certificateLogin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "token": "" }
        })))
        .mount(&server)
        .await;

    let result = client_for(&server).exchange_token("u1").await;
    assert!(matches!(result, Err(ExchangeError::InvalidIdentifier)));
}

#[tokio::test]
async fn test_exchange_missing_token_field_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/web-app/auth/certificateLogin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {}
        })))
        .mount(&server)
        .await;

    let result = client_for(&server).exchange_token("u1").await;
    assert!(matches!(result, Err(ExchangeError::InvalidIdentifier)));
}

#[tokio::test]
async fn test_exchange_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/web-app/auth/certificateLogin"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = client_for(&server).exchange_token("u1").await;
    assert!(matches!(result, Err(ExchangeError::Status { status: 500 })));
}

#[tokio::test]
async fn test_exchange_malformed_json() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/web-app/auth/certificateLogin"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = client_for(&server).exchange_token("u1").await;
    assert!(matches!(result, Err(ExchangeError::Parse(_))));
}

#[tokio::test]
async fn test_exchange_connection_refused() {
    // Port that is very unlikely to be in use
    let client = GateApiClient::with_base_url("http://127.0.0.1:59999".to_string());
    let result = client.exchange_token("u1").await;
    assert!(matches!(result, Err(ExchangeError::Network(_))));
}

// ============================================================================
// Pass code refresh
// ============================================================================

#[tokio::test]
async fn test_refresh_success_sends_satoken_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pms/welcome/make-qrcode"))
        .and(header("satoken", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": "PAYLOAD123"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let payload = client_for(&server).fetch_pass_code("abc").await.unwrap();
    assert_eq!(payload, "PAYLOAD123");
}

#[tokio::test]
async fn test_refresh_null_payload_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pms/welcome/make-qrcode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": "null"
        })))
        .mount(&server)
        .await;

    let result = client_for(&server).fetch_pass_code("abc").await;
    assert!(matches!(result, Err(RefreshError::EmptyPayload)));
}

#[tokio::test]
async fn test_refresh_absent_payload_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pms/welcome/make-qrcode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": null
        })))
        .mount(&server)
        .await;

    let result = client_for(&server).fetch_pass_code("abc").await;
    assert!(matches!(result, Err(RefreshError::EmptyPayload)));
}

#[tokio::test]
async fn test_refresh_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pms/welcome/make-qrcode"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client_for(&server).fetch_pass_code("abc").await;
    assert!(matches!(result, Err(RefreshError::Status { status: 401 })));
}

#[tokio::test]
async fn test_refresh_malformed_json() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pms/welcome/make-qrcode"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client_for(&server).fetch_pass_code("abc").await;
    assert!(matches!(result, Err(RefreshError::Parse(_))));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
#[serial]
fn test_from_env_override() {
    std::env::set_var(API_URL_ENV, "http://localhost:9000");
    let client = GateApiClient::from_env();
    assert_eq!(client.base_url(), "http://localhost:9000");
    std::env::remove_var(API_URL_ENV);
}

#[test]
#[serial]
fn test_from_env_default() {
    std::env::remove_var(API_URL_ENV);
    let client = GateApiClient::from_env();
    assert_eq!(client.base_url(), DEFAULT_API_URL);
}
