//! Integration tests for `LlmClient::complete`.
//!
//! Uses `wiremock` to stand up a local HTTP server for each test so no real
//! network traffic is made.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use growloop_llm::{LlmClient, LlmError};

fn test_client(server: &MockServer) -> LlmClient {
    LlmClient::new("test-key", "test-model", 512)
        .expect("failed to build test LlmClient")
        .with_base_url(&server.uri())
}

#[tokio::test]
async fn complete_returns_first_text_block() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "content": [{"type": "text", "text": "{\"ok\": true}"}]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.complete("classify this").await;

    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    assert_eq!(result.unwrap(), "{\"ok\": true}");
}

#[tokio::test]
async fn complete_skips_non_text_blocks() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "content": [
                {"type": "thinking"},
                {"type": "text", "text": "answer"}
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    assert_eq!(client.complete("prompt").await.unwrap(), "answer");
}

#[tokio::test]
async fn complete_maps_error_status_to_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(429).set_body_string("{\"error\": \"rate_limited\"}"),
        )
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.complete("prompt").await;

    match result {
        Err(LlmError::Api { status, body }) => {
            assert_eq!(status, 429);
            assert!(body.contains("rate_limited"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn complete_empty_content_is_empty_completion_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({"content": []})))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.complete("prompt").await;
    assert!(matches!(result, Err(LlmError::EmptyCompletion)));
}

#[tokio::test]
async fn complete_malformed_body_is_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.complete("prompt").await;
    assert!(matches!(result, Err(LlmError::Http(_))));
}
