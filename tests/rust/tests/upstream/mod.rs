//! Upstream error taxonomy as seen through tool results
//!
//! The adapter's typed errors are asserted at the dispatcher boundary,
//! where their human-readable form is what the calling agent reads.

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskdeck_core::UpstreamError;
use tests::helpers::{catalog_registry, upstream_for, TEST_TOKEN};

async fn get_task_error_text(status: u16) -> String {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/tasks/t1"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;

    let registry = catalog_registry(&server);
    let result = registry
        .dispatch("get_task", Some(json!({"task_id": "t1"})))
        .await
        .unwrap();

    assert!(result.is_error, "status {} must be an error result", status);
    result.text
}

#[tokio::test]
async fn test_401_mentions_invalid_or_expired_without_credential() {
    let text = get_task_error_text(401).await;
    assert!(text.contains("invalid") || text.contains("expired"));
    assert!(!text.contains(TEST_TOKEN));
}

#[tokio::test]
async fn test_403_and_404_collapse_to_identical_text() {
    // Two scenarios, one expected message: the caller cannot tell a denied
    // resource from a missing one.
    let forbidden = get_task_error_text(403).await;
    let missing = get_task_error_text(404).await;

    assert_eq!(forbidden, "not found or invalid id");
    assert_eq!(missing, forbidden);
}

#[tokio::test]
async fn test_429_mentions_rate_limit() {
    let text = get_task_error_text(429).await;
    assert!(text.contains("rate limited"));
}

#[tokio::test]
async fn test_5xx_carries_status_reason_and_bounded_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/tasks/t1"))
        .respond_with(ResponseTemplate::new(503).set_body_string("y".repeat(5000)))
        .mount(&server)
        .await;

    let registry = catalog_registry(&server);
    let result = registry
        .dispatch("get_task", Some(json!({"task_id": "t1"})))
        .await
        .unwrap();

    assert!(result.is_error);
    assert!(result.text.contains("503"));
    assert!(result.text.contains("Service Unavailable"));
    // 200-char snippet, not the 5000-char body.
    assert!(result.text.len() < 300, "body not truncated: {} chars", result.text.len());
}

#[tokio::test]
async fn test_missing_credential_fails_without_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let upstream = upstream_for(&server, None);
    let err = upstream.get("/v1/workspaces").await.unwrap_err();

    assert!(matches!(err, UpstreamError::MissingCredential));
    assert_eq!(err.code(), 0);
    assert!(err.to_string().contains("no credential configured"));
}

#[tokio::test]
async fn test_delete_returns_explicit_confirmation_on_204() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/tasks/t1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let registry = catalog_registry(&server);
    let result = registry
        .dispatch("delete_task", Some(json!({"task_id": "t1"})))
        .await
        .unwrap();

    assert!(!result.is_error);
    let payload: serde_json::Value = serde_json::from_str(&result.text).unwrap();
    assert_eq!(payload, json!({"deleted": true, "task_id": "t1"}));
}

#[tokio::test]
async fn test_credential_attached_to_every_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/workspaces"))
        .and(wiremock::matchers::header("authorization", TEST_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"workspaces": []})))
        .expect(1)
        .mount(&server)
        .await;

    let registry = catalog_registry(&server);
    let result = registry.dispatch("list_workspaces", None).await.unwrap();
    assert!(!result.is_error, "unexpected error: {}", result.text);
}
