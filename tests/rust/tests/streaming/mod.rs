//! Streaming transport over a live gateway
//!
//! Sessions open on `GET /mcp/sse`, follow-ups arrive on the message side
//! channel, and responses travel back as SSE `message` events.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tests::helpers::{
    catalog_registry, echo_registry, result_is_error, result_text, spawn_gateway, tools_call,
    RunningGateway,
};
use tests::sse::SseStream;

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Open a stream and return it with the resolved message URL.
async fn open_session(gateway: &RunningGateway) -> (SseStream, String) {
    let mut stream = SseStream::connect(&gateway.sse_url()).await;

    let endpoint = tokio::time::timeout(EVENT_TIMEOUT, stream.next_event())
        .await
        .expect("endpoint event within timeout")
        .expect("stream must start with an event");

    assert_eq!(endpoint.event, "endpoint");
    assert!(
        endpoint.data.starts_with("/mcp/message?sessionId="),
        "unexpected endpoint data: {}",
        endpoint.data
    );

    (stream, format!("{}{}", gateway.base, endpoint.data))
}

/// Submit a follow-up message; the response arrives on the stream, not here.
async fn submit(message_url: &str, body: Value) -> u16 {
    reqwest::Client::new()
        .post(message_url)
        .header("content-type", "application/json")
        .body(body.to_string())
        .send()
        .await
        .expect("POST follow-up")
        .status()
        .as_u16()
}

/// Wait for the next `message` event and parse its envelope.
async fn next_response(stream: &mut SseStream) -> Value {
    let event = tokio::time::timeout(EVENT_TIMEOUT, stream.next_event())
        .await
        .expect("message event within timeout")
        .expect("stream still open");
    assert_eq!(event.event, "message");
    serde_json::from_str(&event.data).expect("message event carries JSON")
}

/// Wait until the store drops to `expected` sessions.
async fn wait_for_session_count(gateway: &RunningGateway, expected: usize) {
    let deadline = tokio::time::Instant::now() + EVENT_TIMEOUT;
    while gateway.sessions.len() != expected {
        assert!(
            tokio::time::Instant::now() < deadline,
            "session count stuck at {} (wanted {})",
            gateway.sessions.len(),
            expected
        );
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

#[tokio::test]
async fn test_echo_round_trip_over_stream() {
    let gateway = spawn_gateway(echo_registry()).await;
    let (mut stream, message_url) = open_session(&gateway).await;

    assert_eq!(gateway.sessions.len(), 1);

    let status = submit(&message_url, tools_call(1, "echo", json!({"text": "hi"}))).await;
    assert_eq!(status, 202);

    let response = next_response(&mut stream).await;
    assert_eq!(response["id"], 1);
    assert!(!result_is_error(&response));
    assert_eq!(result_text(&response), "\"hi\"");
}

#[tokio::test]
async fn test_rate_limited_upstream_keeps_session_open() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/tasks/t1"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let gateway = spawn_gateway(catalog_registry(&server)).await;
    let (mut stream, message_url) = open_session(&gateway).await;

    let status = submit(
        &message_url,
        tools_call(1, "get_task", json!({"task_id": "t1"})),
    )
    .await;
    assert_eq!(status, 202);

    // The failure is a tool-level result on the stream, not a fault.
    let response = next_response(&mut stream).await;
    assert_eq!(response["id"], 1);
    assert!(result_is_error(&response));
    assert!(result_text(&response).contains("rate limited"));

    // The session survived the failed call.
    assert_eq!(gateway.sessions.len(), 1);
    let status = submit(&message_url, json!({"jsonrpc": "2.0", "id": 2, "method": "ping"})).await;
    assert_eq!(status, 202);
    let response = next_response(&mut stream).await;
    assert_eq!(response["id"], 2);
    assert_eq!(response["result"], json!({}));
}

#[tokio::test]
async fn test_stale_session_rejected_without_dispatch() {
    let server = MockServer::start().await;
    // No upstream call may happen for a stale session.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let gateway = spawn_gateway(catalog_registry(&server)).await;
    let (stream, message_url) = open_session(&gateway).await;

    // Client disconnects; the drop guard must release the session.
    drop(stream);
    wait_for_session_count(&gateway, 0).await;

    let response = reqwest::Client::new()
        .post(&message_url)
        .header("content-type", "application/json")
        .body(tools_call(1, "get_task", json!({"task_id": "t1"})).to_string())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], -32001);
    assert_eq!(body["error"]["message"], "no active session for this identifier");
}

#[tokio::test]
async fn test_unknown_session_rejected_immediately() {
    let gateway = spawn_gateway(echo_registry()).await;

    let url = format!("{}/message?sessionId=never-existed", gateway.mcp_url);
    let response = reqwest::Client::new()
        .post(&url)
        .header("content-type", "application/json")
        .body(json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}).to_string())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], -32001);
}

#[tokio::test]
async fn test_malformed_follow_up_is_a_transport_fault() {
    let gateway = spawn_gateway(echo_registry()).await;
    let (_stream, message_url) = open_session(&gateway).await;

    let response = reqwest::Client::new()
        .post(&message_url)
        .header("content-type", "application/json")
        .body("{broken")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], -32700);
}

#[tokio::test]
async fn test_session_ids_unique_and_sessions_independent() {
    let gateway = spawn_gateway(echo_registry()).await;

    let (first_stream, first_url) = open_session(&gateway).await;
    let (mut second_stream, second_url) = open_session(&gateway).await;

    assert_ne!(first_url, second_url, "session ids must be unique");
    assert_eq!(gateway.sessions.len(), 2);

    // Closing the first session must not disturb the second.
    drop(first_stream);
    wait_for_session_count(&gateway, 1).await;

    let status = submit(&second_url, tools_call(5, "echo", json!({"text": "still here"}))).await;
    assert_eq!(status, 202);
    let response = next_response(&mut second_stream).await;
    assert_eq!(response["id"], 5);
    assert_eq!(result_text(&response), "\"still here\"");

    // And the first session's identifier is now stale.
    let status = submit(&first_url, tools_call(6, "echo", json!({"text": "ghost"}))).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_notification_follow_up_produces_no_event() {
    let gateway = spawn_gateway(echo_registry()).await;
    let (mut stream, message_url) = open_session(&gateway).await;

    let status = submit(
        &message_url,
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
    )
    .await;
    assert_eq!(status, 202);

    // A real request right after: the only event must be its response.
    let status = submit(&message_url, json!({"jsonrpc": "2.0", "id": 9, "method": "ping"})).await;
    assert_eq!(status, 202);

    let response = next_response(&mut stream).await;
    assert_eq!(response["id"], 9);
}
