//! Stateless transport over a live gateway
//!
//! One POSTed request, one response envelope, nothing retained between
//! exchanges.

use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use taskdeck_core::{ToolArgs, ToolDefinition, ToolError, ToolHandler, ToolRegistry, ToolSchema};
use tests::helpers::{echo_registry, result_is_error, result_text, spawn_gateway, tools_call};

async fn post_raw(url: &str, body: String) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(url)
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .expect("POST to gateway");
    let status = response.status().as_u16();
    let value = response.json().await.expect("JSON response body");
    (status, value)
}

async fn post(url: &str, body: Value) -> (u16, Value) {
    post_raw(url, body.to_string()).await
}

#[tokio::test]
async fn test_initialize_exchange() {
    let gateway = spawn_gateway(echo_registry()).await;

    let (status, body) = post(
        &gateway.mcp_url,
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["id"], 1);
    assert_eq!(body["result"]["serverInfo"]["name"], "taskdeck-gateway");
    assert!(body["result"]["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn test_tools_list_catalog() {
    let gateway = spawn_gateway(echo_registry()).await;

    let (status, body) = post(
        &gateway.mcp_url,
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
    )
    .await;

    assert_eq!(status, 200);
    let tools = body["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0]["name"], "echo");
    assert_eq!(tools[0]["inputSchema"]["required"][0], "text");
}

#[tokio::test]
async fn test_echo_call_end_to_end() {
    let gateway = spawn_gateway(echo_registry()).await;

    let (status, body) = post(&gateway.mcp_url, tools_call(3, "echo", json!({"text": "hi"}))).await;

    assert_eq!(status, 200);
    assert_eq!(body["id"], 3);
    assert!(!result_is_error(&body));
    assert_eq!(result_text(&body), "\"hi\"");
}

#[tokio::test]
async fn test_parse_error_yields_single_null_id_envelope() {
    let gateway = spawn_gateway(echo_registry()).await;

    let (status, body) = post_raw(&gateway.mcp_url, "{definitely not json".to_string()).await;

    assert_eq!(status, 200);
    assert_eq!(body["id"], Value::Null);
    assert_eq!(body["error"]["code"], -32700);
}

#[tokio::test]
async fn test_tool_error_keeps_request_id() {
    let gateway = spawn_gateway(echo_registry()).await;

    // Validation failure: still a 200 exchange, id preserved, error flag set.
    let (status, body) = post(&gateway.mcp_url, tools_call(7, "echo", json!({}))).await;

    assert_eq!(status, 200);
    assert_eq!(body["id"], 7);
    assert!(result_is_error(&body));
    assert_eq!(result_text(&body), "missing required parameter 'text'");
}

#[tokio::test]
async fn test_unknown_method() {
    let gateway = spawn_gateway(echo_registry()).await;

    let (status, body) = post(
        &gateway.mcp_url,
        json!({"jsonrpc": "2.0", "id": 8, "method": "resources/list"}),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["id"], 8);
    assert_eq!(body["error"]["code"], -32601);
}

#[tokio::test]
async fn test_notification_gets_no_envelope() {
    let gateway = spawn_gateway(echo_registry()).await;

    let response = reqwest::Client::new()
        .post(&gateway.mcp_url)
        .header("content-type", "application/json")
        .body(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 202);
    assert!(response.text().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_is_rejected_with_error_envelope() {
    let gateway = spawn_gateway(echo_registry()).await;

    let response = reqwest::get(&gateway.mcp_url).await.unwrap();
    assert_eq!(response.status().as_u16(), 405);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], -32600);
    assert_eq!(body["id"], Value::Null);
}

#[tokio::test]
async fn test_concurrent_exchanges_are_isolated() {
    let gateway = spawn_gateway(echo_registry()).await;
    let url = gateway.mcp_url.clone();

    let mut handles = Vec::new();
    for i in 0..16u64 {
        let url = url.clone();
        handles.push(tokio::spawn(async move {
            let text = format!("payload-{}", i);
            let (status, body) = post(&url, tools_call(i, "echo", json!({"text": text}))).await;
            (i, status, body)
        }));
    }

    for handle in handles {
        let (i, status, body) = handle.await.unwrap();
        assert_eq!(status, 200);
        // Each exchange sees exactly its own id and its own payload.
        assert_eq!(body["id"], i);
        assert_eq!(result_text(&body), format!("\"payload-{}\"", i));
    }
}

struct Panics;

#[async_trait]
impl ToolHandler for Panics {
    async fn call(&self, _args: ToolArgs) -> Result<Value, ToolError> {
        panic!("handler blew up");
    }
}

#[tokio::test]
async fn test_throwing_handler_yields_one_error_envelope_with_id() {
    let mut registry = ToolRegistry::new();
    registry.register(ToolDefinition::new(
        "boom",
        "Panics",
        ToolSchema::new(),
        Arc::new(Panics),
    ));
    let gateway = spawn_gateway(Arc::new(registry)).await;

    let (status, body) = post(&gateway.mcp_url, tools_call(42, "boom", json!({}))).await;

    // Exactly one envelope, original id, internal-error code.
    assert_eq!(status, 200);
    assert_eq!(body["id"], 42);
    assert_eq!(body["error"]["code"], -32603);

    // The exchange after the panic is unaffected.
    let (status, body) = post(
        &gateway.mcp_url,
        json!({"jsonrpc": "2.0", "id": 43, "method": "ping"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["result"], json!({}));
}

#[tokio::test]
async fn test_health_endpoint() {
    let gateway = spawn_gateway(echo_registry()).await;

    let body: Value = reqwest::get(format!("{}/health", gateway.base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "ok");
}
