//! Protocol server: method routing over one registry
//!
//! A `ProtocolServer` is cheap to construct; the stateless transport builds
//! a fresh one per exchange and each SSE session owns its own instance.
//! The only shared state behind it is the read-only tool registry.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use taskdeck_core::{DispatchError, ToolRegistry, ToolResult};

use super::{codes, RpcRequest, RpcResponse, JSONRPC_VERSION};

/// MCP protocol revision this gateway implements.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name advertised in `initialize`.
pub const SERVER_NAME: &str = "taskdeck-gateway";

/// One protocol endpoint bound to the shared tool registry.
pub struct ProtocolServer {
    registry: Arc<ToolRegistry>,
}

impl ProtocolServer {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// Process one raw message body.
    ///
    /// Returns `None` for notifications (nothing must be written back);
    /// malformed JSON yields a parse-error envelope with a null id.
    pub async fn handle_message(&self, body: &str) -> Option<RpcResponse> {
        let raw: Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(e) => {
                debug!("[Protocol] Unparseable message: {}", e);
                return Some(RpcResponse::error(
                    Value::Null,
                    codes::PARSE_ERROR,
                    format!("parse error: {}", e),
                ));
            }
        };
        self.handle_value(raw).await
    }

    /// Process one already-parsed message.
    pub async fn handle_value(&self, raw: Value) -> Option<RpcResponse> {
        let request: RpcRequest = match serde_json::from_value(raw) {
            Ok(request) => request,
            Err(e) => {
                debug!("[Protocol] Invalid envelope: {}", e);
                return Some(RpcResponse::error(
                    Value::Null,
                    codes::INVALID_REQUEST,
                    format!("invalid request: {}", e),
                ));
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(RpcResponse::error(
                request.id.unwrap_or(Value::Null),
                codes::INVALID_REQUEST,
                format!("unsupported jsonrpc version: {}", request.jsonrpc),
            ));
        }

        if request.is_notification() {
            debug!(method = %request.method, "[Protocol] Notification");
            return None;
        }

        let id = request.id.clone().unwrap_or(Value::Null);
        debug!(method = %request.method, "[Protocol] Request");

        // A panicking handler must not take the exchange (or session) down
        // with it: it becomes one internal-error envelope, same id.
        let routed = AssertUnwindSafe(self.route(&request.method, request.params, id.clone()))
            .catch_unwind()
            .await;

        Some(routed.unwrap_or_else(|_| {
            error!(method = %request.method, "[Protocol] Handler panicked");
            RpcResponse::error(id, codes::INTERNAL_ERROR, "internal error")
        }))
    }

    async fn route(&self, method: &str, params: Option<Value>, id: Value) -> RpcResponse {
        match method {
            "initialize" => RpcResponse::result(id, self.initialize_result()),
            "ping" => RpcResponse::result(id, json!({})),
            "tools/list" => RpcResponse::result(id, self.tools_list_result()),
            "tools/call" => self.tools_call(id, params).await,
            other => RpcResponse::error(
                id,
                codes::METHOD_NOT_FOUND,
                format!("method not found: {}", other),
            ),
        }
    }

    fn initialize_result(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            }
        })
    }

    /// The tool catalog: the protocol's introspection surface.
    fn tools_list_result(&self) -> Value {
        let mut tools: Vec<Value> = self
            .registry
            .iter()
            .map(|def| {
                json!({
                    "name": def.name(),
                    "description": def.description(),
                    "inputSchema": def.schema().to_json_schema(),
                })
            })
            .collect();

        // Registry iteration order is map order; clients expect a stable
        // catalog across calls.
        tools.sort_by(|a, b| {
            a["name"]
                .as_str()
                .unwrap_or_default()
                .cmp(b["name"].as_str().unwrap_or_default())
        });

        json!({ "tools": tools })
    }

    async fn tools_call(&self, id: Value, params: Option<Value>) -> RpcResponse {
        let Some(params) = params else {
            return RpcResponse::error(id, codes::INVALID_PARAMS, "missing params");
        };

        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return RpcResponse::error(id, codes::INVALID_PARAMS, "missing tool name");
        };

        let arguments = params.get("arguments").cloned();

        match self.registry.dispatch(name, arguments).await {
            Ok(result) => RpcResponse::result(id, tool_result_payload(result)),
            Err(DispatchError::UnknownTool(name)) => RpcResponse::error(
                id,
                codes::INVALID_PARAMS,
                format!("unknown tool: {}", name),
            ),
        }
    }
}

/// Render a dispatch outcome as the `tools/call` result payload.
///
/// A failed tool call is still a successful exchange: the payload carries
/// the message and an `isError` flag, never a protocol error.
fn tool_result_payload(result: ToolResult) -> Value {
    if result.is_error {
        warn!("[Protocol] Tool error result: {}", result.text);
    }
    json!({
        "content": [{
            "type": "text",
            "text": result.text,
        }],
        "isError": result.is_error,
    })
}
