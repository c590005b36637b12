//! JSON-RPC 2.0 envelopes
//!
//! The gateway speaks exactly the envelope shapes MCP clients send; this is
//! a closed protocol surface, not a framework. Requests without an id are
//! notifications and never receive a response envelope.

mod server;

pub use server::{ProtocolServer, PROTOCOL_VERSION, SERVER_NAME};

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// Protocol error codes.
///
/// Standard JSON-RPC 2.0 codes plus the gateway's unknown-session code in
/// the implementation-defined range.
pub mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    /// Follow-up message referenced a session not present in the store.
    pub const SESSION_NOT_FOUND: i32 = -32001;
}

/// Inbound request envelope.
///
/// `id` is the client's correlation token, echoed verbatim on the
/// response. serde maps an explicit JSON `null` id to `None`, which the
/// gateway treats the same as an absent id: a notification.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl RpcRequest {
    /// Whether this request expects no response envelope.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

/// Outbound response envelope. Exactly one of `result`/`error` is present.
#[derive(Debug, Clone, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}
