//! Stateless request/response transport
//!
//! Each call gets a fresh protocol server bound to the shared registry:
//! construct, process one body, write one response, discard. Isolation
//! between concurrent calls falls out of there being nothing shared but
//! the read-only registry.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::Value;
use tracing::debug;

use crate::protocol::{codes, ProtocolServer, RpcResponse};
use crate::server::AppState;

/// `POST <base>` - one JSON-RPC exchange.
pub async fn post_handler(State(state): State<AppState>, body: String) -> Response {
    let server = ProtocolServer::new(state.registry.clone());

    match server.handle_message(&body).await {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        // Notification: nothing to write back.
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// `GET <base>` - no body to process and no stream to offer here.
///
/// Streaming clients belong on `<base>/sse`; a GET on the stateless
/// endpoint is answered with a single invalid-request envelope.
pub async fn get_handler() -> Response {
    debug!("[Transport] GET on stateless endpoint");
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(RpcResponse::error(
            Value::Null,
            codes::INVALID_REQUEST,
            "stateless endpoint accepts a single POSTed JSON-RPC request; open a stream via the sse endpoint",
        )),
    )
        .into_response()
}
