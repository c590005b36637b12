//! Stateful streaming transport (SSE + message side channel)
//!
//! `GET <base>/sse` opens the stream and registers a session; the first
//! event is `endpoint`, carrying the message URL with the session id baked
//! in. `POST <base>/message?sessionId=<id>` submits follow-up requests
//! whose responses are delivered asynchronously as `message` events on the
//! open stream, never in the POST's own body.
//!
//! A drop guard inside the stream removes the session on every exit path:
//! client disconnect, stream error, or server shutdown.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Json, Response};
use futures::Stream;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::protocol::{codes, ProtocolServer, RpcResponse};
use crate::server::AppState;
use crate::session::SessionGuard;

/// Interval between SSE keep-alive comments.
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
pub struct MessageParams {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

/// `GET <base>/sse` - open a streaming session.
pub async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let server = ProtocolServer::new(state.registry.clone());
    let (session, mut rx) = state.sessions.open(server);

    let session_id = session.id().to_string();
    let endpoint = format!("{}/message?sessionId={}", state.base_path, session_id);
    let guard = SessionGuard::new(state.sessions.clone(), session_id.clone());

    info!(session_id = %session_id, "[Sse] Stream open");

    let stream = async_stream::stream! {
        // Owned by the stream: releases the session whenever the stream
        // ends, however it ends.
        let _guard = guard;

        yield Ok(Event::default().event("endpoint").data(endpoint));

        while let Some(response) = rx.recv().await {
            match serde_json::to_string(&response) {
                Ok(json) => yield Ok(Event::default().event("message").data(json)),
                Err(e) => {
                    warn!(session_id = %session_id, "[Sse] Failed to serialize response: {}", e);
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("keep-alive"),
    )
}

/// `POST <base>/message?sessionId=<id>` - submit a follow-up request.
///
/// Responds `202 Accepted` once the message is handed to the session's
/// protocol server; the response envelope travels over the stream. An
/// unknown session id fails immediately with a transport fault and no
/// dispatch - stale ids are never queued or retried.
pub async fn message_handler(
    State(state): State<AppState>,
    Query(params): Query<MessageParams>,
    body: String,
) -> Response {
    let Some(session) = state.sessions.get(&params.session_id) else {
        warn!(session_id = %params.session_id, "[Sse] Follow-up for unknown session");
        return (
            StatusCode::NOT_FOUND,
            Json(RpcResponse::error(
                Value::Null,
                codes::SESSION_NOT_FOUND,
                "no active session for this identifier",
            )),
        )
            .into_response();
    };

    let raw: Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(RpcResponse::error(
                    Value::Null,
                    codes::PARSE_ERROR,
                    format!("parse error: {}", e),
                )),
            )
                .into_response();
        }
    };

    // The POST returns before the dispatch completes; delivery (or
    // discard, if the stream closed meanwhile) happens on the stream side.
    tokio::spawn(async move {
        if let Some(response) = session.server().handle_value(raw).await {
            session.send(response).await;
        }
    });

    (StatusCode::ACCEPTED, "Accepted").into_response()
}
