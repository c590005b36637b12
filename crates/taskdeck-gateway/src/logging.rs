//! Request logging - trace ids and single entry/exit lines
//!
//! Every inbound request gets a short hex trace id; the middleware logs one
//! line on the way in and one on the way out with elapsed milliseconds.
//! For protocol POSTs the JSON-RPC method is pulled from the body so log
//! lines say `tools/call`, not just `POST /mcp`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use http_body_util::BodyExt;
use tracing::{info, info_span, warn, Instrument};

/// Global request counter for trace ID generation
static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a short, unique trace ID for this request
/// Format: 6 hex characters (e.g., "a1b2c3")
pub fn generate_trace_id() -> String {
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0);

    let mixed = counter.wrapping_add(timestamp);
    format!("{:06x}", mixed & 0xFFFFFF)
}

/// Extract the JSON-RPC method from a request body, if there is one.
pub fn extract_rpc_method(bytes: &[u8]) -> Option<String> {
    let json: serde_json::Value = serde_json::from_slice(bytes).ok()?;
    json.get("method")
        .and_then(|m| m.as_str())
        .map(String::from)
}

/// Logging middleware for requests and responses.
///
/// Buffers POST bodies to annotate the entry line with the RPC method;
/// streaming responses (SSE) pass through untouched.
pub async fn request_logging_middleware(
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let trace_id = generate_trace_id();
    let started_at = Instant::now();

    let span = info_span!("request", trace_id = %trace_id, method = %method, path = %path);

    async move {
        let request = if method == "POST" {
            let (parts, body) = request.into_parts();
            let bytes = match body.collect().await.map(|collected| collected.to_bytes()) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Failed to read request body: {}", e);
                    return Err(StatusCode::INTERNAL_SERVER_ERROR);
                }
            };

            match extract_rpc_method(&bytes) {
                Some(rpc_method) => info!("→ {} {} {}", method, path, rpc_method),
                None => info!("→ {} {}", method, path),
            }

            Request::from_parts(parts, Body::from(bytes))
        } else {
            info!("→ {} {}", method, path);
            request
        };

        let response = next.run(request).await;

        info!(
            "← {} ({}ms)",
            response.status().as_u16(),
            started_at.elapsed().as_millis()
        );

        Ok(response)
    }
    .instrument(span)
    .await
}
