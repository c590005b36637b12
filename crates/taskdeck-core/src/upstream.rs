//! HTTP client for the TaskDeck REST API.
//!
//! One base URL, one credential, JSON in and out. The gateway treats the
//! upstream as an opaque REST backend: this adapter attaches the
//! credential, translates status codes into [`UpstreamError`] variants, and
//! decodes bodies - nothing here knows what a task or a list is.
//!
//! No retries and no caching: a 429 or 5xx is surfaced to the caller, who
//! owns the retry decision.

use std::time::Duration;

use reqwest::{header, Method, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::error::{UpstreamError, BODY_SNIPPET_CHARS};

/// Upstream connection settings.
///
/// `token` is optional at construction time; a missing token fails each
/// call fast with [`UpstreamError::MissingCredential`] instead of being a
/// startup error.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub token: Option<String>,
}

/// Client for the TaskDeck REST API.
pub struct UpstreamClient {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl UpstreamClient {
    /// Create a new upstream client.
    pub fn new(config: UpstreamConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("taskdeck/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
            client,
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue one call against the upstream API.
    ///
    /// Returns the decoded JSON body for any 2xx response; a 204 or an
    /// empty body is the explicit no-value `None`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Option<Value>, UpstreamError> {
        // Fail fast: no token means no network call.
        let token = self
            .token
            .as_deref()
            .ok_or(UpstreamError::MissingCredential)?;

        let url = format!("{}{}", self.base_url, path);
        debug!("[Upstream] {} {}", method, path);

        let mut request = self
            .client
            .request(method, &url)
            .header(header::AUTHORIZATION, token)
            .header(header::ACCEPT, "application/json");

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            if status == StatusCode::NO_CONTENT {
                return Ok(None);
            }
            let bytes = response.bytes().await?;
            if bytes.is_empty() {
                return Ok(None);
            }
            let value = serde_json::from_slice(&bytes)
                .map_err(|e| UpstreamError::Decode(e.to_string()))?;
            return Ok(Some(value));
        }

        Err(match status {
            StatusCode::UNAUTHORIZED => UpstreamError::Unauthorized,
            StatusCode::FORBIDDEN => UpstreamError::Forbidden,
            StatusCode::TOO_MANY_REQUESTS => UpstreamError::RateLimited,
            other => {
                let reason = other.canonical_reason().unwrap_or("Unknown").to_string();
                let body = response.text().await.unwrap_or_default();
                UpstreamError::Status {
                    status: other.as_u16(),
                    reason,
                    body: truncate_body(&body),
                }
            }
        })
    }

    /// GET a resource; an empty response decodes as `Value::Null`.
    pub async fn get(&self, path: &str) -> Result<Value, UpstreamError> {
        Ok(self
            .request(Method::GET, path, None)
            .await?
            .unwrap_or(Value::Null))
    }

    /// POST a JSON body.
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, UpstreamError> {
        Ok(self
            .request(Method::POST, path, Some(body))
            .await?
            .unwrap_or(Value::Null))
    }

    /// PUT a JSON body.
    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, UpstreamError> {
        Ok(self
            .request(Method::PUT, path, Some(body))
            .await?
            .unwrap_or(Value::Null))
    }

    /// DELETE a resource.
    pub async fn delete(&self, path: &str) -> Result<Value, UpstreamError> {
        Ok(self
            .request(Method::DELETE, path, None)
            .await?
            .unwrap_or(Value::Null))
    }
}

/// Bound an upstream error body to [`BODY_SNIPPET_CHARS`] characters,
/// respecting char boundaries.
fn truncate_body(body: &str) -> String {
    if body.chars().count() <= BODY_SNIPPET_CHARS {
        body.to_string()
    } else {
        body.chars().take(BODY_SNIPPET_CHARS).collect()
    }
}
