//! Error taxonomy for tool execution
//!
//! Two layers of typed errors:
//! - [`UpstreamError`] - produced only by the upstream adapter, one variant
//!   per upstream failure class.
//! - [`ToolError`] - what a tool handler returns; either a validation
//!   failure raised before/inside the handler or a wrapped upstream error.
//!
//! Transport faults (malformed envelopes, unknown sessions) live in the
//! gateway crate and never pass through these types.

use thiserror::Error;

/// Maximum number of characters of an upstream error body carried in an
/// error message.
pub const BODY_SNIPPET_CHARS: usize = 200;

/// Typed error for a failed upstream API call.
///
/// Constructed exclusively by [`crate::upstream::UpstreamClient`]. The
/// credential is never part of any variant or message.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// No API token was configured; detected before any network call.
    #[error("no credential configured for the upstream API")]
    MissingCredential,

    /// Upstream answered 401.
    #[error("credential invalid or expired")]
    Unauthorized,

    /// Upstream answered 403.
    #[error("access denied to resource")]
    Forbidden,

    /// Upstream answered 429.
    #[error("rate limited, retry later")]
    RateLimited,

    /// Any other non-2xx answer, with a bounded body snippet.
    #[error("upstream returned {status} {reason}: {body}")]
    Status {
        status: u16,
        reason: String,
        body: String,
    },

    /// The request never completed (connect failure, timeout, ...).
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 2xx answer whose body was not the JSON we expected.
    #[error("failed to decode upstream response: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// Machine code for this error: the HTTP status where one exists,
    /// 0 for failures that never produced a response.
    pub fn code(&self) -> u16 {
        match self {
            Self::MissingCredential | Self::Transport(_) | Self::Decode(_) => 0,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::RateLimited => 429,
            Self::Status { status, .. } => *status,
        }
    }

    /// Whether this error collapses to the generic "not found" message.
    ///
    /// 403 and 404 are deliberately indistinguishable to callers: which of
    /// the two occurred is not actionable and leaks resource existence.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Forbidden | Self::Status { status: 404, .. })
    }

    /// The human-readable message shown to the calling agent.
    pub fn user_message(&self) -> String {
        if self.is_not_found() {
            "not found or invalid id".to_string()
        } else {
            self.to_string()
        }
    }
}

/// Error returned by a tool handler.
///
/// Every variant becomes an error-flagged tool result; none of them aborts
/// the RPC exchange that carried the call.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Arguments failed validation, either against the declared schema or
    /// against a handler-level rule (e.g. "no fields to update").
    #[error("{0}")]
    Validation(String),

    /// An upstream call failed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// An upstream call failed inside a multi-step tool; `context` names
    /// the step so the caller can tell how far the tool got.
    #[error("{context}: {source}")]
    UpstreamAt {
        context: String,
        source: UpstreamError,
    },
}

impl ToolError {
    /// Attach a step description to an upstream error.
    pub fn upstream_at(context: impl Into<String>, source: UpstreamError) -> Self {
        Self::UpstreamAt {
            context: context.into(),
            source,
        }
    }

    /// The human-readable message carried in the error-flagged tool result.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Upstream(source) => source.user_message(),
            Self::UpstreamAt { context, source } => {
                format!("{}: {}", context, source.user_message())
            }
        }
    }
}
