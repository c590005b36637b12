//! Gateway Server
//!
//! HTTP server exposing the MCP protocol over the stateless and SSE
//! transports, plus the `/health` diagnostic endpoint.

mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use taskdeck_core::ToolRegistry;

use crate::logging;
use crate::session::SessionStore;
use crate::transport::{sse, stateless};

/// Gateway server configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Base path both transports mount under
    pub base_path: String,
    /// Enable CORS for browser access
    pub enable_cors: bool,
}

pub const DEFAULT_GATEWAY_PORT: u16 = 3231;

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_GATEWAY_PORT,
            base_path: "/mcp".to_string(),
            enable_cors: true,
        }
    }
}

impl GatewayConfig {
    /// Get the socket address
    pub fn addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid address")
    }

    /// Get the base URL for this gateway
    pub fn base_url(&self) -> String {
        format!("http://localhost:{}{}", self.port, self.base_path)
    }
}

/// State shared with the transport handlers.
///
/// The registry is read-only after startup; the session store is the only
/// mutable structure and owns its own synchronization.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ToolRegistry>,
    pub sessions: Arc<SessionStore>,
    pub base_path: String,
}

/// MCP Gateway Server
///
/// Owns the session store and the router assembly; the tool registry is
/// injected so the server stays environment-agnostic (binary, tests).
pub struct GatewayServer {
    config: GatewayConfig,
    state: AppState,
}

impl GatewayServer {
    pub fn new(config: GatewayConfig, registry: Arc<ToolRegistry>) -> Self {
        info!(
            tools = registry.len(),
            base_path = %config.base_path,
            "[Gateway] Initializing"
        );

        let state = AppState {
            registry,
            sessions: Arc::new(SessionStore::new()),
            base_path: config.base_path.clone(),
        };

        Self { config, state }
    }

    /// Get the session store (for tests and diagnostics).
    pub fn sessions(&self) -> Arc<SessionStore> {
        self.state.sessions.clone()
    }

    /// Build the Axum router
    pub fn build_router(&self) -> Router {
        let base = self.config.base_path.as_str();

        let mut router = Router::new()
            // Health check (public, outside the protocol surface)
            .route("/health", get(handlers::health))
            // Stateless exchange
            .route(
                base,
                post(stateless::post_handler).get(stateless::get_handler),
            )
            // Streaming exchange
            .route(&format!("{base}/sse"), get(sse::sse_handler))
            .route(&format!("{base}/message"), post(sse::message_handler))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(logging::request_logging_middleware));

        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            router = router.layer(cors);
        }

        router
    }

    /// Run the gateway server.
    ///
    /// Binds and serves until the process exits. A bind failure is a fatal
    /// startup error: no connection is ever accepted.
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.config.addr();

        info!("[Gateway] Starting on {}", addr);
        info!(
            "[Gateway] CORS: {}",
            if self.config.enable_cors {
                "enabled"
            } else {
                "disabled"
            }
        );
        info!(
            "[Gateway] Transports: POST {base} | GET {base}/sse + POST {base}/message",
            base = self.config.base_path
        );

        let router = self.build_router();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!("[Gateway] Ready to accept connections");

        axum::serve(listener, router).await?;

        Ok(())
    }

    /// Start the server in the background.
    ///
    /// Returns a JoinHandle that can be used to wait for completion or abort.
    pub fn spawn(self) -> tokio::task::JoinHandle<anyhow::Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
