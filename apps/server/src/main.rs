//! TaskDeck MCP gateway server
//!
//! Loads settings from the environment (and `.env` when present), wires
//! the upstream adapter into the tool registry, and serves both transports
//! until the process is stopped.

mod settings;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use taskdeck_core::UpstreamClient;
use taskdeck_gateway::{build_registry, GatewayServer};

use settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=warn")),
        )
        .init();

    // Fatal startup errors stop here: no listener, no connections.
    let settings = Settings::from_env().context("invalid startup configuration")?;

    info!("[Server] Upstream API: {}", settings.upstream.base_url);
    if settings.upstream.token.is_none() {
        warn!("[Server] TASKDECK_API_TOKEN is not set; tool calls will fail until it is");
    }

    let upstream = Arc::new(UpstreamClient::new(settings.upstream));
    let registry = Arc::new(build_registry(upstream));

    let server = GatewayServer::new(settings.gateway, registry);
    server.run().await
}
