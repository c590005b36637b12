//! Environment-driven startup settings
//!
//! Read once at boot. Any invalid value is a fatal startup error: the
//! process reports it and exits before the listener is ever bound.
//!
//! | variable | default | |
//! |---|---|---|
//! | `TASKDECK_API_URL` | `https://api.taskdeck.io` | upstream base URL |
//! | `TASKDECK_API_TOKEN` | unset | upstream credential; checked per call |
//! | `TASKDECK_HOST` | `127.0.0.1` | bind host |
//! | `TASKDECK_PORT` | `3231` | bind port |
//! | `TASKDECK_BASE_PATH` | `/mcp` | transport mount point |
//! | `TASKDECK_CORS` | `true` | enable permissive CORS |

use anyhow::{bail, Context, Result};
use url::Url;

use taskdeck_core::UpstreamConfig;
use taskdeck_gateway::server::DEFAULT_GATEWAY_PORT;
use taskdeck_gateway::GatewayConfig;

const DEFAULT_API_URL: &str = "https://api.taskdeck.io";

#[derive(Debug)]
pub struct Settings {
    pub upstream: UpstreamConfig,
    pub gateway: GatewayConfig,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("TASKDECK_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Url::parse(&base_url).context("TASKDECK_API_URL is not a valid URL")?;

        // Absent token is NOT fatal: tool calls fail individually with a
        // "no credential configured" error until one is provided.
        let token = std::env::var("TASKDECK_API_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());

        let host = std::env::var("TASKDECK_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = match std::env::var("TASKDECK_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .context("TASKDECK_PORT is not a valid port number")?,
            Err(_) => DEFAULT_GATEWAY_PORT,
        };

        let base_path =
            std::env::var("TASKDECK_BASE_PATH").unwrap_or_else(|_| "/mcp".to_string());
        if !base_path.starts_with('/') || base_path.ends_with('/') {
            bail!("TASKDECK_BASE_PATH must start with '/' and not end with one");
        }

        let enable_cors = match std::env::var("TASKDECK_CORS") {
            Ok(raw) => raw
                .parse::<bool>()
                .context("TASKDECK_CORS must be 'true' or 'false'")?,
            Err(_) => true,
        };

        Ok(Self {
            upstream: UpstreamConfig { base_url, token },
            gateway: GatewayConfig {
                host,
                port,
                base_path,
                enable_cors,
            },
        })
    }
}
