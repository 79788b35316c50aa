//! HubHook Receiver - HTTPS endpoint for HubSpot webhooks.
//!
//! Reads configuration from the environment, loads the TLS certificate and
//! key, and serves `POST /hubspot-webhook` until SIGINT or SIGTERM.

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hubhook::{Config, Listener};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "webhook_server_starting");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        bind_address = %config.bind_address(),
        allow_list_entries = config.allow_list.len(),
        allow_any = config.allow_list.is_open(),
        cert_path = %config.cert_path.display(),
        key_path = %config.key_path.display(),
        max_body_bytes = config.max_body_bytes,
        "config_loaded"
    );

    if config.client_secret.is_empty() {
        warn!("client_secret_not_configured");
    }
    if config.allow_list.is_empty() {
        warn!("allow_list_empty_all_requests_rejected");
    }

    Listener::new(config).run().await
}
