//! TLS listener and router construction.
//!
//! The certificate and key are read from disk once, before the socket is
//! bound. Any failure up to that point is returned to the caller, which
//! treats it as fatal.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{routing::post, Router};
use axum_server::{tls_rustls::RustlsConfig, Handle};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::web::{hubspot_webhook, AppState};
use crate::Config;

/// Path the webhook is served on.
pub const WEBHOOK_PATH: &str = "/hubspot-webhook";

/// Time given to in-flight requests once a shutdown signal arrives.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Build the application [`Router`].
///
/// Only `POST /hubspot-webhook` is routed; everything else gets axum's
/// default 404 (or 405 for other methods on the webhook path).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(WEBHOOK_PATH, post(hubspot_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTPS listener serving the webhook endpoint.
pub struct Listener {
    config: Config,
}

impl Listener {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Load TLS material, bind, and serve until a shutdown signal arrives.
    pub async fn run(self) -> Result<()> {
        let tls = RustlsConfig::from_pem_file(&self.config.cert_path, &self.config.key_path)
            .await
            .with_context(|| {
                format!(
                    "Failed to load TLS certificate {} / key {}",
                    self.config.cert_path.display(),
                    self.config.key_path.display()
                )
            })?;

        let bind_address = self.config.bind_address();
        let addr = tokio::net::lookup_host(&bind_address)
            .await
            .with_context(|| format!("Failed to resolve bind address {bind_address}"))?
            .next()
            .with_context(|| format!("No socket address for {bind_address}"))?;

        let handle = Handle::new();
        tokio::spawn(shutdown_on_signal(handle.clone()));

        let app = router(AppState::new(self.config));

        info!(address = %addr, "webhook_server_listening");

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .context("Server error")?;

        info!("webhook_server_shutdown_complete");

        Ok(())
    }
}

/// Wait for SIGINT or SIGTERM, then start a graceful shutdown.
async fn shutdown_on_signal(handle: Handle) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    warn!(grace_secs = SHUTDOWN_GRACE.as_secs(), "webhook_server_shutting_down");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
