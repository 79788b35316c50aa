//! Webhook endpoint handler.
//!
//! Each request is checked independently:
//! 1. Read the full body
//! 2. Verify the source address against the allowlist
//! 3. Verify the HMAC signature
//! 4. Acknowledge receipt
//!
//! The payload itself is only logged, never interpreted.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::web::allowlist::is_ip_allowed;
use crate::web::signature::{verify_signature, SIGNATURE_HEADER};
use crate::Config;

/// Body returned when every check passes.
pub const SUCCESS_BODY: &str = "Webhook processed successfully";

/// Shared application state.
///
/// Read-only after startup; cloned into every handler invocation.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// Reasons a webhook request is rejected.
///
/// Each variant maps to exactly one status code and plain-text body:
/// - [`WebhookError::BodyRead`] → 500
/// - [`WebhookError::IpNotAllowed`] → 403
/// - [`WebhookError::InvalidSignature`] → 403
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("failed to read request body: {0}")]
    BodyRead(#[source] axum::Error),

    #[error("IP not allowed: {0}")]
    IpNotAllowed(String),

    /// Covers both a missing and a mismatched signature header.
    #[error("invalid signature")]
    InvalidSignature,
}

impl WebhookError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebhookError::BodyRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WebhookError::IpNotAllowed(_) | WebhookError::InvalidSignature => {
                StatusCode::FORBIDDEN
            }
        }
    }

    pub fn body(&self) -> &'static str {
        match self {
            WebhookError::BodyRead(_) => "Internal Server Error",
            WebhookError::IpNotAllowed(_) => "IP not allowed",
            WebhookError::InvalidSignature => "Invalid signature",
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        (self.status(), self.body()).into_response()
    }
}

/// HubSpot webhook endpoint.
pub async fn hubspot_webhook(
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<(StatusCode, &'static str), WebhookError> {
    let (parts, body) = request.into_parts();
    let method = parts.method.as_str();
    let path = parts.uri.path();
    let remote_addr = remote_addr.to_string();

    info!(
        method = %method,
        path = %path,
        remote_addr = %remote_addr,
        "hubspot_webhook_received"
    );

    for (name, value) in parts.headers.iter() {
        info!(
            header = %name,
            value = %String::from_utf8_lossy(value.as_bytes()),
            "hubspot_webhook_header"
        );
    }

    let body = to_bytes(body, state.config.max_body_bytes)
        .await
        .map_err(|e| {
            error!(error = %e, "hubspot_webhook_body_read_failed");
            WebhookError::BodyRead(e)
        })?;

    info!(
        body = %String::from_utf8_lossy(&body),
        body_length = body.len(),
        "hubspot_webhook_body"
    );

    if !is_ip_allowed(&remote_addr, &state.config.allow_list) {
        warn!(remote_addr = %remote_addr, "hubspot_webhook_ip_not_allowed");
        return Err(WebhookError::IpNotAllowed(remote_addr));
    }

    // A missing or non-ASCII header verifies as the empty signature.
    let signature = parts
        .headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !verify_signature(signature, &state.config.client_secret, method, path, &body) {
        warn!(
            remote_addr = %remote_addr,
            has_signature = !signature.is_empty(),
            "hubspot_webhook_invalid_signature"
        );
        return Err(WebhookError::InvalidSignature);
    }

    info!(remote_addr = %remote_addr, "hubspot_webhook_processed");

    Ok((StatusCode::OK, SUCCESS_BODY))
}
