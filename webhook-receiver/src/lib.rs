//! HubHook - HTTPS receiver for HubSpot webhooks.
//!
//! Every request to `POST /hubspot-webhook` is validated on its own:
//! the peer address must be on the allowlist and the `X-HubSpot-Signature`
//! header must carry the HMAC-SHA256 of the request under the client secret.
//!
//! ## Architecture
//!
//! ```text
//! TLS Listener → hubspot_webhook → allowlist → signature → 200 / 403 / 500
//! ```

pub mod config;
pub mod server;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use server::{router, Listener, WEBHOOK_PATH};
pub use web::{is_ip_allowed, verify_signature, AppState, Allowlist};
