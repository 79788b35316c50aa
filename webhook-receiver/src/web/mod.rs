//! Request validation and the webhook handler.
//!
//! - `allowlist`: source address authorization
//! - `signature`: HMAC-SHA256 request signatures
//! - `handlers`: the per-request check sequence

pub mod allowlist;
pub mod handlers;
pub mod signature;

pub use allowlist::{extract_host, is_ip_allowed, Allowlist, ALLOW_ANY};
pub use handlers::{hubspot_webhook, AppState, WebhookError, SUCCESS_BODY};
pub use signature::{compute_signature, verify_signature, SIGNATURE_HEADER};
