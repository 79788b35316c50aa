//! Configuration module for environment variable parsing.
//!
//! Configuration is read once at startup and handed to the listener by value.
//! Nothing in the process mutates it afterwards.

use std::env;
use std::path::PathBuf;

use thiserror::Error;
use tracing::warn;

use crate::web::allowlist::Allowlist;

/// Port used when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 8771;

/// Certificate chain path used when `TLS_CERT_PATH` is unset.
pub const DEFAULT_CERT_PATH: &str = "/etc/ssl/linode/fullchain.pem";

/// Private key path used when `TLS_KEY_PATH` is unset.
pub const DEFAULT_KEY_PATH: &str = "/etc/ssl/linode/privkey.pem";

/// Largest request body accepted before the read is treated as failed.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid PORT value {0:?}: expected an integer in 0..=65535")]
    InvalidPort(String),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind host; empty means all interfaces
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Shared secret used as the HMAC key
    pub client_secret: String,

    /// Source addresses permitted to call the webhook
    pub allow_list: Allowlist,

    /// PEM certificate chain for TLS termination
    pub cert_path: PathBuf,

    /// PEM private key for TLS termination
    pub key_path: PathBuf,

    /// Maximum request body size in bytes
    pub max_body_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT").filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => DEFAULT_PORT,
        };

        let max_body_bytes = match lookup("MAX_BODY_BYTES") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(env_var = "MAX_BODY_BYTES", value = %raw, "Invalid size, using default");
                DEFAULT_MAX_BODY_BYTES
            }),
            None => DEFAULT_MAX_BODY_BYTES,
        };

        let allow_list = lookup("ALLOW_LIST")
            .map(|raw| parse_csv(&raw))
            .unwrap_or_default();

        Ok(Config {
            host: lookup("HOST").unwrap_or_default(),
            port,
            client_secret: lookup("CLIENT_SECRET").unwrap_or_default(),
            allow_list: Allowlist::from_entries(&allow_list),
            cert_path: lookup("TLS_CERT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CERT_PATH)),
            key_path: lookup("TLS_KEY_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_KEY_PATH)),
            max_body_bytes,
        })
    }

    /// The `host:port` string the listener binds to.
    ///
    /// An empty host binds all IPv4 interfaces. IPv6 literals are bracketed
    /// so the result parses as a socket address.
    pub fn bind_address(&self) -> String {
        if self.host.is_empty() {
            format!("0.0.0.0:{}", self.port)
        } else if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// Parse a comma-separated list of strings.
fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
