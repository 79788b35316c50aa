//! Source address allowlist.
//!
//! Entries are exact matches. The literal `0.0.0.0` is a sentinel that
//! disables the check entirely. There is no CIDR support.

use std::net::{IpAddr, SocketAddr};

/// Allowlist entry that disables source address checks.
pub const ALLOW_ANY: &str = "0.0.0.0";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Any,
    Addr(IpAddr),
    /// Not an IP literal; matched by string equality.
    Literal(String),
}

/// Ordered set of source addresses permitted to call the webhook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allowlist {
    entries: Vec<Entry>,
}

impl Allowlist {
    /// Build an allowlist from raw string entries.
    pub fn from_entries<S: AsRef<str>>(entries: &[S]) -> Self {
        let entries = entries
            .iter()
            .map(|raw| {
                let raw = raw.as_ref();
                if raw == ALLOW_ANY {
                    Entry::Any
                } else {
                    match raw.parse::<IpAddr>() {
                        Ok(ip) => Entry::Addr(ip),
                        Err(_) => Entry::Literal(raw.to_string()),
                    }
                }
            })
            .collect();

        Self { entries }
    }

    /// Whether the wildcard entry is present.
    pub fn is_open(&self) -> bool {
        self.entries.iter().any(|e| *e == Entry::Any)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn permits(&self, host: &str) -> bool {
        let ip = host.parse::<IpAddr>().ok();
        self.entries.iter().any(|entry| match entry {
            Entry::Any => true,
            Entry::Addr(allowed) => ip.as_ref() == Some(allowed),
            Entry::Literal(allowed) => allowed == host,
        })
    }
}

/// Extract the host portion of a `host:port` remote address.
///
/// Anything that parses as a socket address (including bracketed IPv6) is
/// handled structurally, with IPv4-mapped IPv6 peers reduced to plain IPv4.
/// Otherwise the host is everything before the first colon, or the whole
/// string if there is none.
pub fn extract_host(remote_addr: &str) -> String {
    if let Ok(addr) = remote_addr.parse::<SocketAddr>() {
        return addr.ip().to_canonical().to_string();
    }

    match remote_addr.split_once(':') {
        Some((host, _)) => host.to_string(),
        None => remote_addr.to_string(),
    }
}

/// Check whether a request from `remote_addr` may call the webhook.
pub fn is_ip_allowed(remote_addr: &str, allow_list: &Allowlist) -> bool {
    allow_list.permits(&extract_host(remote_addr))
}
