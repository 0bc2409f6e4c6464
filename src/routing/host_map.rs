//! Static host → backend table.
//!
//! # Responsibilities
//! - Hold the host map loaded at startup
//! - Resolve an inbound host to its backend base address
//!
//! # Design Decisions
//! - Exact string match only (no wildcard, prefix or case folding)
//! - Immutable after construction (shared across tasks without locks)
//! - Addresses are scheme-qualified on insert; a bare `host[:port]` means `http://`

use std::collections::HashMap;

/// Scheme assumed for backend addresses configured without one.
pub const DEFAULT_SCHEME: &str = "http://";

/// Immutable mapping from virtual host name to backend base address.
#[derive(Debug, Clone, Default)]
pub struct HostMap {
    entries: HashMap<String, String>,
}

impl HostMap {
    /// Build a host map from `(host, address)` pairs.
    ///
    /// Addresses without a scheme are normalized to `http://address`.
    /// Later duplicates of a host replace earlier ones.
    pub fn from_entries<I, H, A>(entries: I) -> Self
    where
        I: IntoIterator<Item = (H, A)>,
        H: Into<String>,
        A: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|(host, address)| (host.into(), normalize_address(address.as_ref())))
            .collect();
        Self { entries }
    }

    /// Look up the backend address for an inbound host.
    ///
    /// A miss means the host is not configured; it is not an error.
    pub fn resolve(&self, host: &str) -> Option<&str> {
        self.entries.get(host).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(host, address)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(h, a)| (h.as_str(), a.as_str()))
    }
}

/// Prefix `http://` unless the address already names a scheme.
pub fn normalize_address(address: &str) -> String {
    let address = address.trim();
    if address.contains("://") {
        address.to_string()
    } else {
        format!("{}{}", DEFAULT_SCHEME, address)
    }
}
