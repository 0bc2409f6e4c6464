//! Host map validation.
//!
//! # Responsibilities
//! - Reject empty host names
//! - Check every backend address is an absolute http(s) URL with a host
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Runs on normalized addresses, so bare `host:port` entries are checked as `http://host:port`

use thiserror::Error;
use url::Url;

use crate::routing::HostMap;

/// A single semantic problem in the host map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("empty host name (address {address:?})")]
    EmptyHost { address: String },

    #[error("host {host:?}: invalid backend address {address:?}: {reason}")]
    InvalidAddress {
        host: String,
        address: String,
        reason: String,
    },
}

/// Validate every entry of the host map.
pub fn validate_host_map(map: &HostMap) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (host, address) in map.iter() {
        if host.trim().is_empty() {
            errors.push(ValidationError::EmptyHost {
                address: address.to_string(),
            });
            continue;
        }

        if let Err(reason) = check_address(address) {
            errors.push(ValidationError::InvalidAddress {
                host: host.to_string(),
                address: address.to_string(),
                reason,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        errors.sort_by_key(|e| e.to_string());
        Err(errors)
    }
}

fn check_address(address: &str) -> Result<(), String> {
    let url = Url::parse(address).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme {:?}", other)),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err("missing host".to_string());
    }
    Ok(())
}
