//! Per-request override headers.
//!
//! # Responsibilities
//! - Derive the outbound path from `x-uri-override`
//! - Derive the upstream timeout from `x-http-timeout`
//! - Derive the original protocol from `x-forwarded-proto`
//!
//! # Design Decisions
//! - Pure functions over the inbound headers; nothing here touches shared state
//! - Malformed values never fail the request: they fall back to defaults

use std::time::Duration;

use axum::http::{HeaderMap, Uri};

pub const X_URI_OVERRIDE: &str = "x-uri-override";
pub const X_HTTP_TIMEOUT: &str = "x-http-timeout";
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// `x-uri-override` value that strips the path entirely.
pub const REMOVE_PATH: &str = "remove";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Path (and query) appended to the backend address.
pub fn outbound_path(headers: &HeaderMap, uri: &Uri) -> String {
    match header_str(headers, X_URI_OVERRIDE) {
        Some(REMOVE_PATH) => String::new(),
        Some(replacement) if !replacement.is_empty() => replacement.to_string(),
        _ => uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string()),
    }
}

/// Upstream timeout for this request.
///
/// Only a positive whole number of seconds overrides `default`.
pub fn request_timeout(headers: &HeaderMap, default: Duration) -> Duration {
    let Some(raw) = headers.get(X_HTTP_TIMEOUT) else {
        return default;
    };

    match raw.to_str().ok().map(str::trim).and_then(|v| v.parse::<u64>().ok()) {
        Some(secs) if secs > 0 => Duration::from_secs(secs),
        _ => {
            tracing::warn!(value = ?raw, default_secs = default.as_secs(), "x-http-timeout is not a positive number, using default");
            default
        }
    }
}

/// Protocol the client originally used, as reported by `x-forwarded-proto`.
pub fn forwarded_proto(headers: &HeaderMap) -> &'static str {
    match header_str(headers, X_FORWARDED_PROTO) {
        Some("https") => "https",
        _ => "http",
    }
}
