//! Host-based request forwarding.
//!
//! # Responsibilities
//! - Resolve the backend for the inbound `Host`
//! - Build the outbound request (path/timeout overrides, trace headers)
//! - Forward it and wrap the result in the response envelope
//!
//! # Design Decisions
//! - Inbound headers are not copied; only `Host` and the gateway's own headers are sent
//! - `Host` is the original inbound host, not the backend address
//! - One attempt per request, bounded by the per-request timeout
//! - Dropping the handler future (client disconnect) drops the in-flight upstream call

use axum::{
    body::Body,
    extract::State,
    http::{header::HOST, Request},
    response::Response,
};
use uuid::Uuid;

use crate::http::overrides::{forwarded_proto, outbound_path, request_timeout};
use crate::http::response::{normalize_body, Envelope, NormalizedBody, X_SERVER};
use crate::http::server::{AppState, GatewayContext};

pub const X_ORIGINAL_FORWARDED_PROTO: &str = "x-original-forwarded-proto";
pub const X_REQUEST_ID: &str = "x-request-id";

/// Fallback handler for every path except `/status`.
pub async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    forward(&state, request)
        .await
        .into_gateway_response(state.server_header())
}

/// Host as the client sent it: the `Host` header, or the URI authority for HTTP/2.
fn inbound_host(request: &Request<Body>) -> String {
    request
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.as_str().to_string()))
        .unwrap_or_default()
}

async fn forward(state: &GatewayContext, request: Request<Body>) -> Envelope {
    let host = inbound_host(&request);
    let options = state.options();

    tracing::info!(
        version = ?request.version(),
        host = %host,
        method = %request.method(),
        path = %request.uri().path(),
        "Handling request"
    );

    let Some(address) = state.host_map().resolve(&host) else {
        tracing::warn!(host = %host, "Unable to find host mapping");
        return Envelope::unmapped();
    };
    tracing::debug!(host = %host, address = %address, "Found host mapping");

    let (parts, body) = request.into_parts();
    let url = format!("{}{}", address, outbound_path(&parts.headers, &parts.uri));
    let timeout = request_timeout(&parts.headers, options.default_timeout);

    let body = match axum::body::to_bytes(body, options.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(host = %host, error = %e, "Failed to read request body");
            return Envelope::transport_failure(format!("failed to read request body: {}", e));
        }
    };

    let mut outbound = state
        .client()
        .request(parts.method, &url)
        .timeout(timeout)
        .header(HOST, host.as_str())
        .header(X_SERVER, state.server_header().clone());

    if options.rewrite_forwarded_proto {
        let proto = forwarded_proto(&parts.headers);
        tracing::debug!(proto, "Adding x-original-forwarded-proto");
        outbound = outbound.header(X_ORIGINAL_FORWARDED_PROTO, proto);
    }

    if options.add_request_id {
        let request_id = Uuid::new_v4().to_string();
        tracing::debug!(request_id = %request_id, "Adding x-request-id");
        outbound = outbound.header(X_REQUEST_ID, request_id);
    }

    if !body.is_empty() {
        outbound = outbound.body(body);
    }

    tracing::info!(url = %url, host = %host, timeout_secs = timeout.as_secs(), "Making upstream request");

    let response = match outbound.send().await {
        Ok(response) => response,
        Err(e) => {
            let error = error_chain(&e);
            tracing::error!(url = %url, error = %error, "Upstream request failed");
            return Envelope::transport_failure(error);
        }
    };

    let status = response.status();
    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            let error = error_chain(&e);
            tracing::error!(url = %url, status = %status, error = %error, "Failed reading upstream body");
            return Envelope::transport_failure(error);
        }
    };
    tracing::info!(url = %url, status = %status, bytes = bytes.len(), "Upstream responded");

    let normalized = normalize_body(&bytes);
    match &normalized {
        NormalizedBody::Empty => tracing::debug!("Upstream body empty"),
        NormalizedBody::Json(json) => tracing::debug!(body = %json, "Upstream JSON body"),
        NormalizedBody::Raw(raw) => tracing::warn!(body = %raw, "Upstream body is not JSON, passing through"),
    }

    Envelope::success(normalized.into_string())
}

/// `reqwest` hides the interesting part (refused, timed out, DNS) in the source chain.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Layer(&'static str, Option<Box<Layer>>);

    impl std::fmt::Display for Layer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.0)
        }
    }

    impl std::error::Error for Layer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.1.as_deref().map(|l| l as _)
        }
    }

    #[test]
    fn error_chain_joins_sources() {
        let err = Layer(
            "error sending request",
            Some(Box::new(Layer("client error (Connect)", Some(Box::new(Layer("connection refused", None)))))),
        );
        assert_eq!(
            error_chain(&err),
            "error sending request: client error (Connect): connection refused"
        );
    }

    #[test]
    fn host_header_wins_over_authority() {
        let request = Request::builder()
            .uri("http://authority.example/path")
            .header(HOST, "header.example:8080")
            .body(Body::empty())
            .unwrap();
        assert_eq!(inbound_host(&request), "header.example:8080");

        let request = Request::builder()
            .uri("https://authority.example/path")
            .body(Body::empty())
            .unwrap();
        assert_eq!(inbound_host(&request), "authority.example");
    }
}
