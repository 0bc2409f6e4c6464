//! HTTP server setup and shared request context.
//!
//! # Responsibilities
//! - Build the immutable gateway context (host map, hostname, start time, client)
//! - Create the Axum Router: `/status` plus the dispatcher for everything else
//! - Wire up tracing middleware
//! - Hand the router to the dual listener

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{http::HeaderValue, routing::any, Router};
use tower_http::trace::TraceLayer;

use crate::config::ForwardOptions;
use crate::http::dispatch::dispatch;
use crate::http::status::get_status;
use crate::net::listener::{DualListener, ListenerError};
use crate::routing::HostMap;

/// Application state injected into handlers.
pub type AppState = Arc<GatewayContext>;

/// Everything a request needs, fixed at startup.
#[derive(Debug)]
pub struct GatewayContext {
    host_map: HostMap,
    hostname: String,
    server_header: HeaderValue,
    started_at: Instant,
    options: ForwardOptions,
    client: reqwest::Client,
}

impl GatewayContext {
    /// Build a context for this machine's hostname.
    pub fn new(host_map: HostMap, options: ForwardOptions) -> Result<Self, reqwest::Error> {
        Self::with_hostname(host_map, options, local_hostname())
    }

    /// Build a context reporting the given hostname in `x-server`.
    pub fn with_hostname(
        host_map: HostMap,
        options: ForwardOptions,
        hostname: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let hostname = hostname.into();
        let server_header = HeaderValue::from_str(&hostname).unwrap_or_else(|_| {
            tracing::warn!(hostname = %hostname, "Hostname is not a valid header value");
            HeaderValue::from_static("unknown")
        });

        Ok(Self {
            host_map,
            hostname,
            server_header,
            started_at: Instant::now(),
            options,
            client: upstream_client()?,
        })
    }

    pub fn host_map(&self) -> &HostMap {
        &self.host_map
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn server_header(&self) -> &HeaderValue {
        &self.server_header
    }

    pub fn options(&self) -> &ForwardOptions {
        &self.options
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Shared outbound client.
///
/// Backend certificates are NOT verified: backends are trusted by
/// configuration, and self-signed or internal certificates must work.
/// Proxy environment variables are ignored.
fn upstream_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .no_proxy()
        .build()
}

fn local_hostname() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not determine hostname");
            "unknown".to_string()
        })
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    pub fn new(context: GatewayContext) -> Self {
        let state = Arc::new(context);
        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    /// `/status` reports uptime for any method; every other path is forwarded.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/status", any(get_status))
            .fallback(dispatch)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on both listeners until one of them stops.
    pub async fn run(self, listener: DualListener) -> Result<(), ListenerError> {
        tracing::info!(
            hostname = %self.state.hostname(),
            hosts = self.state.host_map().len(),
            "HTTP server starting"
        );
        listener.serve(self.router).await
    }
}
