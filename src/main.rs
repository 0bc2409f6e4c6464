//! Host Gateway
//!
//! Forwards every request to the backend mapped to its `Host` header and
//! answers with a JSON envelope around the upstream response.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                   HOST GATEWAY                    │
//!                      │                                                   │
//!   Client Request     │  ┌──────────┐    ┌──────────┐    ┌────────────┐  │
//!   ───────────────────┼─▶│   net    │───▶│   http   │───▶│  routing   │  │
//!                      │  │HTTP+HTTPS│    │ dispatch │    │  HostMap   │  │
//!                      │  └──────────┘    └────┬─────┘    └────────────┘  │
//!                      │                       │ overrides, trace headers  │
//!                      │                       ▼                           │
//!   Client Response    │  ┌──────────┐    ┌──────────┐                     │
//!   ◀──────────────────┼──│ envelope │◀───│ upstream │◀────────────────────┼─── Backend
//!                      │  │   JSON   │    │  client  │                     │
//!                      │  └──────────┘    └──────────┘                     │
//!                      └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;

use host_gateway::config::{load_host_map, Settings};
use host_gateway::net::DualListener;
use host_gateway::observability::logging;
use host_gateway::{GatewayContext, HttpServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    tracing::info!("host-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    let settings = Settings::parse();
    let config_path = settings.config_path();
    if settings.config_dir.is_none() {
        tracing::info!("CONFIG_DIR not defined, using working directory");
    }
    tracing::info!(path = %config_path.display(), "Configuration file");

    let host_map = load_host_map(&config_path).map_err(|e| {
        tracing::error!(path = %config_path.display(), error = %e, "Failed to load host map");
        e
    })?;

    tracing::info!(
        hosts = host_map.len(),
        http_port = settings.http_port,
        https_port = settings.https_port,
        rewrite_forwarded_proto = settings.rewrite_forwarded_proto,
        add_request_id = settings.add_request_id,
        "Configuration loaded"
    );
    for (host, address) in host_map.iter() {
        tracing::debug!(host = %host, address = %address, "Host mapping");
    }

    let context = GatewayContext::new(host_map, settings.forward_options())?;
    let listener = DualListener::from_settings(&settings).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to prepare listeners");
        e
    })?;

    let server = HttpServer::new(context);
    if let Err(e) = server.run(listener).await {
        tracing::error!(error = %e, "Could not keep serving");
        return Err(e.into());
    }

    Ok(())
}
