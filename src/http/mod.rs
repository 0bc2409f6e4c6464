//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection (net::listener)
//!     → server.rs (Axum router, shared GatewayContext)
//!     → status.rs      /status (any method) → {"uptime": ...}
//!     → dispatch.rs    everything else:
//!         → routing::HostMap (resolve Host)
//!         → overrides.rs (x-uri-override, x-http-timeout, x-forwarded-proto)
//!         → upstream call (reqwest)
//!         → response.rs (envelope, JSON compaction)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod overrides;
pub mod response;
pub mod server;
pub mod status;

pub use response::{Envelope, Outcome};
pub use server::{AppState, GatewayContext, HttpServer};
