//! Host-based HTTP/HTTPS forwarding gateway library.

pub mod config;
pub mod http;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::Settings;
pub use http::{GatewayContext, HttpServer};
pub use net::DualListener;
pub use routing::HostMap;
