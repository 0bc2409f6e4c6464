//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! environment / CLI flags
//!     → schema.rs (Settings: ports, TLS paths, feature flags)
//!
//! config.yaml ($CONFIG_DIR or working directory)
//!     → loader.rs (parse YAML mapping)
//!     → validation.rs (semantic checks)
//!     → HostMap (validated, immutable)
//!     → shared via Arc<GatewayContext> with every handler
//! ```
//!
//! # Design Decisions
//! - Loaded once at startup; any failure is fatal
//! - Feature flags are enabled only by the literal value `true`
//! - Validation separates syntactic (serde_yaml) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_host_map, ConfigError};
pub use schema::{ForwardOptions, Settings};
