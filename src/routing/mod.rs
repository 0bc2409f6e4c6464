//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (Host header)
//!     → host_map.rs (exact host lookup)
//!     → Return: backend base address or None (unconfigured host)
//!
//! Table Construction (at startup):
//!     config.yaml mapping
//!     → config::loader (parse, validate)
//!     → HostMap::from_entries (normalize schemes)
//!     → Freeze as immutable HostMap
//! ```
//!
//! # Design Decisions
//! - Table built at startup, immutable at runtime
//! - O(1) lookup via HashMap
//! - Explicit None rather than silent default

pub mod host_map;

pub use host_map::HostMap;
