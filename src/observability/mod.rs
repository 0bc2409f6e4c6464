//! Observability subsystem.
//!
//! Every subsystem emits `tracing` events with structured fields; `logging.rs`
//! installs the subscriber that writes them to stdout.

pub mod logging;
