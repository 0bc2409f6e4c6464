//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! settings (ports, cert/key paths)
//!     → tls.rs (load PEM certificate and key)
//!     → listener.rs (bind HTTP + HTTPS, serve shared router)
//!     → Hand off to HTTP layer
//!
//! Supervision:
//!     HTTP loop ─┐
//!                ├─ first to stop → shut down the other → error returned to main
//!     HTTPS loop ┘
//! ```

pub mod listener;
pub mod tls;

pub use listener::{DualListener, ListenerError, Protocol};
