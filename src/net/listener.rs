//! Plaintext + TLS listener pair.
//!
//! # Responsibilities
//! - Bind the HTTP and HTTPS addresses
//! - Serve the same router on both
//! - Supervise both loops as one task group: the first to stop takes the other down
//!
//! # Design Decisions
//! - No partial degradation: HTTP never keeps serving while HTTPS is down, or vice versa
//! - Any termination of a loop is reported as an error, even a clean one
//! - Bound addresses are observable through the `axum_server::Handle`s

use std::fmt;
use std::net::{AddrParseError, SocketAddr};

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use thiserror::Error;
use tokio::task::{JoinError, JoinSet};

use crate::config::Settings;
use crate::net::tls::load_tls_config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Http,
    Https,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Http => f.write_str("HTTP"),
            Protocol::Https => f.write_str("HTTPS"),
        }
    }
}

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("Invalid listen address: {0}")]
    Address(#[from] AddrParseError),

    #[error("TLS configuration error: {0}")]
    Tls(#[source] std::io::Error),

    #[error("{protocol} listener on {addr} failed: {source}")]
    Serve {
        protocol: Protocol,
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("{protocol} listener on {addr} stopped")]
    Stopped { protocol: Protocol, addr: SocketAddr },

    #[error("Listener task failed: {0}")]
    Join(#[from] JoinError),
}

/// One plaintext and one TLS server loop sharing a router.
pub struct DualListener {
    http_addr: SocketAddr,
    https_addr: SocketAddr,
    tls: RustlsConfig,
    http_handle: Handle,
    https_handle: Handle,
}

impl DualListener {
    pub fn new(http_addr: SocketAddr, https_addr: SocketAddr, tls: RustlsConfig) -> Self {
        Self {
            http_addr,
            https_addr,
            tls,
            http_handle: Handle::new(),
            https_handle: Handle::new(),
        }
    }

    /// Resolve addresses and load TLS material from settings.
    pub async fn from_settings(settings: &Settings) -> Result<Self, ListenerError> {
        let http_addr = settings.http_addr()?;
        let https_addr = settings.https_addr()?;
        let tls = load_tls_config(&settings.tls_cert_path, &settings.tls_key_path)
            .await
            .map_err(ListenerError::Tls)?;

        tracing::info!(
            cert = %settings.tls_cert_path.display(),
            key = %settings.tls_key_path.display(),
            "TLS material loaded"
        );

        Ok(Self::new(http_addr, https_addr, tls))
    }

    pub fn http_handle(&self) -> Handle {
        self.http_handle.clone()
    }

    pub fn https_handle(&self) -> Handle {
        self.https_handle.clone()
    }

    /// Serve until either loop stops, then stop the other and report why.
    pub async fn serve(self, router: Router) -> Result<(), ListenerError> {
        let Self {
            http_addr,
            https_addr,
            tls,
            http_handle,
            https_handle,
        } = self;

        let mut loops = JoinSet::new();

        let http = axum_server::bind(http_addr).handle(http_handle.clone());
        let http_app = router.clone().into_make_service();
        loops.spawn(async move {
            tracing::info!(address = %http_addr, "Starting HTTP service");
            (Protocol::Http, http.serve(http_app).await)
        });

        let https = axum_server::bind_rustls(https_addr, tls).handle(https_handle.clone());
        let https_app = router.into_make_service();
        loops.spawn(async move {
            tracing::info!(address = %https_addr, "Starting HTTPS service");
            (Protocol::Https, https.serve(https_app).await)
        });

        let first = loops.join_next().await;

        http_handle.shutdown();
        https_handle.shutdown();
        while let Some(rest) = loops.join_next().await {
            if let Ok((protocol, result)) = rest {
                tracing::info!(%protocol, clean = result.is_ok(), "Listener stopped");
            }
        }

        let addr_of = |protocol| match protocol {
            Protocol::Http => http_addr,
            Protocol::Https => https_addr,
        };

        match first {
            None => Ok(()),
            Some(Err(e)) => Err(ListenerError::Join(e)),
            Some(Ok((protocol, Err(source)))) => Err(ListenerError::Serve {
                protocol,
                addr: addr_of(protocol),
                source,
            }),
            Some(Ok((protocol, Ok(())))) => Err(ListenerError::Stopped {
                protocol,
                addr: addr_of(protocol),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_listener() {
        let err = ListenerError::Serve {
            protocol: Protocol::Https,
            addr: "127.0.0.1:8443".parse().unwrap(),
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use"),
        };
        assert_eq!(err.to_string(), "HTTPS listener on 127.0.0.1:8443 failed: address in use");

        let err = ListenerError::Stopped {
            protocol: Protocol::Http,
            addr: "0.0.0.0:8080".parse().unwrap(),
        };
        assert_eq!(err.to_string(), "HTTP listener on 0.0.0.0:8080 stopped");
    }
}
