//! Configuration schema definitions.
//!
//! Process settings come from the environment (or the equivalent command-line
//! flags). The host map itself lives in a separate YAML file, see
//! [`crate::config::loader`].

use std::convert::Infallible;
use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};

/// File name of the host map, relative to `CONFIG_DIR` or the working directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Root settings for the gateway.
#[derive(Debug, Clone, Parser)]
#[command(name = "host-gateway")]
#[command(about = "Host-based HTTP/HTTPS forwarding gateway", long_about = None)]
pub struct Settings {
    /// Plaintext listener port.
    #[arg(long, env = "HTTP_PORT", default_value_t = 8080)]
    pub http_port: u16,

    /// TLS listener port.
    #[arg(long, env = "HTTPS_PORT", default_value_t = 8443)]
    pub https_port: u16,

    /// Interface both listeners bind to.
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind_address: String,

    /// Directory holding config.yaml.
    #[arg(long, env = "CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Certificate file (PEM) for the TLS listener.
    #[arg(long, env = "TLS_CERT_PATH", default_value = "server.crt")]
    pub tls_cert_path: PathBuf,

    /// Private key file (PEM) for the TLS listener.
    #[arg(long, env = "TLS_KEY_PATH", default_value = "server.key")]
    pub tls_key_path: PathBuf,

    /// Add `x-original-forwarded-proto` to forwarded requests.
    #[arg(long, env = "REWRITE_X_FORWARD_PROTO", default_value = "false", action = ArgAction::Set, value_parser = flag_enabled)]
    pub rewrite_forwarded_proto: bool,

    /// Add a generated `x-request-id` to forwarded requests.
    #[arg(long, env = "ADD_X_REQUEST_ID", default_value = "false", action = ArgAction::Set, value_parser = flag_enabled)]
    pub add_request_id: bool,

    /// Upstream timeout when `x-http-timeout` is absent or invalid.
    #[arg(long, env = "DEFAULT_TIMEOUT_SECS", default_value_t = 15)]
    pub default_timeout_secs: u64,

    /// Largest inbound body buffered for forwarding.
    #[arg(long, env = "MAX_BODY_BYTES", default_value_t = 10 * 1024 * 1024)]
    pub max_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            http_port: 8080,
            https_port: 8443,
            bind_address: "0.0.0.0".to_string(),
            config_dir: None,
            tls_cert_path: PathBuf::from("server.crt"),
            tls_key_path: PathBuf::from("server.key"),
            rewrite_forwarded_proto: false,
            add_request_id: false,
            default_timeout_secs: 15,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Settings {
    /// Location of the host map file.
    pub fn config_path(&self) -> PathBuf {
        match &self.config_dir {
            Some(dir) => dir.join(CONFIG_FILE_NAME),
            None => PathBuf::from(CONFIG_FILE_NAME),
        }
    }

    pub fn http_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.listen_addr(self.http_port)
    }

    pub fn https_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.listen_addr(self.https_port)
    }

    fn listen_addr(&self, port: u16) -> Result<SocketAddr, AddrParseError> {
        let ip: IpAddr = self.bind_address.trim().parse()?;
        Ok(SocketAddr::new(ip, port))
    }

    pub fn forward_options(&self) -> ForwardOptions {
        ForwardOptions {
            rewrite_forwarded_proto: self.rewrite_forwarded_proto,
            add_request_id: self.add_request_id,
            default_timeout: Duration::from_secs(self.default_timeout_secs),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

/// Per-process switches the dispatcher consults on every request.
#[derive(Debug, Clone)]
pub struct ForwardOptions {
    pub rewrite_forwarded_proto: bool,
    pub add_request_id: bool,
    pub default_timeout: Duration,
    pub max_body_bytes: usize,
}

impl Default for ForwardOptions {
    fn default() -> Self {
        Settings::default().forward_options()
    }
}

/// Feature flags are on only for the exact value `true`.
fn flag_enabled(value: &str) -> Result<bool, Infallible> {
    Ok(value == "true")
}
