//! TLS configuration and certificate loading.

use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;

/// Load the TLS listener's certificate and key (PEM).
///
/// A missing file is reported as `NotFound` naming the file, before rustls
/// gets a chance to produce a less specific error.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, std::io::Error> {
    require_file(cert_path, "Certificate")?;
    require_file(key_path, "Private key")?;

    let config = RustlsConfig::from_pem_file(cert_path, key_path).await?;
    tracing::debug!(cert = %cert_path.display(), key = %key_path.display(), "TLS config loaded");
    Ok(config)
}

fn require_file(path: &Path, what: &str) -> Result<(), std::io::Error> {
    if path.is_file() {
        Ok(())
    } else {
        Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} file not found: {}", what, path.display()),
        ))
    }
}
