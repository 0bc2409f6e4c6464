//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request, Json, Router};
use axum_server::Handle;
use serde_json::{json, Map, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use host_gateway::config::ForwardOptions;
use host_gateway::net::tls::load_tls_config;
use host_gateway::net::{DualListener, ListenerError};
use host_gateway::{GatewayContext, HostMap, HttpServer};

pub const TEST_HOSTNAME: &str = "gateway-under-test";

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

/// Client that talks to the gateway directly, accepting its self-signed certificate.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .danger_accept_invalid_certs(true)
        .build()
        .unwrap()
}

/// Read the request head (and any body announced by Content-Length) so the
/// peer never sees a reset before our response.
async fn drain_request(socket: &mut tokio::net::TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while buf.len() < end + 4 + length {
                match socket.read(&mut chunk).await {
                    Ok(0) | Err(_) => return,
                    Ok(n) => buf.extend_from_slice(&chunk[..n]),
                }
            }
            return;
        }
    }
}

/// Start a programmable raw-HTTP backend; `f` yields status and body per request.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        drain_request(&mut socket).await;
                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a backend that always answers 200 with a fixed body.
pub async fn start_mock_backend(response: &'static str) -> SocketAddr {
    start_programmable_backend(move || async move { (200, response.to_string()) }).await
}

/// Start a backend that accepts one request and never answers it.
///
/// `received` fires once the request head has arrived, `closed` once the
/// gateway side of the connection goes away.
pub async fn start_holding_backend() -> (SocketAddr, oneshot::Receiver<()>, oneshot::Receiver<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (received_tx, received) = oneshot::channel();
    let (closed_tx, closed) = oneshot::channel();

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        drain_request(&mut socket).await;
        let _ = received_tx.send(());

        let mut chunk = [0u8; 1024];
        loop {
            match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
        }
        let _ = closed_tx.send(());
    });

    (addr, received, closed)
}

/// Handler that describes the request it received as JSON.
async fn echo(request: Request<Body>) -> Json<Value> {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
    let headers: Map<String, Value> = parts
        .headers
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_str().unwrap_or_default().to_string())))
        .collect();

    Json(json!({
        "method": parts.method.as_str(),
        "uri": parts.uri.to_string(),
        "headers": headers,
        "body": String::from_utf8_lossy(&body),
    }))
}

/// Start a plaintext backend that echoes method, URI, headers and body.
pub async fn start_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().fallback(echo);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Start a TLS echo backend using the self-signed fixture certificate.
pub async fn start_tls_echo_backend() -> SocketAddr {
    let tls = load_tls_config(&fixture("server.crt"), &fixture("server.key"))
        .await
        .unwrap();
    let handle = Handle::new();
    let server = axum_server::bind_rustls("127.0.0.1:0".parse().unwrap(), tls).handle(handle.clone());
    let app = Router::new().fallback(echo);
    tokio::spawn(async move {
        let _ = server.serve(app.into_make_service()).await;
    });
    handle.listening().await.expect("TLS backend failed to bind")
}

/// An address nothing is listening on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// A running gateway on ephemeral ports.
pub struct TestGateway {
    pub http: SocketAddr,
    pub https: SocketAddr,
    pub task: JoinHandle<Result<(), ListenerError>>,
}

impl TestGateway {
    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.http, path)
    }

    pub fn https_url(&self, path: &str) -> String {
        format!("https://{}{}", self.https, path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub async fn start_gateway(host_map: HostMap, options: ForwardOptions) -> TestGateway {
    let context = GatewayContext::with_hostname(host_map, options, TEST_HOSTNAME).unwrap();
    let tls = load_tls_config(&fixture("server.crt"), &fixture("server.key"))
        .await
        .unwrap();
    let listener = DualListener::new(
        "127.0.0.1:0".parse().unwrap(),
        "127.0.0.1:0".parse().unwrap(),
        tls,
    );
    let http_handle = listener.http_handle();
    let https_handle = listener.https_handle();

    let task = tokio::spawn(HttpServer::new(context).run(listener));

    let http = tokio::time::timeout(Duration::from_secs(5), http_handle.listening())
        .await
        .unwrap()
        .expect("HTTP listener failed to bind");
    let https = tokio::time::timeout(Duration::from_secs(5), https_handle.listening())
        .await
        .unwrap()
        .expect("HTTPS listener failed to bind");

    TestGateway { http, https, task }
}

/// Parse an envelope and, when present, the JSON inside `upstream-response`.
pub async fn read_envelope(response: reqwest::Response) -> (u16, Value) {
    let status = response.status().as_u16();
    let body: Value = response.json().await.unwrap();
    (status, body)
}

pub fn upstream_json(envelope: &Value) -> Value {
    let text = envelope["upstream-response"].as_str().expect("no upstream-response");
    serde_json::from_str(text).expect("upstream-response is not JSON")
}
