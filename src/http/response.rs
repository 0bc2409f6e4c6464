//! Response envelope returned to the caller.
//!
//! # Responsibilities
//! - Wrap the upstream outcome in `{message, upstream-response, error}`
//! - Compact JSON upstream bodies, pass anything else through as text
//! - Stamp every gateway response with `Content-Type` and `x-server`
//!
//! # Design Decisions
//! - The upstream status code is not propagated: forwarding success is always 200
//! - `serde_json` runs with `preserve_order` and `arbitrary_precision`, so a
//!   parse/serialize round trip keeps key order and number text

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

pub const X_SERVER: &str = "x-server";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

/// JSON body of every dispatcher response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
    pub message: Outcome,

    #[serde(rename = "upstream-response", skip_serializing_if = "Option::is_none")]
    pub upstream_response: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    /// The host has no backend configured.
    pub fn unmapped() -> Self {
        Self {
            message: Outcome::Failure,
            upstream_response: None,
            error: None,
        }
    }

    /// The backend could not be reached or did not answer in time.
    pub fn transport_failure(error: impl Into<String>) -> Self {
        Self {
            message: Outcome::Failure,
            upstream_response: None,
            error: Some(error.into()),
        }
    }

    pub fn success(upstream_response: String) -> Self {
        Self {
            message: Outcome::Success,
            upstream_response: Some(upstream_response),
            error: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.message {
            Outcome::Success => StatusCode::OK,
            Outcome::Failure => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Render with the gateway's standard headers.
    pub fn into_gateway_response(self, server: &HeaderValue) -> Response {
        let status = self.status();
        with_server_header((status, Json(self)).into_response(), server)
    }
}

/// Stamp `x-server` and the JSON content type on a response.
pub fn with_server_header(mut response: Response, server: &HeaderValue) -> Response {
    let headers = response.headers_mut();
    headers.insert(X_SERVER, server.clone());
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

/// Body text carried in `upstream-response`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedBody {
    /// Empty upstream body.
    Empty,
    /// Valid JSON, compacted.
    Json(String),
    /// Not JSON; passed through verbatim (lossy UTF-8).
    Raw(String),
}

impl NormalizedBody {
    pub fn into_string(self) -> String {
        match self {
            NormalizedBody::Empty => String::new(),
            NormalizedBody::Json(s) | NormalizedBody::Raw(s) => s,
        }
    }
}

/// Classify and normalize an upstream body.
pub fn normalize_body(body: &[u8]) -> NormalizedBody {
    if body.is_empty() {
        return NormalizedBody::Empty;
    }
    match compact_json(body) {
        Ok(json) => NormalizedBody::Json(json),
        Err(_) => NormalizedBody::Raw(String::from_utf8_lossy(body).into_owned()),
    }
}

fn compact_json(body: &[u8]) -> Result<String, serde_json::Error> {
    let value: Value = serde_json::from_slice(body)?;
    serde_json::to_string(&value)
}
