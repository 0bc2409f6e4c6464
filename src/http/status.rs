//! `/status`: process uptime, for any method.

use std::time::Duration;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::http::response::with_server_header;
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub uptime: String,
}

pub async fn get_status(State(state): State<AppState>) -> Response {
    let report = StatusReport {
        uptime: format_uptime(state.uptime()),
    };
    with_server_header(Json(report).into_response(), state.server_header())
}

/// Render a duration as `1h2m3.5s`, `2m0s`, `4.25ms`, `0s`.
pub fn format_uptime(elapsed: Duration) -> String {
    let nanos = elapsed.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }

    if nanos < 1_000 {
        return format!("{}ns", nanos);
    }
    if nanos < 1_000_000 {
        return format!("{}µs", trim_fraction(nanos, 1_000));
    }
    if nanos < 1_000_000_000 {
        return format!("{}ms", trim_fraction(nanos, 1_000_000));
    }

    let total_secs = elapsed.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs_nanos = u128::from(total_secs % 60) * 1_000_000_000 + u128::from(elapsed.subsec_nanos());
    let seconds = trim_fraction(secs_nanos, 1_000_000_000);

    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// `value / unit` as a decimal with trailing zeros removed.
fn trim_fraction(value: u128, unit: u128) -> String {
    let whole = value / unit;
    let frac = value % unit;
    if frac == 0 {
        return whole.to_string();
    }
    let width = unit.to_string().len() - 1;
    let digits = format!("{:0width$}", frac, width = width);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}
