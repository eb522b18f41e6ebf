//! Prometheus-style `/metrics` endpoint.
//!
//! The gauges (uptime, memory) are real. The two `http_requests_total`
//! samples are NOT counters: they are drawn from the [`CounterSource`] on
//! every scrape so scaling pipelines have something that moves.
//!
//! Metric families:
//! - `http_requests_total`        — synthetic, labelled by method and endpoint
//! - `process_uptime_seconds`     — seconds since startup
//! - `nodejs_memory_usage_bytes`  — rss / heapUsed / heapTotal; the family
//!   name is kept for compatibility with existing dashboards
//!
//! [`CounterSource`]: crate::counters::CounterSource

use std::{fmt::Write as _, sync::Arc};

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};

use crate::{process::MemoryUsage, state::AppState};

/// Exclusive upper bounds for the synthetic request counters, in label order.
const REQUEST_SAMPLES: [(&str, u64); 2] = [("/", 1000), ("/health", 100)];

/// `GET /metrics` — renders Prometheus text format.
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let requests: Vec<(&str, u64)> = REQUEST_SAMPLES
        .iter()
        .map(|&(endpoint, upper)| (endpoint, state.counters.sample(upper)))
        .collect();

    let out = render(&requests, state.uptime_secs(), state.process.memory());

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        out,
    )
}

/// Render the exposition text. Pure so the exact format can be asserted.
pub fn render(requests: &[(&str, u64)], uptime_secs: f64, memory: MemoryUsage) -> String {
    let mut out = String::with_capacity(768);

    out.push_str("# HELP http_requests_total Total HTTP requests\n");
    out.push_str("# TYPE http_requests_total counter\n");
    for (endpoint, count) in requests {
        let _ = writeln!(
            out,
            "http_requests_total{{method=\"GET\",endpoint=\"{endpoint}\"}} {count}"
        );
    }
    out.push('\n');

    out.push_str("# HELP process_uptime_seconds Process uptime in seconds\n");
    out.push_str("# TYPE process_uptime_seconds gauge\n");
    let _ = writeln!(out, "process_uptime_seconds {uptime_secs}");
    out.push('\n');

    out.push_str("# HELP nodejs_memory_usage_bytes Node.js memory usage\n");
    out.push_str("# TYPE nodejs_memory_usage_bytes gauge\n");
    for (kind, bytes) in [
        ("rss", memory.rss),
        ("heapUsed", memory.heap_used),
        ("heapTotal", memory.heap_total),
    ] {
        let _ = writeln!(out, "nodejs_memory_usage_bytes{{type=\"{kind}\"}} {bytes}");
    }

    // No trailing newline after the last sample.
    let len = out.trim_end().len();
    out.truncate(len);
    out
}
