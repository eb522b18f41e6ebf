//! Synthetic CPU load for autoscaler testing (`GET /load/{intensity}`).
//!
//! The loop runs inline on the request task with no yield points. On the
//! single-threaded runtime this stalls every other request for the duration,
//! which is exactly the pressure an HPA test wants to generate.

use std::{sync::Arc, time::Instant};

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use serde::Serialize;

use super::request_id::RequestId;
use crate::state::{timestamp, AppState};

/// Loop iterations per unit of intensity.
pub const ITERATIONS_PER_INTENSITY: u64 = 10_000;

/// Characters of the accumulated sum echoed back to the caller.
const RESULT_PREFIX_LEN: usize = 10;

#[derive(Debug, Serialize)]
pub struct LoadReport {
    pub message: &'static str,
    pub intensity: u64,
    pub iterations: u64,
    pub duration_ms: u64,
    pub result: String,
    pub hostname: String,
    pub timestamp: String,
}

/// Parse the `intensity` path segment from its leading digits, so `2.5` is 2
/// and `12px` is 12. Missing, non-numeric, zero, negative or overflowing
/// input means 1.
pub fn parse_intensity(raw: Option<&str>) -> u64 {
    raw.and_then(|s| {
        let s = s.trim();
        let s = s.strip_prefix('+').unwrap_or(s);
        let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        s[..end].parse::<u64>().ok()
    })
    .filter(|&n| n > 0)
    .unwrap_or(1)
}

/// Sum of `sqrt(i)` for `i` in `0..iterations`.
pub fn burn_cpu(iterations: u64) -> f64 {
    let mut result = 0.0_f64;
    for i in 0..iterations {
        result += (i as f64).sqrt();
    }
    result
}

/// Run the load loop and time it.
pub fn run(intensity: u64, hostname: &str) -> LoadReport {
    let iterations = intensity.saturating_mul(ITERATIONS_PER_INTENSITY);

    let start = Instant::now();
    let result = burn_cpu(iterations);
    let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    LoadReport {
        message: "Load test completed",
        intensity,
        iterations,
        duration_ms,
        result: result.to_string().chars().take(RESULT_PREFIX_LEN).collect(),
        hostname: hostname.to_string(),
        timestamp: timestamp(),
    }
}

/// `GET /load` and `GET /load/` — intensity 1.
pub async fn load_default(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
) -> impl IntoResponse {
    respond(&state, &request_id, 1)
}

/// `GET /load/{intensity}`.
pub async fn load(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(raw): Path<String>,
) -> impl IntoResponse {
    respond(&state, &request_id, parse_intensity(Some(&raw)))
}

fn respond(state: &AppState, request_id: &RequestId, intensity: u64) -> Json<LoadReport> {
    let report = run(intensity, state.process.hostname());
    tracing::debug!(
        request_id = %request_id.0,
        intensity = report.intensity,
        iterations = report.iterations,
        duration_ms = report.duration_ms,
        "load test completed"
    );
    Json(report)
}
