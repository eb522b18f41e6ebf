//! Orchestrator probe endpoints: `/health`, `/ready`, `/live`.
//!
//! None of these check real dependencies. `/health` and `/live` always
//! answer 200 while the process can respond; `/ready` is gated purely on
//! elapsed uptime so a rollout sees a realistic warm-up window.

use std::{sync::Arc, time::Duration};

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::{
    error::AppError,
    state::{timestamp, AppState},
};

/// Uptime after which `/ready` starts answering 200. The comparison is strict:
/// at exactly this uptime the service is still not ready.
pub const READY_AFTER: Duration = Duration::from_secs(10);

/// `GET /health` — status, build and pod metadata, memory snapshot.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = &state.config;
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "timestamp": timestamp(),
            "version": config.version,
            "hostname": state.process.hostname(),
            "uptime": state.uptime_secs(),
            "memory": state.process.memory(),
            "environment": config.environment,
            "project": super::PROJECT,
            "kubernetes": {
                "namespace": config.kubernetes.namespace,
                "pod_name": config.kubernetes.pod_name,
                "service_account": config.kubernetes.service_account,
            },
        })),
    )
}

/// `GET /ready` — 200 once uptime exceeds [`READY_AFTER`], 503 before that.
pub async fn ready(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let uptime = state.process.uptime();
    let uptime_secs = uptime.as_secs_f64();
    if uptime <= READY_AFTER {
        return Err(AppError::NotReady { uptime_secs });
    }
    Ok(Json(json!({
        "status": "ready",
        "timestamp": timestamp(),
        "uptime": uptime_secs,
    })))
}

/// `GET /live` — always 200. Safe as a liveness probe: no I/O, never blocks.
pub async fn live(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "alive",
            "timestamp": timestamp(),
            "pid": state.process.pid(),
            "uptime": state.uptime_secs(),
        })),
    )
}
