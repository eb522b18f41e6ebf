//! Error type for axum request handlers.
//!
//! [`AppError`] converts into an HTTP response via [`IntoResponse`], so a
//! handler can return `Result<T, AppError>` and leave the status code and
//! JSON body to this module.
//!
//! The only failure a probe target reports on the request path is "not ready
//! yet". Everything else either always succeeds or is a process-level fault
//! that the orchestrator handles by restarting the pod.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::state::timestamp;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The readiness window has not elapsed yet.
    #[error("Application is starting up")]
    NotReady { uptime_secs: f64 },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotReady { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::NotReady { uptime_secs } => {
                tracing::debug!(uptime = uptime_secs, "readiness probe rejected");
                json!({
                    "status": "not_ready",
                    "timestamp": timestamp(),
                    "uptime": uptime_secs,
                    "message": self.to_string(),
                })
            }
        };
        (status, Json(body)).into_response()
    }
}
