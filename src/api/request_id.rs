//! Request ID middleware.
//!
//! Every inbound request is assigned an `X-Request-ID`:
//!
//! - Accepted from the caller (ingress controllers usually set one)
//! - Freshly generated (UUID v4) otherwise
//! - Echoed back in the `X-Request-ID` response header
//! - Attached to a [`tracing`] span so log lines for the request carry it

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Instrument as _;
use uuid::Uuid;

pub const HEADER: &str = "x-request-id";

/// Assigned request ID, read by handlers through an axum `Extension`
/// (the `/load` handlers log it next to the run's timing).
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Apply **inside** `tower_http::TraceLayer` so it runs within the trace span.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(id.clone()));

    let span = tracing::debug_span!("request_id", id = %id);
    let mut response = next.run(req).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(HEADER, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    use super::HEADER;
    use crate::{
        config::Config, counters::FixedSource, process::testing::FakeProcess, state::AppState,
    };

    fn app() -> axum::Router {
        let state = Arc::new(AppState::new(
            Arc::new(Config::default()),
            Arc::new(FakeProcess::with_uptime(1.0)),
            Arc::new(FixedSource::new(vec![0])),
        ));
        crate::api::router(state)
    }

    #[tokio::test]
    async fn caller_supplied_id_is_echoed() {
        let req = Request::builder()
            .uri("/live")
            .header(HEADER, "abc-123")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.headers()[HEADER], "abc-123");
    }

    #[tokio::test]
    async fn missing_id_is_generated_as_uuid() {
        let req = Request::builder().uri("/live").body(Body::empty()).unwrap();
        let resp = app().oneshot(req).await.unwrap();
        let id = resp.headers()[HEADER].to_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok(), "not a uuid: {id}");
    }

    #[tokio::test]
    async fn load_handler_sees_the_assigned_id() {
        let req = Request::builder()
            .uri("/load/1")
            .header(HEADER, "load-run-7")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), axum::http::StatusCode::OK);
        assert_eq!(resp.headers()[HEADER], "load-run-7");
    }

    #[tokio::test]
    async fn not_ready_responses_also_carry_an_id() {
        let req = Request::builder().uri("/ready").body(Body::empty()).unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), axum::http::StatusCode::SERVICE_UNAVAILABLE);
        assert!(resp.headers().contains_key(HEADER));
    }
}
