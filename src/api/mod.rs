//! HTTP surface: six fixed `GET` routes, no authentication.
//!
//! | Route               | Handler                  |
//! |---------------------|--------------------------|
//! | `/`                 | [`info::index`]          |
//! | `/health`           | [`health::health`]       |
//! | `/ready`            | [`health::ready`]        |
//! | `/live`             | [`health::live`]         |
//! | `/load/{intensity}` | [`load::load`]           |
//! | `/metrics`          | [`metrics::metrics`]     |

use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use crate::state::AppState;

pub mod health;
pub mod info;
pub mod load;
pub mod metrics;
pub mod request_id;

/// Project name reported by `/` and `/health`.
pub const PROJECT: &str = "DevOps Kubernetes";

/// Build the application router with request-id and tracing middleware.
pub fn router(state: Arc<AppState>) -> Router {
    let trace_layer = tower_http::trace::TraceLayer::new_for_http()
        .make_span_with(tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO))
        .on_response(tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO));

    Router::new()
        .route("/", get(info::index))
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/live", get(health::live))
        .route("/load", get(load::load_default))
        .route("/load/", get(load::load_default))
        .route("/load/{intensity}", get(load::load))
        .route("/metrics", get(metrics::metrics))
        .with_state(state)
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(trace_layer)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::{
        config::Config, counters::FixedSource, process::testing::FakeProcess, state::AppState,
    };

    #[tokio::test]
    async fn unknown_route_is_404() {
        let state = Arc::new(AppState::new(
            Arc::new(Config::default()),
            Arc::new(FakeProcess::with_uptime(1.0)),
            Arc::new(FixedSource::new(vec![0])),
        ));
        let req = Request::builder()
            .uri("/does-not-exist")
            .body(Body::empty())
            .unwrap();
        let resp = super::router(state).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn post_to_probe_is_rejected() {
        let state = Arc::new(AppState::new(
            Arc::new(Config::default()),
            Arc::new(FakeProcess::with_uptime(1.0)),
            Arc::new(FixedSource::new(vec![0])),
        ));
        let req = Request::builder()
            .method("POST")
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = super::router(state).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
