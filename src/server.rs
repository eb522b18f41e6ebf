//! Top-level run loop, signal handling, and the container healthcheck client.
//!
//! Shutdown is immediate: when the [`CancellationToken`] fires, [`run`] stops
//! accepting connections and returns without waiting for in-flight requests.
//! Once `main` returns the runtime is dropped and any request still being
//! served is aborted. Orchestrators restart pods aggressively and this service
//! holds no state worth draining.

use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use axum::Router;
use tokio::{net::TcpListener, signal};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Serve `app` on `listener` until `shutdown` is cancelled.
pub async fn run(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let addr = listener.local_addr().context("reading listener address")?;
    info!(%addr, "listening");

    tokio::select! {
        result = axum::serve(listener, app) => {
            result.context("HTTP server error")?;
        }
        _ = shutdown.cancelled() => {
            info!("stopped accepting connections");
        }
    }

    Ok(())
}

/// Which termination signal arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Interrupt,
    Terminate,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
        })
    }
}

/// Install SIGINT/SIGTERM handlers and cancel `token` on the first one.
///
/// The handlers are registered before this returns, so call it before the
/// listener is bound: a signal that arrives once the port is open must never
/// hit the default disposition.
#[cfg(unix)]
pub fn spawn_signal_watcher(token: CancellationToken) -> anyhow::Result<()> {
    use signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt()).context("installing SIGINT handler")?;
    let mut terminate = signal(SignalKind::terminate()).context("installing SIGTERM handler")?;

    tokio::spawn(async move {
        let received = tokio::select! {
            _ = interrupt.recv() => Signal::Interrupt,
            _ = terminate.recv() => Signal::Terminate,
        };
        info!("{received} received, shutting down gracefully");
        token.cancel();
    });
    Ok(())
}

#[cfg(not(unix))]
pub fn spawn_signal_watcher(token: CancellationToken) -> anyhow::Result<()> {
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("{} received, shutting down gracefully", Signal::Interrupt);
            token.cancel();
        }
    });
    Ok(())
}

/// URLs logged at startup, one per route.
pub fn endpoint_urls(port: u16) -> Vec<(&'static str, String)> {
    [
        ("main", "/"),
        ("health", "/health"),
        ("ready", "/ready"),
        ("live", "/live"),
        ("metrics", "/metrics"),
        ("load", "/load/5"),
    ]
    .into_iter()
    .map(|(name, path)| (name, format!("http://localhost:{port}{path}")))
    .collect()
}

/// `GET /live` on the local port. `Ok(true)` on any 2xx.
pub async fn healthcheck(addr: SocketAddr) -> anyhow::Result<bool> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
        .context("building healthcheck client")?;
    let resp = client
        .get(format!("http://{addr}/live"))
        .send()
        .await
        .with_context(|| format!("requesting http://{addr}/live"))?;
    Ok(resp.status().is_success())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::Config, counters::FixedSource, process::testing::FakeProcess, state::AppState,
    };

    fn app(uptime: f64) -> Router {
        crate::api::router(Arc::new(AppState::new(
            Arc::new(Config::default()),
            Arc::new(FakeProcess::with_uptime(uptime)),
            Arc::new(FixedSource::new(vec![1])),
        )))
    }

    async fn spawn_server(
        uptime: f64,
    ) -> (SocketAddr, CancellationToken, tokio::task::JoinHandle<anyhow::Result<()>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let token = CancellationToken::new();
        let handle = tokio::spawn(run(listener, app(uptime), token.clone()));
        (addr, token, handle)
    }

    #[tokio::test]
    async fn serves_requests_until_cancelled() {
        let (addr, token, handle) = spawn_server(20.0).await;

        let resp = reqwest::get(format!("http://{addr}/ready")).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        token.cancel();
        let result = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("run loop did not exit promptly")
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn cancellation_stops_accepting_connections() {
        let (addr, token, handle) = spawn_server(20.0).await;
        token.cancel();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("run loop did not exit promptly")
            .unwrap()
            .unwrap();

        assert!(reqwest::get(format!("http://{addr}/live")).await.is_err());
    }

    #[tokio::test]
    async fn healthcheck_passes_against_live_server() {
        let (addr, token, _handle) = spawn_server(0.0).await;
        assert!(healthcheck(addr).await.unwrap());
        token.cancel();
    }

    #[tokio::test]
    async fn healthcheck_errors_when_nothing_listens() {
        // Bind then drop to get a port that is very likely closed.
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        assert!(healthcheck(addr).await.is_err());
    }

    #[test]
    fn startup_urls_cover_every_route() {
        let urls = endpoint_urls(3000);
        let names: Vec<&str> = urls.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["main", "health", "ready", "live", "metrics", "load"]);
        assert_eq!(urls[0].1, "http://localhost:3000/");
        assert_eq!(urls[5].1, "http://localhost:3000/load/5");
    }

    #[tokio::test]
    async fn signal_watcher_installs_without_cancelling() {
        let token = CancellationToken::new();
        spawn_signal_watcher(token.clone()).unwrap();
        tokio::task::yield_now().await;
        assert!(!token.is_cancelled());
    }

    #[test]
    fn signal_names_match_posix() {
        assert_eq!(Signal::Interrupt.to_string(), "SIGINT");
        assert_eq!(Signal::Terminate.to_string(), "SIGTERM");
    }
}
