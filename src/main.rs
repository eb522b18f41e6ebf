use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::process::ProcessInfo as _;

mod api;
mod config;
mod counters;
mod error;
mod process;
mod server;
mod state;

pub use config::{Config, LogFormat};
pub use error::AppError;
pub use state::AppState;

// One request-handling thread: `/load` is meant to monopolise it while it runs.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Container HEALTHCHECK mode: probe /live on the local port and exit.
    // Keeps curl/wget out of the image.
    if std::env::args().nth(1).as_deref() == Some("--healthcheck") {
        return healthcheck().await;
    }

    let process = Arc::new(process::SystemProcess::new());
    let config = Config::from_env(process.hostname())
        .context("invalid environment configuration")?;

    init_tracing(config.log_format);

    info!(
        port = config.port,
        version = %config.version,
        environment = %config.environment,
        namespace = %config.kubernetes.namespace,
        pod = %config.kubernetes.pod_name,
        "probe-server starting"
    );

    // Handlers go in before the port opens so an early SIGTERM still exits 0.
    let shutdown = CancellationToken::new();
    server::spawn_signal_watcher(shutdown.clone())?;

    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    for (name, url) in server::endpoint_urls(config.port) {
        info!(endpoint = name, %url, "endpoint available");
    }

    let state = Arc::new(AppState::system(Arc::new(config), process));
    let app = api::router(state);

    server::run(listener, app, shutdown).await?;

    // In-flight requests are dropped with the runtime; exit status is 0.
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "probe_server=info,tower_http=warn".into());

    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

/// `probe-server --healthcheck`: exit 0 if `/live` answers 2xx, 1 otherwise.
async fn healthcheck() -> anyhow::Result<()> {
    let port = std::env::var("PORT")
        .ok()
        .and_then(|v| v.trim().parse::<u16>().ok())
        .unwrap_or(config::defaults::PORT);

    let healthy = server::healthcheck(([127, 0, 0, 1], port).into())
        .await
        .unwrap_or(false);

    std::process::exit(if healthy { 0 } else { 1 });
}
