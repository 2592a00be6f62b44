use crate::config::ServerConfig;
use crate::signaling::{SignalingService, router};
use anyhow::{Context, Result};
use std::future::Future;
use tokio::net::TcpListener;
use tracing::info;

/// Binds `config.bind` and serves until Ctrl-C.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;

    run(listener, config, shutdown_signal()).await
}

/// Serves the exchange store on an already bound listener until `shutdown` resolves.
pub async fn run<F>(listener: TcpListener, config: ServerConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    let service = SignalingService::new(config);
    let sweeper = service.spawn_sweeper();

    info!("Exchange store listening on http://{}", addr);

    let result = axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await;

    sweeper.abort();
    info!("Exchange store stopped");

    result.context("Exchange store server failed")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
