use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use conteggio::config::Config;
use conteggio::monitor::Monitor;
use conteggio::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Reports own stdout, diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_filter)
                .with_context(|| format!("invalid log filter {:?}", config.log_filter))?,
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(
        attribute = %config.attribute,
        duration = ?config.duration,
        format = ?config.format,
        "starting application"
    );

    let monitor = Arc::new(Monitor::new(config.duration).with_renderer(config.renderer()));
    let token = CancellationToken::new();

    let reporter = tokio::spawn({
        let monitor = Arc::clone(&monitor);
        let token = token.clone();
        async move { monitor.run(token).await }
    });

    tokio::spawn({
        let token = token.clone();
        async move {
            wait_for_shutdown_signal().await;
            tracing::info!("shutting down gRPC server");
            token.cancel();
        }
    });

    let served = server::serve(&config, monitor, token.clone()).await;

    token.cancel();
    reporter.await.context("reporter task failed")?;

    served.context("gRPC server failed")
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => tracing::info!("received CTRL+C"),
                    _ = sigterm.recv() => tracing::info!("received SIGTERM"),
                }
                return;
            }
            Err(err) => tracing::warn!(error = %err, "failed to register SIGTERM handler"),
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received CTRL+C"),
        Err(err) => {
            tracing::warn!(error = %err, "failed to listen for CTRL+C");
            std::future::pending::<()>().await;
        }
    }
}
