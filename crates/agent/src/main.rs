//! `eir` -- host health aggregation and self-healing daemon.
//!
//! Probes write one result file each into `ResultDir`; `eir run` folds
//! them into a host status every `WatchInterval` seconds, runs the
//! configured actions and notifies on status changes, and can serve the
//! saved state over HTTP.
//!
//! # Environment variables
//!
//! | Variable     | Default                   | Description                      |
//! |--------------|---------------------------|----------------------------------|
//! | `EIR_CONFIG` | searched (see `--config`) | Configuration file for `eir run` |
//! | `RUST_LOG`   | `info`, `debug` if `Debug`| Log filter                       |

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use eir_agent::cli::{self, Cli, Commands};
use eir_agent::watcher::Watcher;
use eir_api::state::AppState;
use eir_core::{EirConfig, StateStore};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const LOG_TARGETS: [&str; 5] = ["eir_agent", "eir_core", "eir_events", "eir_api", "tower_http"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    match Cli::parse().command {
        Commands::Version => println!("{}", cli::version_line()),
        Commands::Confsample => print!("{}", eir_core::config::SAMPLE),
        Commands::Run { config } => {
            let config = EirConfig::load(config.as_deref()).context("Failed to load configuration")?;
            init_tracing(config.debug)?;
            run(Arc::new(config)).await?;
        }
    }

    Ok(())
}

fn init_tracing(debug: bool) -> anyhow::Result<()> {
    let level = if debug { "debug" } else { "info" };
    let default_filter = LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .context("Failed to initialize logging")
}

async fn run(config: Arc<EirConfig>) -> anyhow::Result<()> {
    for warning in config.warnings() {
        tracing::warn!("{warning}");
    }

    tracing::info!(
        version = eir_core::host::VERSION,
        dry_run = config.dry_run,
        "Starting eir"
    );

    let cancel = CancellationToken::new();

    let server = if config.enable_http_status {
        let addr: SocketAddr = config
            .http_listen_on
            .parse()
            .with_context(|| format!("Invalid HttpListenOn address {}", config.http_listen_on))?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind status server to {addr}"))?;
        tracing::info!(%addr, "Status server listening");

        let app = eir_api::app(AppState::new(StateStore::new(config.status_file.clone())));
        let server_cancel = cancel.clone();
        Some(tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move { server_cancel.cancelled().await })
                .await;
            if let Err(e) = result {
                tracing::error!(error = %e, "Status server failed");
            }
        }))
    } else {
        None
    };

    let watcher = Watcher::from_config(Arc::clone(&config))
        .context("Failed to set up notifiers")?;
    let watch_cancel = cancel.clone();
    let watch_handle = tokio::spawn(async move { watcher.run(watch_cancel).await });

    shutdown_signal().await?;
    cancel.cancel();

    if let Err(e) = watch_handle.await {
        tracing::error!(error = %e, "Watch loop task failed");
    }
    if let Some(server) = server {
        if let Err(e) = server.await {
            tracing::error!(error = %e, "Status server task failed");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Wait for SIGINT (Ctrl-C) or SIGTERM.
async fn shutdown_signal() -> anyhow::Result<()> {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    let mut terminate =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?;

    #[cfg(unix)]
    let terminate = terminate.recv();

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Option<()>>();

    tokio::select! {
        result = ctrl_c => {
            result.context("Failed to install Ctrl-C handler")?;
            tracing::info!("Received SIGINT (Ctrl-C), shutting down");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }

    Ok(())
}
