//! parmsync-server - authoritative parameter service
//!
//! Holds the authoritative record, runs the simulated backend ticker, and
//! serves `/get` and `/set` to parmsync clients.

use anyhow::{Context, Result};
use clap::Parser;
use parmsync_common::config::TomlConfig;
use parmsync_server::ticker::Ticker;
use parmsync_server::{build_info, build_router, AppState};
use std::path::PathBuf;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Command-line arguments for parmsync-server
#[derive(Parser, Debug)]
#[command(name = "parmsync-server")]
#[command(about = "Authoritative parameter server for parmsync")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "PARMSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overrides server.bind_addr
    #[arg(short, long, env = "PARMSYNC_SERVER_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Parsed before tracing exists so logging.level can apply; the outcome
    // is reported once the subscriber is up
    let (mut config, source) =
        TomlConfig::load_or_default(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .init();

    // Build identification first, before anything that can stall
    info!("{}", build_info().banner());
    source.log();

    let schema = config.schema().context("Invalid parameter table")?;
    info!(
        "Parameters: {}",
        schema
            .iter()
            .map(|p| format!("{}{}", p.name, if p.settable { " (settable)" } else { "" }))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let state = AppState::with_schema(schema);
    let cancel = CancellationToken::new();

    let ticker = Ticker::new(
        state.record().clone(),
        &config.tick_rules(),
        config.server.tick_period(),
    )
    .context("Invalid ticker configuration")?;
    let ticker_task = ticker.spawn(cancel.child_token());

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.server.bind_addr))?;
    info!("parmsync-server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await
        .context("Server error")?;

    cancel.cancel();
    ticker_task.await.context("Ticker task failed")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM, then cancel background tasks
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }

    cancel.cancel();
}
