//! parmsync-client - parameter replica
//!
//! Mirrors the server's parameter record locally, forwards edits from the
//! local API, and logs a readout of every successful sync at debug level.

use anyhow::{Context, Result};
use clap::Parser;
use parmsync_client::sync_loop::SyncLoop;
use parmsync_client::transport::ServerTransport;
use parmsync_client::{build_info, build_router, AppState};
use parmsync_common::config::TomlConfig;
use std::path::PathBuf;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Command-line arguments for parmsync-client
#[derive(Parser, Debug)]
#[command(name = "parmsync-client")]
#[command(about = "Parameter replica client for parmsync")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "PARMSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Local API listen address, overrides client.bind_addr
    #[arg(short, long, env = "PARMSYNC_CLIENT_BIND")]
    bind: Option<String>,

    /// Server base URL, overrides client.server_url
    #[arg(short, long, env = "PARMSYNC_SERVER_URL")]
    server_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Parsed before tracing exists so logging.level can apply; the outcome
    // is reported once the subscriber is up
    let (mut config, source) =
        TomlConfig::load_or_default(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(bind) = args.bind {
        config.client.bind_addr = bind;
    }
    if let Some(url) = args.server_url {
        config.client.server_url = url;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .init();

    info!("{}", build_info().banner());
    source.log();

    let schema = config.schema().context("Invalid parameter table")?;
    info!("Replicating {} parameters", schema.len());

    let transport = ServerTransport::new(&config.client.server_url, config.client.request_timeout())
        .context("Failed to build HTTP client")?;

    let state = AppState::new(schema);
    let cancel = CancellationToken::new();

    let sync = SyncLoop::new(
        transport,
        state.replica.clone(),
        state.edits.clone(),
        state.status.clone(),
        config.client.sync_interval(),
    );
    let sync_task = sync.spawn(cancel.child_token());

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.client.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.client.bind_addr))?;
    info!("parmsync-client listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await
        .context("Server error")?;

    cancel.cancel();
    sync_task.await.context("Sync task failed")?;

    info!("Client shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM, then cancel the sync loop
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
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }

    cancel.cancel();
}
