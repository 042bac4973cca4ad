//! Mini Proxy - A forwarding HTTP proxy with an in-memory object cache
//!
//! Relays GET requests to origin servers and caches small responses so
//! repeat fetches are answered locally.

mod api;
mod cache;
mod config;
mod error;
mod models;
mod proxy;
mod state;
mod tasks;

use std::net::SocketAddr;
use std::process;

use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use state::AppState;
use tasks::spawn_report_task;

/// Main entry point for the proxy.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Read the listening port from the command line and knobs from the environment
/// 3. Create the shared cache
/// 4. Start the background cache report task
/// 5. Start the admin server when a port is configured
/// 6. Bind the proxy listener and serve connections
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mini_proxy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // A wrong invocation terminates before any socket work
    let config = match Config::from_args(std::env::args()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    };

    info!("Starting Mini Proxy");
    info!(
        "Configuration loaded: listen_port={}, admin_port={:?}, stats_interval={}s",
        config.listen_port, config.admin_port, config.stats_interval
    );

    // One cache for the whole process, shared with every connection task
    let state = AppState::default();
    info!("Cache store initialized");

    // Start background report task
    let report_handle = spawn_report_task(state.cache.clone(), config.stats_interval);
    info!("Background report task started");

    // Optional admin surface on loopback
    let admin_handle = config
        .admin_port
        .map(|port| api::spawn_admin_server(port, state.clone()));

    // Bind the proxy listener
    let addr = SocketAddr::from(([0, 0, 0, 0], config.listen_port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%addr, %err, "failed to bind listener");
            process::exit(1);
        }
    };
    info!("Proxy listening on {}", addr);

    // Serve until a shutdown signal arrives
    tokio::select! {
        _ = proxy::run(listener, state) => {}
        _ = shutdown_signal() => {}
    }

    // Abort the background tasks
    report_handle.abort();
    if let Some(handle) = admin_handle {
        handle.abort();
    }
    warn!("Background tasks aborted");

    info!("Proxy shutdown complete");
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
