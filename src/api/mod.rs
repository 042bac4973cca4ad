//! API Module
//!
//! Read-only admin surface served on the loopback interface beside the
//! proxy listener. Disabled unless a port is configured; the proxy is
//! fully functional without it.
//!
//! # Endpoints
//! - `GET /stats` - Cache counters
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use routes::create_router;

use std::net::SocketAddr;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::state::AppState;

/// Spawns the admin HTTP server on `127.0.0.1:<port>`.
///
/// Bind and serve failures are logged on the spawned task; they never
/// affect the proxy itself.
///
/// # Returns
/// A JoinHandle for the server task, used to abort it during shutdown.
pub fn spawn_admin_server(port: u16, state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(err) = serve(port, state).await {
            error!(%err, "admin server failed");
        }
    })
}

async fn serve(port: u16, state: AppState) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Admin endpoints on http://{}", addr);

    let app = routes::create_router(state);
    axum::serve(listener, app).await?;

    Ok(())
}
