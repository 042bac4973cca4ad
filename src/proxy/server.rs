//! Proxy Server
//!
//! The accept loop: every accepted connection gets its own task running
//! the forwarding pipeline; the loop never joins them.

use tokio::net::TcpListener;
use tracing::{debug, warn};

use crate::state::AppState;

use super::forward::handle_connection;

/// Serves connections from an already-bound listener, forever.
///
/// Each accepted connection is handed to `handle_connection` on its own
/// spawned task. A handler error closes that connection only and is
/// logged; an accept failure is logged and the loop keeps going. The
/// returned future never resolves; the caller decides when to stop
/// polling it.
pub async fn run(listener: TcpListener, state: AppState) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                debug!(%peer, "accepted connection");
                let state = state.clone();
                tokio::spawn(async move {
                    if let Err(err) = handle_connection(stream, state).await {
                        debug!(%peer, %err, "connection closed with error");
                    }
                });
            }
            Err(err) => {
                warn!(%err, "accept failed");
            }
        }
    }
}
