//! Dashboard server startup helper for embedding in the engine.
//!
//! [`spawn_observer`] launches the HTTP + `WebSocket` server on a
//! background Tokio task so it runs alongside the run launcher.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError};
use crate::state::AppState;

/// Spawn the dashboard server on a background Tokio task.
///
/// The address is validated before spawning so obvious misconfiguration
/// fails startup instead of a background task. Bind and serve failures
/// after that point are logged from inside the task.
pub fn spawn_observer(config: ServerConfig, state: Arc<AppState>) -> Result<JoinHandle<()>, ServerError> {
    let addr = config.socket_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = crate::server::start_server(&config, state).await {
            tracing::error!(error = %e, "Dashboard server exited with error");
        }
    });

    tracing::info!(%addr, "Dashboard server spawned on background task");

    Ok(handle)
}
