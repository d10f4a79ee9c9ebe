//! Server startup helper for the engine binary.
//!
//! Provides [`spawn_server`] which launches the HTTP + `WebSocket` server on
//! a background Tokio task.
//!
//! # Usage
//!
//! ```rust,ignore
//! use codex_server::startup::spawn_server;
//!
//! let handle = spawn_server(ServerConfig::default(), state)?;
//! // The server is now running. The handle can be awaited on shutdown.
//! ```

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the HTTP server on a background Tokio task.
///
/// The server runs until the Tokio runtime is shut down or the task is
/// aborted. The caller should hold the returned handle and abort or await
/// it during clean shutdown.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the configured address does not
/// parse. This is checked before the background task is spawned.
pub fn spawn_server(
    config: ServerConfig,
    state: Arc<AppState>,
) -> Result<JoinHandle<()>, StartupError> {
    let addr = config.socket_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = crate::server::start_server(&config, state).await {
            tracing::error!(error = %e, "Codex server exited with error");
        }
    });

    tracing::info!(%addr, "Codex server spawned on background task");

    Ok(handle)
}
