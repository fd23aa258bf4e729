//! Server startup helper.
//!
//! Provides [`spawn_server`] which binds eagerly and then runs the
//! Fixcast server on a background Tokio task, shutting down on Ctrl-C.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fixcast_core::{Hub, ServerConfig};
//! use fixcast_server::{AppState, spawn_server};
//! use std::sync::Arc;
//!
//! let hub = Arc::new(Hub::with_buffer(64));
//! let state = Arc::new(AppState::new(hub));
//! let handle = spawn_server(&ServerConfig::default(), state).await?;
//! handle.await?;
//! ```

use std::sync::Arc;

use fixcast_core::ServerConfig;
use tokio::task::JoinHandle;

use crate::server::{ServerError, bind, ctrl_c, serve};
use crate::state::AppState;

/// Errors that can occur when spawning the server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the HTTP server on a background Tokio task.
///
/// The listener is bound before the task is spawned so a bad address or
/// a port in use is reported to the caller instead of only being logged.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the listener cannot bind.
pub async fn spawn_server(
    config: &ServerConfig,
    state: Arc<AppState>,
) -> Result<JoinHandle<()>, StartupError> {
    let listener = bind(config).await?;

    let handle = tokio::spawn(async move {
        if let Err(e) = serve(listener, state, ctrl_c()).await {
            tracing::error!(error = %e, "Fixcast server exited with error");
        }
    });

    tracing::info!(host = %config.host, port = config.port, "Fixcast server spawned on background task");

    Ok(handle)
}
