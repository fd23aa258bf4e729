//! Fixcast HTTP server lifecycle management.
//!
//! [`bind`] opens the TCP listener and [`serve`] runs the Axum server on
//! it until the given shutdown future resolves. On shutdown every open
//! event stream is closed through the hub, so graceful shutdown is not
//! held up by long-lived observers.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use fixcast_core::ServerConfig;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::router::build_router;
use crate::state::AppState;

/// Errors that can occur when starting or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}

/// Bind a TCP listener on the configured host and port.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address cannot be resolved or
/// bound.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, ServerError> {
    TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {}:{}: {e}", config.host, config.port)))
}

/// Serve requests on `listener` until `shutdown` resolves.
///
/// The peer address of every connection is made available to handlers,
/// which the ingestion endpoint uses as a device id fallback.
///
/// # Errors
///
/// Returns [`ServerError::Serve`] if the server hits a fatal I/O error.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("listener has no local address: {e}")))?;

    let hub = Arc::clone(&state.hub);
    let router = build_router(state);

    info!(%addr, "Fixcast server listening");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown.await;
        let closed = hub.disconnect_all();
        info!(streams = closed, "Shutting down, closed event streams");
    })
    .await
    .map_err(|e| ServerError::Serve(e.to_string()))?;

    info!(%addr, "Fixcast server stopped");
    Ok(())
}

/// Resolve once Ctrl-C is received.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_error_is_prefixed_once() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "peer reset");
        let err = ServerError::Serve(io.to_string());
        assert_eq!(err.to_string(), "serve error: peer reset");
    }
}
