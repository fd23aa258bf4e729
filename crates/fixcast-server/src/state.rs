//! Shared application state for the Fixcast HTTP server.
//!
//! [`AppState`] carries the one [`Hub`] of the process (which owns the
//! device store) plus the listener settings the router needs. It is
//! wrapped in [`Arc`] and injected via Axum's `State` extractor; there are
//! no ambient globals.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use fixcast_core::{Hub, ServerConfig};

/// Shared state for the Axum application.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The broadcast hub and, through it, the device store.
    pub hub: Arc<Hub>,
    /// Listener, body limit and static asset settings.
    pub server: ServerConfig,
    /// When this server instance started.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create application state around `hub` with default server settings.
    pub fn new(hub: Arc<Hub>) -> Self {
        Self::with_config(hub, ServerConfig::default())
    }

    /// Create application state around `hub` with explicit settings.
    pub fn with_config(hub: Arc<Hub>, server: ServerConfig) -> Self {
        Self {
            hub,
            server,
            started_at: Utc::now(),
        }
    }

    /// Whole seconds since startup.
    pub fn uptime_seconds(&self) -> i64 {
        Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
            .max(0)
    }
}
