//! Axum router construction for the Fixcast server.
//!
//! Assembles all routes (REST + SSE) into a single [`Router`] with CORS
//! open to any origin, since devices and the map UI are usually served
//! from elsewhere.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::sse;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /ping` -- liveness probe
/// - `POST /ingest` -- device fix ingestion
/// - `GET /events` -- Server-Sent Events stream
/// - `GET /devices` -- list devices
/// - `GET /device/{id}` -- single device
/// - `GET /api/status` -- counts and uptime
///
/// When `server.static_dir` is set, any other path is served from that
/// directory, falling back to its `index.html` so client-side routes work.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = DefaultBodyLimit::max(state.server.max_body_bytes);

    let router = Router::new()
        .route("/ping", get(handlers::ping))
        .route("/ingest", post(handlers::ingest).layer(body_limit))
        .route("/events", get(sse::events))
        .route("/devices", get(handlers::list_devices))
        .route("/device/{id}", get(handlers::get_device))
        .route("/api/status", get(handlers::status));

    let router = match state.server.static_dir.as_deref() {
        Some(dir) => router.fallback_service(spa_assets(dir)),
        None => router,
    };

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn spa_assets(dir: &Path) -> ServeDir<ServeFile> {
    ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")))
}
