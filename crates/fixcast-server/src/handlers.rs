//! REST endpoint handlers for the Fixcast server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/ping` | Liveness probe, plain `pong` |
//! | `POST` | `/ingest` | Accept one fix from a reporting device |
//! | `GET` | `/devices` | Every known device (debug) |
//! | `GET` | `/device/{id}` | One device by id (debug) |
//! | `GET` | `/api/status` | Device and subscriber counts |
//!
//! The live stream lives in [`crate::sse`].

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::{Extensions, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use fixcast_core::{FixCandidate, Origin};
use fixcast_types::DeviceView;

use crate::error::ApiError;
use crate::state::AppState;

/// Header a device may use to identify itself when it cannot put an id
/// in the body.
pub const DEVICE_ID_HEADER: &str = "x-device-id";

// ---------------------------------------------------------------------------
// GET /ping
// ---------------------------------------------------------------------------

/// Liveness probe.
pub async fn ping() -> &'static str {
    "pong"
}

// ---------------------------------------------------------------------------
// POST /ingest
// ---------------------------------------------------------------------------

/// Accept one fix from a reporting device.
///
/// The device id comes from the body `id`, else the `X-Device-Id`
/// header, else the caller's IP address, else `"unknown"`. Responds as
/// soon as the update is queued for observers.
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    extensions: Extensions,
    body: Result<Json<FixCandidate>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(candidate) = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::InvalidFix(rejection.body_text())
        }
    })?;

    let origin = Origin {
        device_header: headers
            .get(DEVICE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned),
        remote_addr: extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip()),
    };

    fixcast_core::ingest(&state.hub, &origin, &candidate)?;

    Ok(Json(serde_json::json!({ "ok": true })))
}

// ---------------------------------------------------------------------------
// GET /devices
// ---------------------------------------------------------------------------

/// List every device that has ever reported, ordered by id.
pub async fn list_devices(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let devices: Vec<DeviceView> = state
        .hub
        .store()
        .snapshot()?
        .iter()
        .map(DeviceView::from)
        .collect();

    Ok(Json(devices))
}

// ---------------------------------------------------------------------------
// GET /device/{id}
// ---------------------------------------------------------------------------

/// Return the latest record for one device.
pub async fn get_device(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.hub.store().get(&id)?;
    Ok(Json(record.to_view()))
}

// ---------------------------------------------------------------------------
// GET /api/status
// ---------------------------------------------------------------------------

/// Device count, open stream count and uptime.
pub async fn status(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let devices = state.hub.store().len()?;

    Ok(Json(serde_json::json!({
        "devices": devices,
        "subscribers": state.hub.subscriber_count(),
        "started_at": state.started_at,
        "uptime_seconds": state.uptime_seconds(),
    })))
}
