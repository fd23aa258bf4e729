//! Server-Sent Events endpoint streaming live device state.
//!
//! Clients connect to `GET /events` and receive, in order:
//!
//! 1. one `snapshot` event whose data is a JSON array of every known
//!    device
//! 2. an `update` event with a single device object for every accepted
//!    ingestion
//! 3. a `: keep-alive` comment on every hub heartbeat
//!
//! Each connection drains its own hub subscription. When the client goes
//! away or a write fails, Axum drops the response stream, which drops the
//! subscription and deregisters it from the hub.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderName, HeaderValue};
use axum::response::IntoResponse;
use axum::response::sse::{Event, Sse};
use fixcast_core::{CoreError, HubEvent};
use fixcast_types::DeviceView;
use futures::StreamExt as _;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Name of the event carrying the full device list.
pub const SNAPSHOT_EVENT: &str = "snapshot";

/// Name of the event carrying one changed device.
pub const UPDATE_EVENT: &str = "update";

/// Comment text sent on every heartbeat.
pub const KEEP_ALIVE_COMMENT: &str = "keep-alive";

/// Open a live event stream.
///
/// # Route
///
/// `GET /events`
pub async fn events(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let subscription = state.hub.subscribe()?;
    debug!(subscriber = %subscription.id(), "Event stream opened");

    let stream = subscription.map(encode_event);

    // Stop reverse proxies such as nginx from buffering the stream.
    let headers = [(
        HeaderName::from_static("x-accel-buffering"),
        HeaderValue::from_static("no"),
    )];

    Ok((headers, Sse::new(stream)))
}

/// Encode one hub event in its wire form.
///
/// A serialization failure ends the stream, which in turn drops the
/// subscriber.
pub fn encode_event(event: HubEvent) -> Result<Event, CoreError> {
    let encoded = match event {
        HubEvent::Snapshot(records) => {
            let devices: Vec<DeviceView> = records.iter().map(DeviceView::from).collect();
            Event::default().event(SNAPSHOT_EVENT).json_data(devices)
        }
        HubEvent::Update(record) => Event::default().event(UPDATE_EVENT).json_data(record.to_view()),
        HubEvent::Heartbeat => Ok(Event::default().comment(KEEP_ALIVE_COMMENT)),
    };

    encoded.map_err(|e| {
        warn!(error = %e, "Failed to encode stream event");
        CoreError::Transport {
            reason: format!("event encoding failed: {e}"),
        }
    })
}
