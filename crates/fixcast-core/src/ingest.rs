//! Ingestion path: validate a candidate fix, resolve which device sent
//! it, and apply it through the hub.
//!
//! Candidates arrive as loosely typed JSON because reporting hardware is
//! sloppy about types. Coordinates must be finite JSON numbers or the
//! whole reading is rejected. Satellite count and HDOP are best-effort:
//! anything unusable is stored as unknown rather than failing the
//! request.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use fixcast_types::{DeviceId, DeviceRecord, Fix};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::hub::Hub;

/// Raw ingestion body, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixCandidate {
    /// Caller-supplied device id. Used only if it is a non-empty string.
    #[serde(default)]
    pub id: Option<Value>,
    /// Latitude in decimal degrees.
    #[serde(default)]
    pub lat: Option<Value>,
    /// Longitude in decimal degrees.
    #[serde(default)]
    pub lon: Option<Value>,
    /// Satellites in view.
    #[serde(default)]
    pub sats: Option<Value>,
    /// Horizontal dilution of precision.
    #[serde(default)]
    pub hdop: Option<Value>,
}

/// Where an ingestion request came from, for device id fallback.
#[derive(Debug, Clone, Default)]
pub struct Origin {
    /// Value of the `X-Device-Id` request header, if present.
    pub device_header: Option<String>,
    /// Network address of the caller, if known.
    pub remote_addr: Option<IpAddr>,
}

/// Pick the device id for a reading.
///
/// In order: the body id if it is a non-empty string, the device header
/// if non-empty, the caller's address, and finally `"unknown"`.
pub fn resolve_device_id(body_id: Option<&Value>, origin: &Origin) -> DeviceId {
    body_id
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(DeviceId::from)
        .or_else(|| {
            origin
                .device_header
                .as_deref()
                .filter(|id| !id.is_empty())
                .map(DeviceId::from)
        })
        .or_else(|| origin.remote_addr.map(|addr| DeviceId::new(addr.to_string())))
        .unwrap_or_else(DeviceId::unknown)
}

/// Turn a candidate into a [`Fix`] stamped with `observed_at`.
///
/// Fails with [`CoreError::InvalidFix`] unless both coordinates are
/// finite numbers.
pub fn validate(candidate: &FixCandidate, observed_at: DateTime<Utc>) -> Result<Fix, CoreError> {
    let (Some(lat), Some(lon)) = (
        finite_number(candidate.lat.as_ref()),
        finite_number(candidate.lon.as_ref()),
    ) else {
        return Err(CoreError::invalid("lat/lon must be numeric"));
    };

    Ok(Fix::new(lat, lon, observed_at)?
        .with_satellite_count(satellite_count(candidate.sats.as_ref()))
        .with_horizontal_dilution(finite_number(candidate.hdop.as_ref())))
}

/// Validate `candidate`, store it and broadcast it.
///
/// The fix is stamped with the server's receipt time. Returns as soon as
/// the update is queued for subscribers; delivery is not awaited.
pub fn ingest(
    hub: &Hub,
    origin: &Origin,
    candidate: &FixCandidate,
) -> Result<DeviceRecord, CoreError> {
    let device_id = resolve_device_id(candidate.id.as_ref(), origin);

    let fix = match validate(candidate, Utc::now()) {
        Ok(fix) => fix,
        Err(e) => {
            warn!(device = %device_id, error = %e, "Rejected fix");
            return Err(e);
        }
    };

    let record = hub.apply(device_id, fix)?;
    debug!(
        device = %record.device_id,
        lat = record.fix.latitude(),
        lon = record.fix.longitude(),
        "Fix accepted"
    );
    Ok(record)
}

fn finite_number(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|n| n.is_finite())
}

fn satellite_count(value: Option<&Value>) -> Option<u32> {
    let value = value?;
    if let Some(count) = value.as_u64() {
        return u32::try_from(count).ok();
    }
    // Whole-valued floats such as `5.0` still count.
    let count = value
        .as_f64()
        .filter(|n| n.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(n))?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = count as u32;
    Some(count)
}
