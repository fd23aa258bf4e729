//! Per-device record and its JSON wire projection.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::fix::Fix;
use crate::ids::DeviceId;

/// The latest accepted fix for one device.
///
/// Records are replaced wholesale on every accepted ingestion for the
/// same device; they are never patched field by field.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRecord {
    /// The device this record belongs to.
    pub device_id: DeviceId,
    /// The most recently accepted reading.
    pub fix: Fix,
}

impl DeviceRecord {
    /// Pair a device id with its latest fix.
    pub const fn new(device_id: DeviceId, fix: Fix) -> Self {
        Self { device_id, fix }
    }

    /// Project the record into its wire shape.
    pub fn to_view(&self) -> DeviceView {
        DeviceView::from(self)
    }
}

/// Flat JSON shape of a device record, as sent on the event stream and
/// returned by the debug endpoints.
///
/// Unknown satellite count or HDOP serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DeviceView {
    /// Device identifier.
    pub id: String,
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
    /// Satellites in view, or `null` when unknown.
    pub sats: Option<u32>,
    /// Horizontal dilution of precision, or `null` when unknown.
    pub hdop: Option<f64>,
    /// Server receipt time, milliseconds since the Unix epoch.
    #[ts(type = "number")]
    pub ts: i64,
}

impl From<&DeviceRecord> for DeviceView {
    fn from(record: &DeviceRecord) -> Self {
        let fix = &record.fix;
        Self {
            id: record.device_id.as_str().to_owned(),
            lat: fix.latitude(),
            lon: fix.longitude(),
            sats: fix.satellite_count(),
            hdop: fix.horizontal_dilution(),
            ts: fix.observed_at().timestamp_millis(),
        }
    }
}
