//! Authoritative mapping from device id to its latest fix.
//!
//! [`DeviceStore`] is the single source of truth for device state. Every
//! read and write goes through one short-held mutex; callers always get
//! owned copies back, so no lock is held while a snapshot is iterated or
//! serialized.
//!
//! Records are never evicted. The store grows by one entry per distinct
//! device id for the life of the process.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use fixcast_types::{DeviceId, DeviceRecord, Fix};

use crate::error::CoreError;

/// Concurrent-safe device id -> [`DeviceRecord`] map.
#[derive(Debug, Default)]
pub struct DeviceStore {
    records: Mutex<BTreeMap<DeviceId, DeviceRecord>>,
}

impl DeviceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace the record for `device_id` and return the new
    /// record.
    ///
    /// The last call wins. Fix timestamps play no part in ordering.
    pub fn upsert(&self, device_id: DeviceId, fix: Fix) -> Result<DeviceRecord, CoreError> {
        let record = DeviceRecord::new(device_id, fix);
        let mut records = self.lock()?;
        records.insert(record.device_id.clone(), record.clone());
        Ok(record)
    }

    /// Point-in-time copy of every record, ordered by device id.
    pub fn snapshot(&self) -> Result<Vec<DeviceRecord>, CoreError> {
        let records = self.lock()?;
        Ok(records.values().cloned().collect())
    }

    /// Copy of the record for `device_id`.
    ///
    /// Returns [`CoreError::NotFound`] if the device has never reported.
    pub fn get(&self, device_id: &str) -> Result<DeviceRecord, CoreError> {
        let records = self.lock()?;
        records
            .get(device_id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                device_id: device_id.to_owned(),
            })
    }

    /// Number of distinct devices that have ever reported.
    pub fn len(&self) -> Result<usize, CoreError> {
        Ok(self.lock()?.len())
    }

    /// Whether no device has reported yet.
    pub fn is_empty(&self) -> Result<bool, CoreError> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<DeviceId, DeviceRecord>>, CoreError> {
        self.records.lock().map_err(|e| CoreError::Internal {
            message: format!("device store lock poisoned: {e}"),
        })
    }
}
