//! Device identifier newtype.
//!
//! Device ids are free-form strings chosen by the reporting hardware (or
//! derived from its network address when the hardware cannot be
//! configured). Wrapping them keeps device ids from being mixed up with
//! other strings at compile time.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Placeholder id used when no other identity can be resolved.
pub const UNKNOWN_DEVICE: &str = "unknown";

/// Identifier of one reporting device.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct DeviceId(String);

impl DeviceId {
    /// Wrap a raw device identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The placeholder id for callers with no resolvable identity.
    pub fn unknown() -> Self {
        Self(String::from(UNKNOWN_DEVICE))
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the inner [`String`].
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl Borrow<str> for DeviceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn lookup_by_str_in_ordered_map() {
        let mut map = BTreeMap::new();
        map.insert(DeviceId::from("A05A9C8481B0"), 1);
        assert_eq!(map.get("A05A9C8481B0"), Some(&1));
        assert_eq!(map.get("missing"), None);
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&DeviceId::from("D1")).ok();
        assert_eq!(json.as_deref(), Some("\"D1\""));
    }

    #[test]
    fn unknown_placeholder() {
        assert_eq!(DeviceId::unknown().as_str(), "unknown");
    }
}
