//! Shared type definitions for the Fixcast location relay.
//!
//! Types defined here are used by both the state-distribution core and the
//! HTTP server. The wire projection ([`DeviceView`]) flows downstream to
//! `TypeScript` via `ts-rs` for the map UI.
//!
//! # Modules
//!
//! - [`ids`] -- Device identifier newtype
//! - [`fix`] -- Validated, immutable location reading
//! - [`record`] -- Per-device record and its wire projection

pub mod fix;
pub mod ids;
pub mod record;

pub use fix::{Fix, FixError};
pub use ids::DeviceId;
pub use record::{DeviceRecord, DeviceView};
