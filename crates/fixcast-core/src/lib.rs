//! Real-time state-distribution core for the Fixcast location relay.
//!
//! - [`store`] -- the authoritative device id -> latest fix map
//! - [`hub`] -- subscriber registry, snapshot-on-join, update fan-out and
//!   heartbeat
//! - [`ingest`] -- candidate validation, device id resolution, apply
//! - [`config`] -- typed YAML configuration with environment overrides
//! - [`error`] -- the core error taxonomy
//!
//! # Architecture
//!
//! A single [`Hub`] owns the [`DeviceStore`]. Ingestion goes through
//! [`Hub::apply`], which writes the store and queues an update on every
//! subscriber's bounded channel without waiting. Each observer drains its
//! own [`Subscription`] on its own task; a subscriber that cannot keep up
//! is dropped rather than allowed to slow anyone else down.

pub mod config;
pub mod error;
pub mod hub;
pub mod ingest;
pub mod store;

pub use config::{ConfigError, FixcastConfig, HubConfig, LogFormat, LoggingConfig, ServerConfig};
pub use error::CoreError;
pub use hub::{Hub, HubEvent, SubscriberId, Subscription};
pub use ingest::{FixCandidate, Origin, ingest};
pub use store::DeviceStore;
