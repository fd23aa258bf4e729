//! HTTP server for the Fixcast location relay.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Ingestion endpoint** (`POST /ingest`) for reporting devices
//! - **Server-Sent Events endpoint** (`GET /events`) streaming a snapshot
//!   on connect, then live updates and keep-alives
//! - **Debug REST endpoints** (`/devices`, `/device/{id}`, `/api/status`)
//! - **Static map UI** with SPA fallback, when a directory is configured
//!
//! # Architecture
//!
//! Every handler reaches device state through the single
//! [`Hub`](fixcast_core::Hub) held in [`AppState`]. Each `/events`
//! connection drains its own bounded subscription, so a stalled observer
//! is dropped by the hub instead of slowing down ingestion or other
//! observers.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod sse;
pub mod startup;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, bind, serve};
pub use startup::{StartupError, spawn_server};
pub use state::AppState;
