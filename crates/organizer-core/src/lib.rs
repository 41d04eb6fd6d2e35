//! organizer-core library.
//!
//! # Conventions
//!
//! - **Errors**: `anyhow::Result` at store and service boundaries, `thiserror`
//!   enums for domain failures callers may want to match on.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`).
//! - **Time**: timestamps are stored as `DateTime<Utc>`; wall-clock math
//!   (09:00 reminders, day/month rollover) happens in the zone supplied by a
//!   [`clock::Clock`].

#![forbid(unsafe_code)]

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod ids;
pub mod model;
pub mod notify;
pub mod organizer;
pub mod recurrence;
pub mod state;
pub mod view;

pub use organizer::{Completion, Organizer};
