//! Waymark Core - Event model and active-trigger derivation
//!
//! This crate provides the pure, storage-free half of the geofence lifecycle:
//! - Event and trigger records as they live in the remote event store
//! - Trigger identifiers (`{eventId}-{index}`) that join OS regions, cache
//!   entries and events
//! - Derivation of the currently active trigger set from an event collection
//!
//! Nothing here performs I/O. Persistence lives in `waymark-db`, and the OS,
//! gateway and notification boundaries live in `waymark-geofence`.

mod derive;
mod error;
mod event;
mod identifier;
mod trigger;

pub use derive::derive_active;
pub use error::{Error, Result};
pub use event::{Coordinate, Event};
pub use identifier::{TriggerKey, SEPARATOR};
pub use trigger::{ActiveTrigger, Trigger, DEFAULT_RADIUS_METERS};
