//! Waymark Geofence - OS registration and region-entry handling
//!
//! This crate connects derived triggers to the outside world:
//!
//! - **Registrar**: caches the active set, then swaps the OS region registry
//! - **Session**: foreground driver that reloads events and reconciles
//! - **RegionEntryHandler**: background callback that turns a region entry
//!   into a notification
//! - **Boundaries**: [`EventStore`], [`Geofencer`] and [`Notifier`] traits,
//!   each with an in-memory implementation
//!
//! # Architecture
//!
//! ```text
//! foreground                                    background
//! ┌─────────┐  derive  ┌───────────┐  save   ┌──────────────┐  load_by_id  ┌──────────────┐
//! │ Session │────────▶│ Registrar │───────▶│ TriggerCache │◀────────────│ EntryHandler │
//! └─────────┘          └───────────┘         └──────────────┘              └──────────────┘
//!      │                     │ stop/start                                    │        │
//!      ▼                     ▼                                               ▼        ▼
//! ┌────────────┐       ┌───────────┐                              ┌────────────┐ ┌──────────┐
//! │ EventStore │       │ Geofencer │ ─ ─ ─ ─ ─ region entry ─ ─ ▶ │ EventStore │ │ Notifier │
//! └────────────┘       └───────────┘                              └────────────┘ └──────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use waymark_db::Store;
//! use waymark_geofence::*;
//!
//! let config = GeofenceConfig::load("geofence.ron")?;
//!
//! // Foreground
//! let registrar = Arc::new(Registrar::new(
//!     Arc::new(Store::open("triggers.db")?),
//!     Arc::new(platform_geofencer),
//!     config.clone(),
//! ));
//! let session = Session::new(event_store.clone(), registrar, user_id);
//! session.sync().await;
//!
//! // Background, on region entry
//! let handler = RegionEntryHandler::new(
//!     Arc::new(Store::open("triggers.db")?),
//!     event_store,
//!     Arc::new(platform_notifier),
//!     config,
//! );
//! handler.handle_json(payload).await;
//! ```

mod config;
mod deadline;
mod entry;
mod error;
mod gateway;
mod notify;
mod os;
mod registrar;
mod session;

pub use config::GeofenceConfig;
pub use entry::{EntryOutcome, RegionEntryHandler, RegionEvent, RegionRef, TransitionKind};
pub use error::{Error, Result};
pub use gateway::{EventStore, MemoryEventStore};
pub use notify::{
    Importance, MemoryNotifier, Notification, NotificationChannel, NotificationData, Notifier,
};
pub use os::{GeofenceCall, Geofencer, MemoryGeofencer, Region};
pub use registrar::{ReconcileReport, Registrar};
pub use session::Session;
