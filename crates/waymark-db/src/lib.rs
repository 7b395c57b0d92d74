//! Waymark DB - Durable trigger cache using native_db
//!
//! Holds the active trigger set written by the foreground sync and read by
//! the background region-entry handler:
//! - One row holding the whole set as a JSON array, replaced on every save
//! - Corrupt or outdated rows read as an empty set
//! - Lookups by trigger identifier
//! - The file is opened per operation, so foreground and background handles
//!   can be alive at the same time

mod cache;
mod error;
mod models;
mod queries;
mod store;

pub use cache::TriggerCache;
pub use error::{Error, Result};
pub use models::{StoredTriggerSet, PAYLOAD_FORMAT, TRIGGER_SET_KEY};
pub use store::{Store, DEFAULT_LOCK_WAIT};
