//! Trigger set model for database storage.

use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};
use waymark_core::ActiveTrigger;

/// Primary key of the single trigger set row.
pub const TRIGGER_SET_KEY: &str = "triggers";

/// Payload layout version. Rows written with another version are discarded.
pub const PAYLOAD_FORMAT: u32 = 1;

/// Stored active trigger set.
///
/// The whole set lives in one row so that a save replaces it atomically.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 1, version = 1)]
#[native_db]
pub struct StoredTriggerSet {
    /// Always "triggers" - single row.
    #[primary_key]
    pub id: String,
    /// Payload layout version.
    pub format: u32,
    /// JSON array of active triggers.
    pub payload: String,
}

impl StoredTriggerSet {
    /// Create from a trigger slice.
    pub fn from_triggers(triggers: &[ActiveTrigger]) -> serde_json::Result<Self> {
        Ok(Self {
            id: TRIGGER_SET_KEY.to_string(),
            format: PAYLOAD_FORMAT,
            payload: serde_json::to_string(triggers)?,
        })
    }

    /// Convert to active triggers.
    pub fn to_triggers(&self) -> crate::Result<Vec<ActiveTrigger>> {
        if self.format != PAYLOAD_FORMAT {
            return Err(crate::Error::Corrupt(format!(
                "unsupported payload format {} (expected {})",
                self.format, PAYLOAD_FORMAT
            )));
        }
        serde_json::from_str(&self.payload).map_err(|e| crate::Error::Corrupt(e.to_string()))
    }
}
