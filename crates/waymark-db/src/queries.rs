//! Common query patterns for the trigger cache.

use crate::error::Result;
use crate::store::Store;
use waymark_core::ActiveTrigger;

impl Store {
    /// Get all cached triggers belonging to one event.
    pub fn triggers_for_event(&self, event_id: &str) -> Result<Vec<ActiveTrigger>> {
        Ok(self
            .load_triggers()?
            .into_iter()
            .filter(|t| t.event_id == event_id)
            .collect())
    }

    /// Count cached triggers.
    pub fn count_triggers(&self) -> Result<usize> {
        Ok(self.load_triggers()?.len())
    }

    /// Check whether a raw row is present, readable or not.
    pub fn has_stored_set(&self) -> Result<bool> {
        Ok(self.load_row()?.is_some())
    }
}
