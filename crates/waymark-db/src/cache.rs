//! Trigger cache contract.

use crate::error::Result;
use waymark_core::ActiveTrigger;

/// Durable store of the currently registered trigger set.
///
/// This is the only channel between the foreground process that derives and
/// registers triggers and the background process that handles region entries.
/// Implementations must survive process restarts and must never expose a
/// half-written set.
pub trait TriggerCache: Send + Sync {
    /// Replace the stored set. Last write wins.
    fn save(&self, triggers: &[ActiveTrigger]) -> Result<()>;

    /// Load the stored set.
    ///
    /// Returns an empty set when nothing was saved yet or when the stored
    /// payload cannot be decoded.
    fn load_all(&self) -> Result<Vec<ActiveTrigger>>;

    /// Look up one trigger by identifier.
    fn load_by_id(&self, identifier: &str) -> Result<Option<ActiveTrigger>>;

    /// Drop the stored set.
    fn clear(&self) -> Result<()>;
}
