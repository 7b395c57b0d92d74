//! Trigger identifiers
//!
//! A trigger has no id of its own; it is addressed by its owning event and its
//! position in that event's trigger list. The encoded form `{eventId}-{index}`
//! is the region key handed to the OS and the lookup key of the trigger cache.
//!
//! Decoding splits on the *last* separator. The index suffix is all digits, so
//! event ids that themselves contain `-` still round-trip.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between the event id and the trigger index
pub const SEPARATOR: char = '-';

/// Decoded trigger identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerKey {
    /// Id of the owning event
    pub event_id: String,
    /// Position of the trigger in the event's trigger list
    pub index: usize,
}

impl TriggerKey {
    /// Create a new trigger key
    pub fn new(event_id: impl Into<String>, index: usize) -> Self {
        Self {
            event_id: event_id.into(),
            index,
        }
    }

    /// Encode as `{eventId}-{index}`
    pub fn encode(&self) -> String {
        format!("{}{}{}", self.event_id, SEPARATOR, self.index)
    }

    /// Decode an identifier produced by [`TriggerKey::encode`]
    pub fn decode(identifier: &str) -> Result<Self> {
        let malformed = || Error::MalformedIdentifier(identifier.to_string());

        let (event_id, index) = identifier.rsplit_once(SEPARATOR).ok_or_else(malformed)?;
        if event_id.is_empty() || index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }
        let index = index.parse::<usize>().map_err(|_| malformed())?;

        Ok(Self::new(event_id, index))
    }
}

impl fmt::Display for TriggerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.event_id, SEPARATOR, self.index)
    }
}

impl FromStr for TriggerKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}
