//! Event records
//!
//! Events are owned by the remote event store. Field names follow the store's
//! camelCase document layout. Start and end times are optional on the wire so
//! that a half-filled record can still be read; such an event never produces
//! active triggers.

use crate::trigger::Trigger;
use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Geographic coordinate in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Read a timestamp, mapping an unreadable value to `None`
///
/// One bad date then excludes only its own event from derivation instead of
/// failing the whole collection.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Timestamp {
        Valid(DateTime<Utc>),
        Unreadable(IgnoredAny),
    }

    Ok(match Option::<Timestamp>::deserialize(deserializer)? {
        Some(Timestamp::Valid(time)) => Some(time),
        Some(Timestamp::Unreadable(_)) | None => None,
    })
}

/// A user event with a time window and geofence triggers
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Store-assigned id
    #[serde(default)]
    pub id: String,
    /// Owning user
    #[serde(default)]
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Coordinate,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// Triggers, addressed by position
    #[serde(default)]
    pub triggers: Vec<Trigger>,
}

impl Event {
    /// Create an event with a title and time window
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start_time: Some(start_time),
            end_time: Some(end_time),
            ..Default::default()
        }
    }

    /// Builder: set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder: append a trigger
    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    /// Check whether `now` falls inside `[start_time, end_time]`
    ///
    /// Returns false when either bound is missing.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => start <= now && now <= end,
            _ => false,
        }
    }

    /// Append a trigger with default settings and no location yet
    ///
    /// Returns the new trigger's index.
    pub fn add_trigger(&mut self) -> usize {
        self.triggers.push(Trigger::default());
        self.triggers.len() - 1
    }

    /// Remove the trigger at `index`
    ///
    /// Triggers after it shift down, so their identifiers change on the next
    /// derivation pass.
    pub fn remove_trigger(&mut self, index: usize) -> bool {
        if index < self.triggers.len() {
            self.triggers.remove(index);
            true
        } else {
            false
        }
    }

    /// Flip the sound flag of a trigger
    pub fn toggle_sound(&mut self, index: usize) -> bool {
        match self.triggers.get_mut(index) {
            Some(trigger) => {
                trigger.sound = !trigger.sound;
                true
            }
            None => false,
        }
    }

    /// Flip the vibrate flag of a trigger
    pub fn toggle_vibrate(&mut self, index: usize) -> bool {
        match self.triggers.get_mut(index) {
            Some(trigger) => {
                trigger.vibrate = !trigger.vibrate;
                true
            }
            None => false,
        }
    }

    /// Set the location and radius of a trigger
    ///
    /// A `None` radius keeps the current one.
    pub fn set_trigger_location(
        &mut self,
        index: usize,
        location: Coordinate,
        radius: Option<f64>,
    ) -> bool {
        match self.triggers.get_mut(index) {
            Some(trigger) => {
                trigger.location = Some(location);
                trigger.radius = radius.unwrap_or(trigger.radius);
                true
            }
            None => false,
        }
    }
}
