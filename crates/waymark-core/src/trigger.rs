//! Trigger records
//!
//! - `Trigger` - a geofence embedded in an event, as the user configured it
//! - `ActiveTrigger` - a flattened trigger eligible for OS registration right
//!   now; this is the record persisted in the trigger cache

use crate::event::{Coordinate, Event};
use crate::identifier::TriggerKey;
use serde::{Deserialize, Serialize};

/// Radius given to newly added triggers, in meters
pub const DEFAULT_RADIUS_METERS: f64 = 100.0;

/// A geofence embedded in an event
///
/// A trigger without a location is still being edited and is never
/// registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub location: Option<Coordinate>,
    /// Radius in meters, passed through unvalidated
    pub radius: f64,
    pub sound: bool,
    pub vibrate: bool,
}

impl Trigger {
    /// Create a located trigger with sound and vibration enabled
    pub fn at(location: Coordinate, radius: f64) -> Self {
        Self {
            location: Some(location),
            radius,
            ..Default::default()
        }
    }
}

impl Default for Trigger {
    fn default() -> Self {
        Self {
            location: None,
            radius: DEFAULT_RADIUS_METERS,
            sound: true,
            vibrate: true,
        }
    }
}

/// A trigger that is located and inside its event's time window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTrigger {
    /// `{eventId}-{index}`, see [`TriggerKey`]
    pub identifier: String,
    pub event_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
    pub sound: bool,
    pub vibrate: bool,
    pub active: bool,
}

impl ActiveTrigger {
    /// Flatten the trigger at `index` of `event`
    ///
    /// Returns `None` for a trigger without a location. The event's time
    /// window is not checked here.
    pub fn new(event: &Event, index: usize, trigger: &Trigger) -> Option<Self> {
        let location = trigger.location?;
        Some(Self {
            identifier: TriggerKey::new(event.id.as_str(), index).encode(),
            event_id: event.id.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
            radius: trigger.radius,
            sound: trigger.sound,
            vibrate: trigger.vibrate,
            active: true,
        })
    }

    /// Get the trigger's center
    pub fn center(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}
