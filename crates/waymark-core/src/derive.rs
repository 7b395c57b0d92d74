//! Active-trigger derivation
//!
//! Turns an event collection into the flat list of triggers that should be
//! registered with the OS at a given instant. The pass is pure and total:
//! events that cannot qualify (missing bounds, no located triggers) simply
//! contribute nothing.

use crate::event::Event;
use crate::trigger::ActiveTrigger;
use chrono::{DateTime, Utc};

/// Derive the active trigger set at `now`
///
/// A trigger is kept iff it has a location and `now` lies in its event's
/// inclusive `[start_time, end_time]` window. Output is ordered by event, then
/// by trigger index.
pub fn derive_active(events: &[Event], now: DateTime<Utc>) -> Vec<ActiveTrigger> {
    events
        .iter()
        .filter(|event| event.is_active_at(now))
        .flat_map(|event| {
            event
                .triggers
                .iter()
                .enumerate()
                .filter_map(move |(index, trigger)| ActiveTrigger::new(event, index, trigger))
        })
        .collect()
}
