//! Foreground sync session
//!
//! Re-derives the active trigger set whenever the user's event collection
//! changes (initial load, explicit reload, screen focus, live subscription)
//! and hands it to the [`Registrar`].

use crate::deadline::bounded;
use crate::gateway::EventStore;
use crate::registrar::{ReconcileReport, Registrar};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};
use waymark_core::{derive_active, Event};

/// Foreground driver of the geofence lifecycle for one signed-in user
pub struct Session {
    events: Arc<dyn EventStore>,
    registrar: Arc<Registrar>,
    user_id: String,
}

impl Session {
    /// Create a session for `user_id`
    pub fn new(
        events: Arc<dyn EventStore>,
        registrar: Arc<Registrar>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            events,
            registrar,
            user_id: user_id.into(),
        }
    }

    /// Get the user id
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Reload events and reconcile as of now
    pub async fn sync(&self) -> Option<ReconcileReport> {
        self.sync_at(Utc::now()).await
    }

    /// Reload events and reconcile as of `now`
    ///
    /// Returns `None` when the events could not be loaded. The previous
    /// registration is left in place in that case, since an empty collection
    /// caused by a network error would otherwise unregister every geofence.
    pub async fn sync_at(&self, now: DateTime<Utc>) -> Option<ReconcileReport> {
        let timeout = self.registrar.config().fetch_timeout();
        let fetch = self.events.fetch_events(&self.user_id);
        match bounded("fetch_events", timeout, fetch).await {
            Ok(events) => Some(self.events_changed(&events, now).await),
            Err(e) => {
                warn!(
                    user_id = %self.user_id,
                    error = %e,
                    "failed to load events, keeping current geofences"
                );
                None
            }
        }
    }

    /// Reconcile a collection pushed by a live subscription
    pub async fn events_changed(&self, events: &[Event], now: DateTime<Utc>) -> ReconcileReport {
        let active = derive_active(events, now);
        debug!(
            events = events.len(),
            active = active.len(),
            "derived active triggers"
        );
        self.registrar.reconcile(active).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeofenceConfig;
    use crate::error::{Error, Result};
    use crate::gateway::MemoryEventStore;
    use crate::os::MemoryGeofencer;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use waymark_core::{Coordinate, Trigger};
    use waymark_db::{Store, TriggerCache};

    struct OfflineStore;

    #[async_trait]
    impl EventStore for OfflineStore {
        async fn fetch_events(&self, _: &str) -> Result<Vec<Event>> {
            Err(Error::EventFetch("network unreachable".to_string()))
        }

        async fn fetch_event_by_id(&self, _: &str) -> Result<Option<Event>> {
            Err(Error::EventFetch("network unreachable".to_string()))
        }

        async fn save_event(&self, _: Event) -> Result<String> {
            Err(Error::EventFetch("network unreachable".to_string()))
        }

        async fn update_event(&self, _: &str, _: Event) -> Result<()> {
            Err(Error::EventFetch("network unreachable".to_string()))
        }

        async fn delete_event(&self, _: &str) -> Result<()> {
            Err(Error::EventFetch("network unreachable".to_string()))
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap()
    }

    fn event(user_id: &str, title: &str) -> Event {
        let mut event = Event::new("", title, t0(), t0() + Duration::hours(2))
            .with_trigger(Trigger::at(Coordinate::new(38.7, -9.1), 150.0))
            .with_trigger(Trigger::default());
        event.user_id = user_id.to_string();
        event
    }

    fn registrar(cache: Arc<Store>, os: Arc<MemoryGeofencer>) -> Arc<Registrar> {
        Arc::new(Registrar::new(cache, os, GeofenceConfig::default()))
    }

    #[tokio::test]
    async fn test_sync_registers_active_triggers() {
        let events = Arc::new(MemoryEventStore::new());
        let mine = events.save_event(event("u1", "Concert")).await.unwrap();
        events.save_event(event("u2", "Not mine")).await.unwrap();

        let cache = Arc::new(Store::in_memory().unwrap());
        let os = Arc::new(MemoryGeofencer::new());
        let session = Session::new(events, registrar(cache.clone(), os.clone()), "u1");

        let report = session.sync_at(t0() + Duration::minutes(30)).await.unwrap();
        assert_eq!(report.registered, 1);

        let cached = cache.load_all().unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].identifier, format!("{mine}-0"));
        assert_eq!(os.regions()[0].radius, 150.0);
    }

    #[tokio::test]
    async fn test_sync_after_window_clears_registration() {
        let events = Arc::new(MemoryEventStore::new());
        events.save_event(event("u1", "Concert")).await.unwrap();

        let cache = Arc::new(Store::in_memory().unwrap());
        let os = Arc::new(MemoryGeofencer::new());
        let session = Session::new(events, registrar(cache.clone(), os.clone()), "u1");

        session.sync_at(t0()).await.unwrap();
        assert_eq!(os.regions().len(), 1);

        let report = session.sync_at(t0() + Duration::hours(3)).await.unwrap();
        assert!(report.unregistered);
        assert_eq!(report.registered, 0);
        assert!(os.regions().is_empty());
        assert!(cache.load_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_registration() {
        let cache = Arc::new(Store::in_memory().unwrap());
        let os = Arc::new(MemoryGeofencer::new());
        let registrar = registrar(cache.clone(), os.clone());

        let online = Session::new(Arc::new(MemoryEventStore::new()), registrar.clone(), "u1");
        let mut seeded = event("u1", "Concert");
        seeded.id = "ev1".to_string();
        online.events_changed(&[seeded], t0()).await;
        assert_eq!(os.regions().len(), 1);

        let offline = Session::new(Arc::new(OfflineStore), registrar, "u1");
        assert!(offline.sync_at(t0()).await.is_none());
        assert_eq!(os.regions().len(), 1);
        assert_eq!(cache.load_all().unwrap().len(), 1);
    }
}
