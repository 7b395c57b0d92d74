//! Event store gateway
//!
//! The remote document store that owns event records. The geofence lifecycle
//! only reads through it (`fetch_events`, `fetch_event_by_id`); the write side
//! is part of the contract so one implementation can back the whole app.

use crate::error::{Error, Result};
use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use waymark_core::Event;

/// Remote event store
#[async_trait]
pub trait EventStore: Send + Sync {
    /// All events of a user, ordered by start time ascending
    async fn fetch_events(&self, user_id: &str) -> Result<Vec<Event>>;

    /// One event by id
    async fn fetch_event_by_id(&self, id: &str) -> Result<Option<Event>>;

    /// Create an event; the store assigns and returns its id
    ///
    /// Any id already set on `event` is ignored.
    async fn save_event(&self, event: Event) -> Result<String>;

    /// Replace an existing event
    async fn update_event(&self, id: &str, event: Event) -> Result<()>;

    /// Delete an event
    async fn delete_event(&self, id: &str) -> Result<()>;
}

#[derive(Debug, Default)]
struct Documents {
    events: IndexMap<String, Event>,
    next_id: u64,
}

/// Event store kept in process memory
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    docs: RwLock<Documents>,
}

impl MemoryEventStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events
    pub async fn len(&self) -> usize {
        self.docs.read().await.events.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.events.is_empty()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn fetch_events(&self, user_id: &str) -> Result<Vec<Event>> {
        let docs = self.docs.read().await;
        let mut events: Vec<Event> = docs
            .events
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        // Undated events sort last
        events.sort_by_key(|e| (e.start_time.is_none(), e.start_time));
        Ok(events)
    }

    async fn fetch_event_by_id(&self, id: &str) -> Result<Option<Event>> {
        Ok(self.docs.read().await.events.get(id).cloned())
    }

    async fn save_event(&self, mut event: Event) -> Result<String> {
        let mut docs = self.docs.write().await;
        docs.next_id += 1;
        let id = format!("ev{}", docs.next_id);
        event.id = id.clone();
        docs.events.insert(id.clone(), event);
        Ok(id)
    }

    async fn update_event(&self, id: &str, mut event: Event) -> Result<()> {
        let mut docs = self.docs.write().await;
        let slot = docs
            .events
            .get_mut(id)
            .ok_or_else(|| Error::EventNotFound(id.to_string()))?;
        event.id = id.to_string();
        *slot = event;
        Ok(())
    }

    async fn delete_event(&self, id: &str) -> Result<()> {
        self.docs
            .write()
            .await
            .events
            .shift_remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::EventNotFound(id.to_string()))
    }
}
