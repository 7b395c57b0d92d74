//! Region-entry handler
//!
//! Runs in the background context the OS starts when the device crosses a
//! monitored region. It shares no memory with the foreground process: the
//! trigger comes from the durable cache and the event from the remote store.
//!
//! Every failure ends the invocation quietly with an [`EntryOutcome`]; nothing
//! here may take down the host process.

use crate::config::GeofenceConfig;
use crate::deadline::bounded;
use crate::error::Error;
use crate::gateway::EventStore;
use crate::notify::{Notification, NotificationData, Notifier};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use waymark_core::{ActiveTrigger, Event};
use waymark_db::TriggerCache;

/// Kind of region transition reported by the OS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    Enter,
    Exit,
    /// The OS could not monitor the region
    Error,
    #[serde(other)]
    Unknown,
}

/// Region descriptor in a transition payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRef {
    pub identifier: String,
}

/// Transition payload delivered by the OS
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionEvent {
    pub event_type: TransitionKind,
    pub region: RegionRef,
    /// Set when the OS reports a failure instead of a transition
    #[serde(default)]
    pub error: Option<String>,
}

impl RegionEvent {
    /// Entry into the region with `identifier`
    pub fn enter(identifier: impl Into<String>) -> Self {
        Self::new(TransitionKind::Enter, identifier)
    }

    /// Exit from the region with `identifier`
    pub fn exit(identifier: impl Into<String>) -> Self {
        Self::new(TransitionKind::Exit, identifier)
    }

    fn new(event_type: TransitionKind, identifier: impl Into<String>) -> Self {
        Self {
            event_type,
            region: RegionRef {
                identifier: identifier.into(),
            },
            error: None,
        }
    }
}

/// How a handler invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// The OS reported an error or sent an unreadable payload
    Errored,
    /// Not an enter transition
    Ignored,
    /// No cached trigger, or the trigger is inactive
    NoActiveTrigger,
    /// The owning event is gone or could not be fetched
    EventUnavailable,
    /// Presenting the notification failed
    DispatchFailed,
    /// A notification was presented
    Notified(Notification),
}

/// Background handler for region transitions
pub struct RegionEntryHandler {
    cache: Arc<dyn TriggerCache>,
    events: Arc<dyn EventStore>,
    notifier: Arc<dyn Notifier>,
    config: GeofenceConfig,
}

impl RegionEntryHandler {
    /// Create a handler over its own cache, event store and notifier
    pub fn new(
        cache: Arc<dyn TriggerCache>,
        events: Arc<dyn EventStore>,
        notifier: Arc<dyn Notifier>,
        config: GeofenceConfig,
    ) -> Self {
        Self {
            cache,
            events,
            notifier,
            config,
        }
    }

    /// Handle a serialized OS payload
    pub async fn handle_json(&self, payload: &str) -> EntryOutcome {
        match serde_json::from_str::<RegionEvent>(payload) {
            Ok(event) => self.handle(event).await,
            Err(e) => {
                error!(error = %e, "unreadable geofence payload");
                EntryOutcome::Errored
            }
        }
    }

    /// Handle a region transition
    pub async fn handle(&self, event: RegionEvent) -> EntryOutcome {
        if event.error.is_some() || event.event_type == TransitionKind::Error {
            let reason = event.error.as_deref().unwrap_or("unspecified");
            error!(
                error = %reason,
                identifier = %event.region.identifier,
                "geofence task reported an error"
            );
            return EntryOutcome::Errored;
        }
        if event.event_type != TransitionKind::Enter {
            debug!(kind = ?event.event_type, "ignoring non-enter transition");
            return EntryOutcome::Ignored;
        }

        let identifier = event.region.identifier.as_str();
        let Some(trigger) = self.active_trigger(identifier) else {
            debug!(identifier, "no active trigger for region");
            return EntryOutcome::NoActiveTrigger;
        };

        let Some(owner) = self.owning_event(&trigger).await else {
            return EntryOutcome::EventUnavailable;
        };

        let notification = self.build_notification(&owner, &trigger);
        let present = self.notifier.present(notification.clone());
        match bounded("present", self.config.dispatch_timeout(), present).await {
            Ok(()) => {
                info!(identifier, event_id = %owner.id, "presented geofence notification");
                EntryOutcome::Notified(notification)
            }
            Err(e) => {
                error!(identifier, error = %e, "failed to present notification");
                EntryOutcome::DispatchFailed
            }
        }
    }

    fn active_trigger(&self, identifier: &str) -> Option<ActiveTrigger> {
        match self.cache.load_by_id(identifier) {
            Ok(trigger) => trigger.filter(|t| t.active),
            Err(e) => {
                warn!(identifier, error = %e, "trigger cache lookup failed");
                None
            }
        }
    }

    async fn owning_event(&self, trigger: &ActiveTrigger) -> Option<Event> {
        let event_id = trigger.event_id.as_str();
        let fetch = self.events.fetch_event_by_id(event_id);
        let fetched = bounded("fetch_event_by_id", self.config.fetch_timeout(), fetch)
            .await
            .and_then(|event| event.ok_or_else(|| Error::EventNotFound(event_id.to_string())));

        match fetched {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(event_id, error = %e, "event unavailable for triggered region");
                None
            }
        }
    }

    fn build_notification(&self, event: &Event, trigger: &ActiveTrigger) -> Notification {
        let body = if event.description.trim().is_empty() {
            self.config.fallback_body.clone()
        } else {
            event.description.clone()
        };
        Notification {
            title: format!("{}{}", self.config.title_prefix, event.title),
            body,
            sound: trigger.sound,
            vibrate: trigger.vibrate,
            data: NotificationData {
                event_id: event.id.clone(),
            },
        }
    }
}
