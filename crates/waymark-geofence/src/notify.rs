//! Local notification dispatch
//!
//! Presentation is best-effort: a successful `present` says the request was
//! accepted, not that the user saw anything.

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};

/// Extra data attached to a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    /// Event the notification is about
    pub event_id: String,
}

/// A local notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Play the default sound
    pub sound: bool,
    pub vibrate: bool,
    pub data: NotificationData,
}

/// Channel importance (Android channel semantics)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Importance {
    Low,
    Normal,
    #[default]
    High,
}

/// Notification channel the app posts to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationChannel {
    pub id: String,
    pub name: String,
    pub importance: Importance,
    pub sound: bool,
    pub vibrate: bool,
}

impl Default for NotificationChannel {
    /// High-importance channel with sound and vibration
    fn default() -> Self {
        Self {
            id: "default".to_string(),
            name: "Default".to_string(),
            importance: Importance::High,
            sound: true,
            vibrate: true,
        }
    }
}

/// Platform notification API
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Create or update a channel; called once at app start
    async fn ensure_channel(&self, channel: &NotificationChannel) -> Result<()>;

    /// Present a notification immediately
    async fn present(&self, notification: Notification) -> Result<()>;
}

#[derive(Debug, Default)]
struct Tray {
    channels: Vec<NotificationChannel>,
    presented: Vec<Notification>,
    failure: Option<String>,
}

/// Notifier that keeps presented notifications in memory
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    tray: Mutex<Tray>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `present` fail with `reason`
    pub fn fail_with(&self, reason: impl Into<String>) {
        self.tray().failure = Some(reason.into());
    }

    /// Notifications presented so far
    pub fn presented(&self) -> Vec<Notification> {
        self.tray().presented.clone()
    }

    /// Channels created so far
    pub fn channels(&self) -> Vec<NotificationChannel> {
        self.tray().channels.clone()
    }

    fn tray(&self) -> MutexGuard<'_, Tray> {
        self.tray.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn ensure_channel(&self, channel: &NotificationChannel) -> Result<()> {
        let mut tray = self.tray();
        tray.channels.retain(|c| c.id != channel.id);
        tray.channels.push(channel.clone());
        Ok(())
    }

    async fn present(&self, notification: Notification) -> Result<()> {
        let mut tray = self.tray();
        if let Some(reason) = &tray.failure {
            return Err(Error::Dispatch(reason.clone()));
        }
        tray.presented.push(notification);
        Ok(())
    }
}
