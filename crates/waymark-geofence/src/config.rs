//! RON configuration for geofence registration and entry handling

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Geofence lifecycle configuration
///
/// Every field has a default, so an empty RON struct `()` is a valid file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeofenceConfig {
    /// Key under which the app's regions are registered with the OS
    #[serde(default = "default_task_key")]
    pub task_key: String,
    /// Limit for each OS start/stop monitoring call, in milliseconds
    #[serde(default = "default_os_timeout")]
    pub os_timeout_ms: u64,
    /// Limit for event store reads, in milliseconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_ms: u64,
    /// Limit for presenting a notification, in milliseconds
    #[serde(default = "default_dispatch_timeout")]
    pub dispatch_timeout_ms: u64,
    /// Prepended to the event title in notifications
    #[serde(default = "default_title_prefix")]
    pub title_prefix: String,
    /// Notification body used when the event has no description
    #[serde(default = "default_fallback_body")]
    pub fallback_body: String,
}

fn default_task_key() -> String {
    "GEOFENCE_TASK".to_string()
}

fn default_os_timeout() -> u64 {
    5000
}

fn default_fetch_timeout() -> u64 {
    10000
}

fn default_dispatch_timeout() -> u64 {
    5000
}

fn default_title_prefix() -> String {
    "🔔 ".to_string()
}

fn default_fallback_body() -> String {
    "You've entered an event zone".to_string()
}

impl Default for GeofenceConfig {
    fn default() -> Self {
        Self {
            task_key: default_task_key(),
            os_timeout_ms: default_os_timeout(),
            fetch_timeout_ms: default_fetch_timeout(),
            dispatch_timeout_ms: default_dispatch_timeout(),
            title_prefix: default_title_prefix(),
            fallback_body: default_fallback_body(),
        }
    }
}

impl GeofenceConfig {
    /// Load configuration from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_ron_str(&content)
    }

    /// Parse configuration from a RON string
    pub fn from_ron_str(content: &str) -> Result<Self> {
        ron::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn os_timeout(&self) -> Duration {
        Duration::from_millis(self.os_timeout_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_millis(self.dispatch_timeout_ms)
    }
}
