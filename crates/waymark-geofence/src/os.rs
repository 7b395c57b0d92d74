//! OS geofencing facility
//!
//! The platform registers circular regions under a task key and later calls
//! back into the app when the device crosses one. Implement [`Geofencer`] over
//! the platform API; [`MemoryGeofencer`] keeps the registry in memory for the
//! simulator and tests.

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use waymark_core::ActiveTrigger;

/// A monitored circular region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    /// Trigger identifier, echoed back on transitions
    pub identifier: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Radius in meters
    pub radius: f64,
    pub notify_on_enter: bool,
    pub notify_on_exit: bool,
}

impl Region {
    /// Enter-only region for an active trigger
    pub fn for_trigger(trigger: &ActiveTrigger) -> Self {
        Self {
            identifier: trigger.identifier.clone(),
            latitude: trigger.latitude,
            longitude: trigger.longitude,
            radius: trigger.radius,
            notify_on_enter: true,
            notify_on_exit: false,
        }
    }
}

/// Platform region-monitoring API
#[async_trait]
pub trait Geofencer: Send + Sync {
    /// Start monitoring `regions` under `task_key`, replacing any previous set
    async fn start_monitoring(&self, task_key: &str, regions: Vec<Region>) -> Result<()>;

    /// Stop monitoring everything registered under `task_key`
    ///
    /// Platforms report an error when nothing was registered.
    async fn stop_monitoring(&self, task_key: &str) -> Result<()>;
}

/// A call received by [`MemoryGeofencer`]
#[derive(Debug, Clone, PartialEq)]
pub enum GeofenceCall {
    Start { task_key: String, regions: Vec<Region> },
    Stop { task_key: String },
}

#[derive(Debug, Default)]
struct Registry {
    task_key: Option<String>,
    regions: Vec<Region>,
    calls: Vec<GeofenceCall>,
    fail_start: Option<String>,
}

/// In-memory region registry that records every call
#[derive(Debug, Default)]
pub struct MemoryGeofencer {
    registry: Mutex<Registry>,
    latency: Option<Duration>,
}

impl MemoryGeofencer {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency`
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// Make every subsequent `start_monitoring` fail with `reason`
    pub fn fail_start(&self, reason: impl Into<String>) {
        self.registry().fail_start = Some(reason.into());
    }

    /// Currently monitored regions
    pub fn regions(&self) -> Vec<Region> {
        self.registry().regions.clone()
    }

    /// Every call received, in order
    pub fn calls(&self) -> Vec<GeofenceCall> {
        self.registry().calls.clone()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn wait(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl Geofencer for MemoryGeofencer {
    async fn start_monitoring(&self, task_key: &str, regions: Vec<Region>) -> Result<()> {
        self.wait().await;
        let mut registry = self.registry();
        registry.calls.push(GeofenceCall::Start {
            task_key: task_key.to_string(),
            regions: regions.clone(),
        });
        if let Some(reason) = &registry.fail_start {
            return Err(Error::Registration(reason.clone()));
        }
        registry.task_key = Some(task_key.to_string());
        registry.regions = regions;
        Ok(())
    }

    async fn stop_monitoring(&self, task_key: &str) -> Result<()> {
        self.wait().await;
        let mut registry = self.registry();
        registry.calls.push(GeofenceCall::Stop {
            task_key: task_key.to_string(),
        });
        if registry.task_key.as_deref() != Some(task_key) {
            return Err(Error::Registration(format!(
                "task {task_key:?} is not registered"
            )));
        }
        registry.task_key = None;
        registry.regions.clear();
        Ok(())
    }
}
