//! Geofence registrar
//!
//! Brings the OS region registry in line with a freshly derived trigger set.
//! The pipeline is strictly ordered and every step is isolated:
//!
//! 1. Save the set to the trigger cache
//! 2. Stop monitoring everything under the task key
//! 3. Start monitoring one region per trigger (skipped for an empty set)
//!
//! The cache is written first so that an entry callback racing with step 3
//! already finds the new set. A failing step is logged and the next one still
//! runs; nothing is retried.
//!
//! Calls are single-flight: they run one at a time in arrival order, and a call
//! that is still waiting when a newer one arrives is dropped, because the newer
//! set supersedes it.

use crate::config::GeofenceConfig;
use crate::deadline::bounded;
use crate::os::{Geofencer, Region};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use waymark_core::ActiveTrigger;
use waymark_db::TriggerCache;

/// What a reconcile pass managed to do
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// A newer pass was requested before this one started; nothing was done
    pub superseded: bool,
    /// The trigger cache now holds the set
    pub cached: bool,
    /// Previously registered regions were removed
    pub unregistered: bool,
    /// Number of regions handed to the OS
    pub registered: usize,
}

impl ReconcileReport {
    fn superseded() -> Self {
        Self {
            superseded: true,
            ..Self::default()
        }
    }
}

/// Reconciles the OS region registry with the active trigger set
pub struct Registrar {
    cache: Arc<dyn TriggerCache>,
    os: Arc<dyn Geofencer>,
    config: GeofenceConfig,
    /// Held for the whole pipeline
    turn: Mutex<()>,
    /// Number of reconcile calls made so far
    requested: AtomicU64,
}

impl Registrar {
    /// Create a registrar over a cache and an OS geofencing facility
    pub fn new(cache: Arc<dyn TriggerCache>, os: Arc<dyn Geofencer>, config: GeofenceConfig) -> Self {
        Self {
            cache,
            os,
            config,
            turn: Mutex::new(()),
            requested: AtomicU64::new(0),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &GeofenceConfig {
        &self.config
    }

    /// Replace the registered region set with `triggers`
    ///
    /// Never fails; see [`ReconcileReport`] for what happened.
    pub async fn reconcile(&self, triggers: Vec<ActiveTrigger>) -> ReconcileReport {
        let ticket = self.requested.fetch_add(1, Ordering::SeqCst) + 1;
        let _turn = self.turn.lock().await;

        let latest = self.requested.load(Ordering::SeqCst);
        if latest != ticket {
            debug!(ticket, latest, "reconcile superseded before it started");
            return ReconcileReport::superseded();
        }

        let mut report = ReconcileReport::default();
        let task_key = self.config.task_key.as_str();

        match self.cache.save(&triggers) {
            Ok(()) => report.cached = true,
            Err(e) => warn!(error = %e, "failed to cache active triggers"),
        }

        let stop = self.os.stop_monitoring(task_key);
        match bounded("stop_monitoring", self.config.os_timeout(), stop).await {
            Ok(()) => report.unregistered = true,
            // Expected when nothing was registered yet
            Err(e) => debug!(task_key, error = %e, "stop monitoring failed"),
        }

        if triggers.is_empty() {
            info!(task_key, "no active triggers, nothing to monitor");
            return report;
        }

        let regions: Vec<Region> = triggers.iter().map(Region::for_trigger).collect();
        let count = regions.len();
        let start = self.os.start_monitoring(task_key, regions);
        match bounded("start_monitoring", self.config.os_timeout(), start).await {
            Ok(()) => {
                report.registered = count;
                info!(task_key, regions = count, "geofences registered");
            }
            Err(e) => warn!(task_key, regions = count, error = %e, "failed to register geofences"),
        }

        report
    }
}
