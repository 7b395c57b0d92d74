//! Region entry simulator
//!
//! Plays both halves of the geofence lifecycle in one process:
//!
//! - **Foreground**: seeds an in-memory event store from a scenario file,
//!   derives the active triggers at the scenario's clock and registers them
//!   with an in-memory geofencer, caching the set on disk
//! - **Background**: opens its own handle on the on-disk cache while the
//!   foreground is still alive and replays the scenario's region transitions
//!   through the entry handler
//!
//! ```text
//! region_sim [scenario.ron] [geofence.ron]
//! ```
//!
//! Set `RUST_LOG=debug` to see each pipeline step.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use waymark_core::{Event, TriggerKey};
use waymark_db::Store;
use waymark_geofence::{
    EntryOutcome, EventStore, GeofenceConfig, MemoryEventStore, MemoryGeofencer, MemoryNotifier,
    NotificationChannel, Notifier, RegionEntryHandler, RegionEvent, RegionRef, Registrar, Session,
    TransitionKind,
};

/// A simulated region transition
#[derive(Debug, Deserialize)]
struct Transition {
    /// Position of the event in the scenario
    event: usize,
    /// Trigger index within that event
    trigger: usize,
    #[serde(default = "default_kind")]
    kind: TransitionKind,
}

fn default_kind() -> TransitionKind {
    TransitionKind::Enter
}

/// Scenario file layout
#[derive(Debug, Deserialize)]
struct Scenario {
    user_id: String,
    /// Simulated wall clock for derivation
    now: DateTime<Utc>,
    /// Trigger cache location
    #[serde(default = "default_store_path")]
    store_path: PathBuf,
    events: Vec<Event>,
    transitions: Vec<Transition>,
}

fn default_store_path() -> PathBuf {
    std::env::temp_dir().join("waymark-region-sim").join("triggers.db")
}

impl Scenario {
    fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(ron::from_str(&content)?)
    }
}

/// Foreground pass; the returned session keeps its cache handle alive
async fn foreground(
    scenario: &Scenario,
    events: Arc<MemoryEventStore>,
    config: &GeofenceConfig,
) -> Result<Session, Box<dyn std::error::Error>> {
    let os = Arc::new(MemoryGeofencer::new());
    let registrar = Arc::new(Registrar::new(
        Arc::new(Store::open(&scenario.store_path)?),
        os.clone(),
        config.clone(),
    ));
    let session = Session::new(events, registrar, scenario.user_id.as_str());

    match session.sync_at(scenario.now).await {
        Some(report) => println!(
            "[foreground] cached={} unregistered={} registered={}",
            report.cached, report.unregistered, report.registered
        ),
        None => println!("[foreground] events unavailable, registration unchanged"),
    }
    for region in os.regions() {
        println!(
            "  [region] {} at ({:.5}, {:.5}) r={}m",
            region.identifier, region.latitude, region.longitude, region.radius
        );
    }
    Ok(session)
}

/// Print what the background context finds in the cache
fn report_cache(cache: &Store, ids: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    if !cache.has_stored_set()? {
        println!("[background] trigger cache is empty");
        return Ok(());
    }
    println!("[background] {} cached triggers", cache.count_triggers()?);
    for id in ids {
        let triggers = cache.triggers_for_event(id)?;
        if !triggers.is_empty() {
            let identifiers: Vec<_> = triggers.iter().map(|t| t.identifier.as_str()).collect();
            println!("  [cached] {} -> {}", id, identifiers.join(", "));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = std::env::args().skip(1);
    let scenario_path = args
        .next()
        .unwrap_or_else(|| "demos/region_sim/scenario.ron".to_string());
    let config = match args.next() {
        Some(path) => GeofenceConfig::load(&path)?,
        None => GeofenceConfig::default(),
    };

    println!("Loading scenario from: {}", scenario_path);
    let scenario = Scenario::load(&scenario_path)?;

    let events = Arc::new(MemoryEventStore::new());
    let mut ids = Vec::with_capacity(scenario.events.len());
    for event in &scenario.events {
        let mut event = event.clone();
        if event.user_id.is_empty() {
            event.user_id = scenario.user_id.clone();
        }
        ids.push(events.save_event(event).await?);
    }
    info!(events = ids.len(), user_id = %scenario.user_id, "event store seeded");

    let session = foreground(&scenario, events.clone(), &config).await?;

    let cache = Arc::new(Store::open(&scenario.store_path)?);
    let notifier = Arc::new(MemoryNotifier::new());
    notifier.ensure_channel(&NotificationChannel::default()).await?;
    let handler = RegionEntryHandler::new(cache.clone(), events, notifier.clone(), config);

    println!();
    report_cache(&cache, &ids)?;
    for transition in &scenario.transitions {
        let Some(event_id) = ids.get(transition.event) else {
            println!("[background] no event at position {}, skipped", transition.event);
            continue;
        };
        let identifier = TriggerKey::new(event_id.as_str(), transition.trigger).encode();
        let outcome = handler
            .handle(RegionEvent {
                event_type: transition.kind,
                region: RegionRef {
                    identifier: identifier.clone(),
                },
                error: None,
            })
            .await;

        match outcome {
            EntryOutcome::Notified(notification) => println!(
                "[background] {:?} {} -> \"{}\" / \"{}\" sound={} vibrate={}",
                transition.kind,
                identifier,
                notification.title,
                notification.body,
                notification.sound,
                notification.vibrate
            ),
            other => println!("[background] {:?} {} -> {:?}", transition.kind, identifier, other),
        }
    }

    println!();
    println!("Notifications presented: {}", notifier.presented().len());
    drop(session);
    Ok(())
}
