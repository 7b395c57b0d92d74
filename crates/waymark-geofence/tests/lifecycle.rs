//! Foreground sync and background entry handling against one on-disk cache

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::path::Path;
use std::sync::Arc;
use waymark_core::{Coordinate, Event, Trigger};
use waymark_db::Store;
use waymark_geofence::{
    EntryOutcome, EventStore, GeofenceConfig, MemoryEventStore, MemoryGeofencer, MemoryNotifier,
    RegionEntryHandler, RegionEvent, Registrar, Session,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 14, 19, 0, 0).unwrap()
}

async fn seed(events: &MemoryEventStore) -> String {
    let mut concert = Event::new("", "Concert", t0(), t0() + Duration::hours(3))
        .with_description("Doors open")
        .with_trigger(Trigger::at(Coordinate::new(38.7139, -9.1394), 200.0))
        .with_trigger(Trigger::default());
    concert.user_id = "u1".to_string();

    let mut tomorrow = Event::new(
        "",
        "Market",
        t0() + Duration::days(1),
        t0() + Duration::days(1) + Duration::hours(4),
    )
    .with_trigger(Trigger::at(Coordinate::new(38.71, -9.13), 100.0));
    tomorrow.user_id = "u1".to_string();

    let id = events.save_event(concert).await.unwrap();
    events.save_event(tomorrow).await.unwrap();
    id
}

/// Foreground process: derive, cache and register, then exit.
async fn foreground(path: &Path, events: Arc<MemoryEventStore>, now: DateTime<Utc>) -> Arc<MemoryGeofencer> {
    let os = Arc::new(MemoryGeofencer::new());
    let registrar = Arc::new(Registrar::new(
        Arc::new(Store::open(path).unwrap()),
        os.clone(),
        GeofenceConfig::default(),
    ));
    let session = Session::new(events, registrar, "u1");
    let report = session.sync_at(now).await.unwrap();
    assert!(report.cached);
    os
}

/// Background process: fresh cache handle, no foreground state.
fn background(
    path: &Path,
    events: Arc<MemoryEventStore>,
) -> (RegionEntryHandler, Arc<MemoryNotifier>) {
    let notifier = Arc::new(MemoryNotifier::new());
    let handler = RegionEntryHandler::new(
        Arc::new(Store::open(path).unwrap()),
        events,
        notifier.clone(),
        GeofenceConfig::default(),
    );
    (handler, notifier)
}

#[tokio::test]
async fn test_entry_after_restart_notifies() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("triggers.db");
    let events = Arc::new(MemoryEventStore::new());
    let concert_id = seed(&events).await;

    let os = foreground(&path, events.clone(), t0() + Duration::minutes(45)).await;
    let regions = os.regions();
    assert_eq!(regions.len(), 1);
    let identifier = regions[0].identifier.clone();
    assert_eq!(identifier, format!("{concert_id}-0"));

    let (handler, notifier) = background(&path, events);
    let payload = format!(
        r#"{{"eventType":"enter","region":{{"identifier":"{identifier}"}}}}"#
    );
    let outcome = handler.handle_json(&payload).await;

    assert!(matches!(outcome, EntryOutcome::Notified(_)));
    let presented = notifier.presented();
    assert_eq!(presented.len(), 1);
    assert!(presented[0].title.contains("Concert"));
    assert_eq!(presented[0].body, "Doors open");
    assert!(presented[0].sound);
    assert_eq!(presented[0].data.event_id, concert_id);
}

#[tokio::test]
async fn test_event_deleted_after_registration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("triggers.db");
    let events = Arc::new(MemoryEventStore::new());
    let concert_id = seed(&events).await;

    foreground(&path, events.clone(), t0()).await;
    events.delete_event(&concert_id).await.unwrap();

    let (handler, notifier) = background(&path, events);
    let outcome = handler
        .handle(RegionEvent::enter(format!("{concert_id}-0")))
        .await;

    assert_eq!(outcome, EntryOutcome::EventUnavailable);
    assert!(notifier.presented().is_empty());
}

#[tokio::test]
async fn test_stale_region_after_window_closes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("triggers.db");
    let events = Arc::new(MemoryEventStore::new());
    let concert_id = seed(&events).await;

    foreground(&path, events.clone(), t0()).await;
    // Next pass runs after the concert ended; the old region is gone from the cache
    let os = foreground(&path, events.clone(), t0() + Duration::hours(4)).await;
    assert!(os.regions().is_empty());

    let (handler, notifier) = background(&path, events);
    let outcome = handler
        .handle(RegionEvent::enter(format!("{concert_id}-0")))
        .await;

    assert_eq!(outcome, EntryOutcome::NoActiveTrigger);
    assert!(notifier.presented().is_empty());
}

#[tokio::test]
async fn test_background_reads_while_foreground_alive() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("triggers.db");
    let events = Arc::new(MemoryEventStore::new());
    let concert_id = seed(&events).await;

    // Foreground keeps its registrar and cache handle for the whole test
    let os = Arc::new(MemoryGeofencer::new());
    let registrar = Arc::new(Registrar::new(
        Arc::new(Store::open(&path).unwrap()),
        os.clone(),
        GeofenceConfig::default(),
    ));
    let session = Session::new(events.clone(), registrar, "u1");
    let report = session.sync_at(t0() + Duration::minutes(10)).await.unwrap();
    assert!(report.cached);
    assert_eq!(report.registered, 1);

    let (handler, notifier) = background(&path, events.clone());
    let outcome = handler
        .handle(RegionEvent::enter(format!("{concert_id}-0")))
        .await;
    assert!(matches!(outcome, EntryOutcome::Notified(_)));

    // A new pass written by the live foreground is seen by the live handler
    let mut moved = events.fetch_event_by_id(&concert_id).await.unwrap().unwrap();
    moved.triggers.swap(0, 1);
    assert!(moved.set_trigger_location(0, Coordinate::new(38.72, -9.15), Some(50.0)));
    events.update_event(&concert_id, moved).await.unwrap();
    let report = session.sync_at(t0() + Duration::minutes(20)).await.unwrap();
    assert!(report.cached);
    assert_eq!(report.registered, 2);

    let outcome = handler
        .handle(RegionEvent::enter(format!("{concert_id}-1")))
        .await;
    assert!(matches!(outcome, EntryOutcome::Notified(_)), "got {outcome:?}");
    let presented = notifier.presented();
    assert_eq!(presented.len(), 2);
    assert!(presented[1].title.contains("Concert"));
    assert_eq!(os.regions().len(), 2);

    // Window closed: the live handler stops notifying
    session.sync_at(t0() + Duration::hours(4)).await.unwrap();
    let outcome = handler
        .handle(RegionEvent::enter(format!("{concert_id}-0")))
        .await;
    assert_eq!(outcome, EntryOutcome::NoActiveTrigger);
    assert_eq!(notifier.presented().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_entries_during_concurrent_syncs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("triggers.db");
    let events = Arc::new(MemoryEventStore::new());
    let concert_id = seed(&events).await;

    let registrar = Arc::new(Registrar::new(
        Arc::new(Store::open(&path).unwrap()),
        Arc::new(MemoryGeofencer::new()),
        GeofenceConfig::default(),
    ));
    let session = Arc::new(Session::new(events.clone(), registrar, "u1"));
    session.sync_at(t0()).await.unwrap();

    let (handler, notifier) = background(&path, events);
    let handler = Arc::new(handler);

    let syncs = tokio::spawn({
        let session = session.clone();
        async move {
            for minute in 0..20 {
                session.sync_at(t0() + Duration::minutes(minute)).await.unwrap();
            }
        }
    });
    let entries = tokio::spawn({
        let handler = handler.clone();
        let identifier = format!("{concert_id}-0");
        async move {
            let mut outcomes = Vec::new();
            for _ in 0..20 {
                outcomes.push(handler.handle(RegionEvent::enter(identifier.clone())).await);
            }
            outcomes
        }
    });

    syncs.await.unwrap();
    let outcomes = entries.await.unwrap();
    assert!(outcomes
        .iter()
        .all(|outcome| matches!(outcome, EntryOutcome::Notified(_))));
    assert_eq!(notifier.presented().len(), 20);
}

