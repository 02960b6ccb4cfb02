//! Sled Store Integration Tests
//!
//! Round-trips observations through an on-disk store in a temporary
//! directory and reads them back through the grouping adapter.

use beaconscope::grouping::GroupingAdapter;
use beaconscope::storage::{ObservationSource, SledObservationStore, TimeWindow};
use beaconscope::types::Observation;

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;

fn t(min: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 14, 9, 0, 0).unwrap() + Duration::minutes(min)
}

#[tokio::test]
async fn stored_observations_come_back_in_time_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = SledObservationStore::open(dir.path().join("obs.db")).unwrap();

    // Inserted out of order, two at the same instant
    store.insert(&Observation::new("late", t(30), -60)).unwrap();
    store
        .insert_batch(&[
            Observation::new("early", t(0), -70).with_tx_power(-59),
            Observation::new("same-a", t(10), -65),
            Observation::new("same-b", t(10), -66),
        ])
        .unwrap();
    assert_eq!(store.count(), 4);

    let all = store.observations(&TimeWindow::all()).await.unwrap();
    let order: Vec<_> = all.iter().map(|o| o.fingerprint.as_str()).collect();
    assert_eq!(order.first(), Some(&"early"));
    assert_eq!(order.last(), Some(&"late"));
    assert_eq!(all.len(), 4, "same-instant observations must not overwrite each other");
    assert_eq!(all[0].tx_power_level, Some(-59));
}

#[tokio::test]
async fn window_bounds_are_inclusive() {
    let dir = tempfile::tempdir().unwrap();
    let store = SledObservationStore::open(dir.path().join("obs.db")).unwrap();
    store
        .insert_batch(&(0..10).map(|i| Observation::new("d", t(i), -60)).collect::<Vec<_>>())
        .unwrap();

    let some = store.observations(&TimeWindow::between(t(2), t(5))).await.unwrap();
    assert_eq!(some.len(), 4);

    let since = TimeWindow {
        since: Some(t(8)),
        until: None,
    };
    assert_eq!(store.observations(&since).await.unwrap().len(), 2);

    let inverted = TimeWindow::between(t(5), t(2));
    assert!(store.observations(&inverted).await.unwrap().is_empty());
}

#[tokio::test]
async fn grouping_over_sled_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = SledObservationStore::open(dir.path().join("obs.db")).unwrap();
    store
        .insert_batch(&[
            Observation::new("a", t(0), -60).with_manufacturer("Apple"),
            Observation::new("a", t(61), -62),
            Observation::new("b", t(5), -80),
        ])
        .unwrap();

    let adapter = GroupingAdapter::new(Arc::new(store));
    assert_eq!(adapter.backend_name(), "Sled");

    let devices = adapter.devices(&TimeWindow::all()).await.unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].appearance_count, 2);
    assert_eq!(devices[0].active_hours, 2);

    let (total, unique, range) = adapter.overview_counts(&TimeWindow::all()).await.unwrap();
    assert_eq!((total, unique), (3, 2));
    assert_eq!(range, Some((t(0), t(61))));
}
