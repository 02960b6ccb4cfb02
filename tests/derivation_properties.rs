//! Derivation Property Tests
//!
//! Behavioural guarantees of the derivation layer, checked against fixed
//! boundary cases and seeded random inputs.

use beaconscope::derivation::{
    behaviour_summary, channel_load, channel_utilisation, classify, device_details, dwell_bucket,
    dwell_distribution, estimate_distance, interference_score, interference_series, load_level,
    manufacturer_report, presence_series, propagation_points, rssi_ranking,
};
use beaconscope::grouping;
use beaconscope::types::thresholds::{classification_thresholds as ct, load_thresholds as lt};
use beaconscope::types::{
    DeviceAggregate, DeviceCategory, DwellBucket, LoadLevel, ManufacturerAggregate, Observation,
    TimeBucketAggregate,
};

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::prelude::*;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 14, 9, 0, 0).unwrap()
}

fn random_bucket(rng: &mut StdRng, key: usize) -> TimeBucketAggregate {
    let devices = rng.gen_range(0..50u64);
    let readings = devices + rng.gen_range(0..500u64);
    let min = rng.gen_range(-130..=0);
    let max = rng.gen_range(min..=20);
    TimeBucketAggregate {
        bucket_key: format!("2025-04-{:02} {:02}:00", 1 + key / 24, key % 24),
        transmission_count: readings,
        active_devices: devices,
        avg_rssi: f64::from(min) + (f64::from(max) - f64::from(min)) * rng.gen::<f64>(),
        min_rssi: min,
        max_rssi: max,
        unique_services: rng.gen_range(0..5),
    }
}

fn random_observations(rng: &mut StdRng, n: usize) -> Vec<Observation> {
    (0..n)
        .map(|_| {
            let fp = format!("dev-{}", rng.gen_range(0..12));
            let ts = t0() + Duration::minutes(rng.gen_range(0..60 * 24 * 10));
            let mut obs = Observation::new(fp, ts, rng.gen_range(-100..-30));
            if rng.gen_bool(0.5) {
                obs = obs.with_tx_power(rng.gen_range(-70..=-50));
            }
            if rng.gen_bool(0.6) {
                obs = obs.with_manufacturer(["Apple", "Samsung", "Tile"][rng.gen_range(0..3)]);
            }
            if rng.gen_bool(0.4) {
                obs = obs.with_services(["180f", "feaa"].into_iter().take(rng.gen_range(1..=2)));
            }
            obs
        })
        .collect()
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn classify_respects_rule_order() {
    assert_eq!(classify(100, 7), DeviceCategory::Permanent);
    assert_eq!(classify(200, 3), DeviceCategory::Regular);
    assert_eq!(classify(60, 1), DeviceCategory::Frequent);
    assert_eq!(classify(5, 1), DeviceCategory::Occasional);
}

#[test]
fn classify_thresholds_are_inclusive() {
    assert_eq!(
        classify(ct::PERMANENT_MIN_APPEARANCES - 1, ct::PERMANENT_MIN_DAYS),
        DeviceCategory::Regular
    );
    assert_eq!(classify(0, ct::REGULAR_MIN_DAYS), DeviceCategory::Regular);
    assert_eq!(classify(0, ct::REGULAR_MIN_DAYS - 1), DeviceCategory::Occasional);
    assert_eq!(classify(ct::FREQUENT_MIN_APPEARANCES, 0), DeviceCategory::Frequent);
    assert_eq!(classify(ct::FREQUENT_MIN_APPEARANCES - 1, 0), DeviceCategory::Occasional);
}

#[test]
fn classify_is_total() {
    for appearances in [0, 1, 49, 50, 99, 100, 10_000] {
        for days in [0, 1, 2, 3, 6, 7, 365] {
            assert!(DeviceCategory::ALL.contains(&classify(appearances, days)));
        }
    }
}

// ============================================================================
// Signal model
// ============================================================================

#[test]
fn distance_zero_difference_is_one_metre() {
    assert_eq!(estimate_distance(-59.0, -59.0, 2.7), 1.0);
    assert_eq!(estimate_distance(0.0, 0.0, 2.5), 1.0);
}

#[test]
fn distance_never_fails_on_degenerate_exponent() {
    for n in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        assert!(estimate_distance(-70.0, -59.0, n).is_finite());
    }
}

#[test]
fn distance_grows_as_signal_weakens() {
    let near = estimate_distance(-60.0, -59.0, 2.7);
    let far = estimate_distance(-90.0, -59.0, 2.7);
    assert!(far > near);
}

// ============================================================================
// Interference
// ============================================================================

#[test]
fn interference_score_always_in_range() {
    let mut rng = StdRng::seed_from_u64(7);
    for key in 0..2_000 {
        let bucket = random_bucket(&mut rng, key % 240);
        match interference_score(&bucket) {
            Some(score) => {
                assert!(bucket.active_devices > 0);
                assert!(score <= 100);
            }
            None => assert_eq!(bucket.active_devices, 0),
        }
    }
}

// ============================================================================
// Dwell time
// ============================================================================

#[test]
fn dwell_boundaries() {
    assert_eq!(dwell_bucket(5.0), Some(DwellBucket::UpTo5));
    assert_eq!(dwell_bucket(5.0001), Some(DwellBucket::UpTo15));
    assert_eq!(dwell_bucket(15.0), Some(DwellBucket::UpTo15));
    assert_eq!(dwell_bucket(60.0), Some(DwellBucket::UpTo60));
    assert_eq!(dwell_bucket(60.5), Some(DwellBucket::Over60));
    assert_eq!(dwell_bucket(0.0), None);
    assert_eq!(DwellBucket::UpTo15.label(), "6-15");
}

#[test]
fn dwell_bucketing_is_total_and_disjoint() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..5_000 {
        let minutes = rng.gen_range(0.0001..10_000.0);
        let hits = DwellBucket::ALL
            .iter()
            .filter(|&&b| dwell_bucket(minutes) == Some(b))
            .count();
        assert_eq!(hits, 1, "{minutes}");
    }
}

#[test]
fn dwell_distribution_counts_every_positive_dwell() {
    let mut rng = StdRng::seed_from_u64(3);
    let devices = grouping::device_aggregates(&random_observations(&mut rng, 400));
    let positive = devices.iter().filter(|d| d.last_seen > d.first_seen).count() as u64;
    let total: u64 = dwell_distribution(&devices).iter().map(|d| d.device_count).sum();
    assert_eq!(total, positive);
}

// ============================================================================
// Channel load
// ============================================================================

#[test]
fn load_level_thresholds_are_strict() {
    assert_eq!(load_level(10.0), LoadLevel::Medium);
    assert_eq!(load_level(10.01), LoadLevel::High);
    assert_eq!(load_level(lt::MEDIUM_TRANSMISSIONS_PER_DEVICE), LoadLevel::Low);
    assert_eq!(load_level(5.01), LoadLevel::Medium);
}

#[test]
fn zero_device_buckets_never_reach_output() {
    let mut rng = StdRng::seed_from_u64(19);
    let buckets: Vec<_> = (0..500).map(|k| random_bucket(&mut rng, k % 240)).collect();
    let empty: Vec<&str> = buckets
        .iter()
        .filter(|b| b.active_devices == 0)
        .map(|b| b.bucket_key.as_str())
        .collect();
    assert!(!empty.is_empty(), "generator should produce some empty buckets");

    let utilisation = channel_utilisation(&buckets);
    assert!(utilisation.buckets.iter().all(|r| r.active_devices > 0));
    assert!(utilisation
        .buckets
        .iter()
        .all(|r| r.transmissions_per_device.is_finite() && r.channel_load_factor.is_finite()));

    let interference = interference_series(&buckets);
    assert!(interference.iter().all(|r| r.device_count > 0));
    assert_eq!(
        interference.len(),
        buckets.len() - empty.len(),
        "every non-empty bucket is scored"
    );
}

#[test]
fn channel_load_factor_matches_definition() {
    let bucket = TimeBucketAggregate {
        bucket_key: "2025-04-14 09:00".into(),
        transmission_count: 600,
        active_devices: 5,
        avg_rssi: -70.0,
        min_rssi: -90,
        max_rssi: -50,
        unique_services: 2,
    };
    let record = channel_load(&bucket).unwrap();
    assert_eq!(record.transmissions_per_device, 120.0);
    assert_eq!(record.channel_load_factor, 2.0);
    assert_eq!(record.load_level, LoadLevel::High);
}

// ============================================================================
// Manufacturers
// ============================================================================

fn manufacturer(label: &str, devices: u64, avg: f64) -> ManufacturerAggregate {
    ManufacturerAggregate {
        manufacturer_label: label.to_string(),
        device_count: devices,
        avg_signal_strength: avg,
        total_appearances: devices * 10,
        days_seen: 1,
        services: Vec::new(),
    }
}

#[test]
fn manufacturer_ties_break_on_signal_strength() {
    let report = manufacturer_report(
        &[
            manufacturer("Weak", 4, -80.0),
            manufacturer("Strong", 4, -60.0),
            manufacturer("Many", 9, -90.0),
        ],
        20,
        5,
    );
    let order: Vec<_> = report.manufacturers.iter().map(|m| m.manufacturer.as_str()).collect();
    assert_eq!(order, ["Many", "Strong", "Weak"]);
}

#[test]
fn manufacturer_ranking_is_capped() {
    let groups: Vec<_> = (0..30)
        .map(|i| manufacturer(&format!("m{i}"), i + 1, -70.0))
        .collect();
    let report = manufacturer_report(&groups, 20, 5);
    assert_eq!(report.manufacturers.len(), 20);
    assert_eq!(report.manufacturers[0].device_count, 30);
}

// ============================================================================
// Aggregate invariants
// ============================================================================

#[test]
fn grouped_rows_respect_aggregate_invariants() {
    for seed in [37, 41, 43] {
        let mut rng = StdRng::seed_from_u64(seed);
        let observations = random_observations(&mut rng, 800);

        for d in grouping::device_aggregates(&observations) {
            assert!(
                f64::from(d.min_rssi) <= d.avg_rssi && d.avg_rssi <= f64::from(d.max_rssi),
                "{}: {} <= {} <= {}",
                d.fingerprint,
                d.min_rssi,
                d.avg_rssi,
                d.max_rssi
            );
            assert!(d.active_hours <= 24 * d.days_active, "{}", d.fingerprint);
            assert!(d.first_seen <= d.last_seen);
        }

        let buckets = grouping::hourly_buckets(&observations)
            .into_iter()
            .chain(grouping::minute_buckets(&observations));
        for b in buckets {
            assert!(
                f64::from(b.min_rssi) <= b.avg_rssi && b.avg_rssi <= f64::from(b.max_rssi),
                "{}",
                b.bucket_key
            );
            assert!(b.active_devices <= b.transmission_count, "{}", b.bucket_key);
            assert!(b.active_devices > 0);
        }
    }
}

// ============================================================================
// Idempotence
// ============================================================================

fn devices_fixture() -> Vec<DeviceAggregate> {
    let mut rng = StdRng::seed_from_u64(23);
    grouping::device_aggregates(&random_observations(&mut rng, 600))
}

#[test]
fn every_metric_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(29);
    let observations = random_observations(&mut rng, 600);
    let devices = devices_fixture();
    let hours = grouping::hourly_buckets(&observations);
    let groups = grouping::manufacturer_aggregates(&observations);
    let days = grouping::device_days(&observations);

    assert_eq!(device_details(&devices, 50), device_details(&devices, 50));
    assert_eq!(behaviour_summary(&devices, 10), behaviour_summary(&devices, 10));
    assert_eq!(dwell_distribution(&devices), dwell_distribution(&devices));
    assert_eq!(channel_utilisation(&hours), channel_utilisation(&hours));
    assert_eq!(interference_series(&hours), interference_series(&hours));
    assert_eq!(manufacturer_report(&groups, 20, 5), manufacturer_report(&groups, 20, 5));
    assert_eq!(presence_series(&days, 30), presence_series(&days, 30));
    assert_eq!(
        rssi_ranking(&devices, 2.7, -59, 20),
        rssi_ranking(&devices, 2.7, -59, 20)
    );
    assert_eq!(
        propagation_points(&observations, 2.5, 1000),
        propagation_points(&observations, 2.5, 1000)
    );

    // Bit-identical, not merely approximately equal
    let a = channel_utilisation(&hours).summary.average_channel_load;
    let b = channel_utilisation(&hours).summary.average_channel_load;
    assert_eq!(a.to_bits(), b.to_bits());
}

#[test]
fn grouping_is_deterministic_under_input_order() {
    let mut rng = StdRng::seed_from_u64(31);
    let mut observations = random_observations(&mut rng, 300);
    let forward = grouping::hourly_buckets(&observations);
    observations.reverse();
    let reversed = grouping::hourly_buckets(&observations);
    assert_eq!(forward.len(), reversed.len());
    for (f, r) in forward.iter().zip(&reversed) {
        assert_eq!(f.bucket_key, r.bucket_key);
        assert_eq!(f.transmission_count, r.transmission_count);
        assert_eq!(f.active_devices, r.active_devices);
    }
}
