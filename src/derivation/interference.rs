//! Interference scoring for hourly time buckets
//!
//! Score (0-100) is a fixed weighted sum:
//! - 30% average signal strength, `|avg_rssi| / 100`
//! - 30% signal spread, `(max_rssi - min_rssi) / 100`
//! - 20% device density, `min(devices / 10, 1)`
//! - 20% reading density, `min(readings / devices / 100, 1)`
//!
//! The strength and spread terms assume RSSI within -100..0 dBm and are not
//! clamped individually; the final score is clamped to 0..=100.

use crate::types::{interference_weights as w, InterferenceRecord, TimeBucketAggregate};

use super::round_to;

/// Interference score for one bucket, `None` when it has no active devices.
pub fn interference_score(bucket: &TimeBucketAggregate) -> Option<u8> {
    if bucket.active_devices == 0 {
        return None;
    }

    let devices = bucket.active_devices as f64;
    let total_readings = bucket.transmission_count as f64;

    let normalized_avg_rssi = bucket.avg_rssi.abs() / w::RSSI_SPAN_DBM;
    let signal_spread = (f64::from(bucket.max_rssi) - f64::from(bucket.min_rssi)) / w::RSSI_SPAN_DBM;
    let device_density = (devices / w::DEVICE_DENSITY_SATURATION).min(1.0);
    let reading_density = (total_readings / devices / w::READING_DENSITY_SATURATION).min(1.0);

    let weighted = normalized_avg_rssi * w::AVG_RSSI
        + signal_spread * w::SIGNAL_SPREAD
        + device_density * w::DEVICE_DENSITY
        + reading_density * w::READING_DENSITY;

    let score = (weighted * 100.0)
        .round()
        .clamp(w::SCORE_MIN as f64, w::SCORE_MAX as f64);

    // NaN casts to 0, which is still inside the contract
    Some(score as u8)
}

/// Interference rows for every bucket with at least one active device.
///
/// Bucket order is preserved.
pub fn interference_series(buckets: &[TimeBucketAggregate]) -> Vec<InterferenceRecord> {
    let records: Vec<InterferenceRecord> = buckets
        .iter()
        .filter_map(|b| {
            let score = interference_score(b)?;
            Some(InterferenceRecord {
                time_block: b.bucket_key.clone(),
                avg_rssi: round_to(b.avg_rssi, 1),
                device_count: b.active_devices,
                signal_range: b.max_rssi.saturating_sub(b.min_rssi),
                reading_density: b.transmission_count as f64 / b.active_devices as f64,
                interference_score: score,
            })
        })
        .collect();

    let skipped = buckets.len() - records.len();
    if skipped > 0 {
        tracing::debug!(skipped, "Excluded buckets with no active devices from interference scoring");
    }

    records
}
