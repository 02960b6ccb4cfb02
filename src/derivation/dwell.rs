//! Dwell-time distribution
//!
//! Dwell time is `last_seen - first_seen` in minutes. Devices with no
//! positive span are not counted.

use crate::types::{dwell_bounds, DeviceAggregate, DwellBucket, DwellCount};

/// Dwell time of a device in (fractional) minutes.
///
/// Microsecond precision; spans too long for that fall back to milliseconds.
pub fn dwell_minutes(device: &DeviceAggregate) -> f64 {
    let span = device.last_seen - device.first_seen;
    match span.num_microseconds() {
        Some(us) => us as f64 / 60_000_000.0,
        None => span.num_milliseconds() as f64 / 60_000.0,
    }
}

/// Bucket for a dwell time; upper bounds are inclusive.
///
/// Returns `None` for non-positive (or NaN) dwell times.
pub fn dwell_bucket(minutes: f64) -> Option<DwellBucket> {
    if minutes.is_nan() || minutes <= 0.0 {
        return None;
    }
    Some(if minutes <= dwell_bounds::UP_TO_5 {
        DwellBucket::UpTo5
    } else if minutes <= dwell_bounds::UP_TO_15 {
        DwellBucket::UpTo15
    } else if minutes <= dwell_bounds::UP_TO_30 {
        DwellBucket::UpTo30
    } else if minutes <= dwell_bounds::UP_TO_60 {
        DwellBucket::UpTo60
    } else {
        DwellBucket::Over60
    })
}

/// Device count per dwell bucket, shortest bucket first.
///
/// Only buckets holding at least one device are returned.
pub fn dwell_distribution(devices: &[DeviceAggregate]) -> Vec<DwellCount> {
    let mut counts = [0u64; DwellBucket::ALL.len()];
    let mut excluded = 0usize;

    for device in devices {
        match dwell_bucket(dwell_minutes(device)) {
            Some(bucket) => counts[bucket as usize] += 1,
            None => excluded += 1,
        }
    }

    if excluded > 0 {
        tracing::debug!(excluded, "Devices without a positive dwell span");
    }

    DwellBucket::ALL
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(bucket, device_count)| DwellCount {
            time_range: *bucket,
            device_count,
        })
        .collect()
}
