//! Activity views: weekday/hour heatmap, peak minutes, overview, recent devices

use chrono::{DateTime, Utc};

use crate::types::{
    DeviceAggregate, HeatmapCell, HourlyCount, OverviewStats, PeakUsageRecord, RecentDevice,
    TimeBucketAggregate, WeekdayHourAggregate,
};

/// Heatmap cells ordered by weekday then hour.
pub fn activity_heatmap(cells: &[WeekdayHourAggregate]) -> Vec<HeatmapCell> {
    let mut sorted = cells.to_vec();
    sorted.sort_by_key(|c| (c.weekday, c.hour));
    sorted
        .into_iter()
        .map(|c| HeatmapCell {
            x: c.hour,
            y: c.weekday,
            devices: c.devices,
        })
        .collect()
}

/// Busiest minute buckets, most scans first (ties keep the earlier minute).
pub fn peak_usage(minute_buckets: &[TimeBucketAggregate], limit: usize) -> Vec<PeakUsageRecord> {
    let mut sorted: Vec<&TimeBucketAggregate> = minute_buckets.iter().collect();
    sorted.sort_by(|a, b| {
        b.transmission_count
            .cmp(&a.transmission_count)
            .then_with(|| a.bucket_key.cmp(&b.bucket_key))
    });

    sorted
        .into_iter()
        .take(limit)
        .map(|b| PeakUsageRecord {
            minute_block: b.bucket_key.clone(),
            scan_count: b.transmission_count,
            unique_devices: b.active_devices,
            avg_signal: b.avg_rssi,
        })
        .collect()
}

/// Overview counters. `time_range` is `(first, last)` scan, absent when empty.
pub fn overview(
    total_scans: u64,
    unique_devices: u64,
    time_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> OverviewStats {
    OverviewStats {
        total_scans,
        unique_devices,
        first_scan: time_range.map(|(first, _)| first),
        last_scan: time_range.map(|(_, last)| last),
    }
}

/// Scan counts per hour of day, ascending, hours without scans dropped.
pub fn hourly_histogram(counts: &[HourlyCount]) -> Vec<HourlyCount> {
    let mut histogram: Vec<HourlyCount> = counts.iter().filter(|c| c.count > 0).cloned().collect();
    histogram.sort_by_key(|c| c.hour);
    histogram
}

/// Most recently discovered devices first.
pub fn recent_devices(devices: &[DeviceAggregate], limit: usize) -> Vec<RecentDevice> {
    let mut sorted: Vec<&DeviceAggregate> = devices.iter().collect();
    sorted.sort_by(|a, b| {
        b.first_seen
            .cmp(&a.first_seen)
            .then_with(|| a.fingerprint.cmp(&b.fingerprint))
    });

    sorted
        .into_iter()
        .take(limit)
        .map(|d| RecentDevice {
            fingerprint: d.fingerprint.clone(),
            first_seen: d.first_seen,
            last_seen: d.last_seen,
            reading_count: d.appearance_count,
        })
        .collect()
}
