//! Landing-page summary combining several derivations

use crate::types::{
    CategoryCount, DashboardSummary, DeviceAggregate, DeviceCategory, ManufacturerAggregate,
    OverviewStats, TimeBucketAggregate,
};

use super::{channel_load, classifier, interference, manufacturer};

/// Overview counters derived from per-device aggregates.
pub fn overview_from_devices(devices: &[DeviceAggregate]) -> OverviewStats {
    OverviewStats {
        total_scans: devices.iter().map(|d| d.appearance_count).sum(),
        unique_devices: devices.len() as u64,
        first_scan: devices.iter().map(|d| d.first_seen).min(),
        last_scan: devices.iter().map(|d| d.last_seen).max(),
    }
}

/// Device count per category, all four categories always present.
pub fn category_counts(devices: &[DeviceAggregate]) -> Vec<CategoryCount> {
    DeviceCategory::ALL
        .iter()
        .map(|&category| CategoryCount {
            category,
            count: devices
                .iter()
                .filter(|d| classifier::classify(d.appearance_count, d.days_active) == category)
                .count() as u64,
        })
        .collect()
}

pub fn dashboard_summary(
    devices: &[DeviceAggregate],
    hourly_buckets: &[TimeBucketAggregate],
    manufacturers: &[ManufacturerAggregate],
    manufacturer_rank: usize,
    top_services: usize,
) -> DashboardSummary {
    let utilisation = channel_load::channel_utilisation(hourly_buckets);
    let peak_interference = interference::interference_series(hourly_buckets)
        .into_iter()
        .reduce(|best, r| {
            if r.interference_score > best.interference_score {
                r
            } else {
                best
            }
        });

    DashboardSummary {
        overview: overview_from_devices(devices),
        categories: category_counts(devices),
        channel_load: utilisation.summary,
        manufacturers: manufacturer::manufacturer_report(manufacturers, manufacturer_rank, top_services)
            .summary,
        peak_interference,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn device(fp: &str, appearances: u64, days: u32, offset_min: i64) -> DeviceAggregate {
        let t = Utc.with_ymd_and_hms(2025, 4, 14, 9, 0, 0).unwrap() + Duration::minutes(offset_min);
        DeviceAggregate {
            fingerprint: fp.to_string(),
            appearance_count: appearances,
            days_active: days,
            active_hours: 1,
            avg_rssi: -60.0,
            min_rssi: -70,
            max_rssi: -50,
            first_seen: t,
            last_seen: t + Duration::minutes(10),
            manufacturer: None,
            services: Vec::new(),
        }
    }

    fn hour(key: &str, readings: u64, devices: u64, avg: f64) -> TimeBucketAggregate {
        TimeBucketAggregate {
            bucket_key: key.to_string(),
            transmission_count: readings,
            active_devices: devices,
            avg_rssi: avg,
            min_rssi: -90,
            max_rssi: -50,
            unique_services: 0,
        }
    }

    #[test]
    fn test_overview_from_devices() {
        let stats = overview_from_devices(&[device("a", 10, 1, 30), device("b", 5, 1, 0)]);
        assert_eq!(stats.total_scans, 15);
        assert_eq!(stats.unique_devices, 2);
        assert!(stats.first_scan < stats.last_scan);
    }

    #[test]
    fn test_category_counts_cover_all() {
        let counts = category_counts(&[device("a", 150, 8, 0), device("b", 1, 1, 0)]);
        assert_eq!(counts.len(), 4);
        assert_eq!(counts[0].count, 1);
        assert_eq!(counts[1].count, 0);
        assert_eq!(counts[3].count, 1);
    }

    #[test]
    fn test_peak_interference_earliest_on_tie() {
        let summary = dashboard_summary(
            &[],
            &[
                hour("2025-04-14 09:00", 100, 5, -70.0),
                hour("2025-04-14 10:00", 100, 5, -70.0),
                hour("2025-04-14 11:00", 1, 1, -40.0),
            ],
            &[],
            20,
            5,
        );
        let peak = summary.peak_interference.unwrap();
        assert_eq!(peak.time_block, "2025-04-14 09:00");
        assert_eq!(summary.channel_load.time_blocks, 3);
    }
}
