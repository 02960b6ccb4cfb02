//! Device behaviour classification
//!
//! Rules are evaluated in order and the first match wins:
//! 1. `days >= 7 && appearances >= 100` -> Permanent
//! 2. `days >= 3` -> Regular
//! 3. `appearances >= 50` -> Frequent
//! 4. otherwise -> Occasional

use std::collections::BTreeMap;

use crate::types::{
    classification_thresholds as ct, BehaviourGroup, DeviceAggregate, DeviceCategory, DeviceDetail,
    PresenceStats, SignalStats,
};

use super::{round_to, UNKNOWN_MANUFACTURER};

/// Classify a device from its appearance count and distinct active days.
pub fn classify(appearance_count: u64, days_active: u32) -> DeviceCategory {
    if days_active >= ct::PERMANENT_MIN_DAYS && appearance_count >= ct::PERMANENT_MIN_APPEARANCES {
        DeviceCategory::Permanent
    } else if days_active >= ct::REGULAR_MIN_DAYS {
        DeviceCategory::Regular
    } else if appearance_count >= ct::FREQUENT_MIN_APPEARANCES {
        DeviceCategory::Frequent
    } else {
        DeviceCategory::Occasional
    }
}

/// Per-device detail rows, most persistent devices first.
///
/// Ordered by days active desc, then appearances desc, then fingerprint.
pub fn device_details(devices: &[DeviceAggregate], limit: usize) -> Vec<DeviceDetail> {
    let mut sorted: Vec<&DeviceAggregate> = devices.iter().collect();
    sorted.sort_by(|a, b| {
        b.days_active
            .cmp(&a.days_active)
            .then_with(|| b.appearance_count.cmp(&a.appearance_count))
            .then_with(|| a.fingerprint.cmp(&b.fingerprint))
    });

    sorted
        .into_iter()
        .take(limit)
        .map(|d| DeviceDetail {
            fingerprint: d.fingerprint.clone(),
            category: classify(d.appearance_count, d.days_active),
            manufacturer: d
                .manufacturer
                .clone()
                .unwrap_or_else(|| UNKNOWN_MANUFACTURER.to_string()),
            services: d.services.clone(),
            signal_stats: SignalStats {
                avg_rssi: round_to(d.avg_rssi, 1),
                min_rssi: d.min_rssi,
                max_rssi: d.max_rssi,
            },
            presence_stats: PresenceStats {
                days_active: d.days_active,
                total_hours: d.active_hours,
            },
        })
        .collect()
}

/// Category counts for devices seen more than `min_appearances` times.
///
/// Groups are returned in category order; empty categories are omitted.
pub fn behaviour_summary(devices: &[DeviceAggregate], min_appearances: u64) -> Vec<BehaviourGroup> {
    // (count, appearance sum, active-hour sum)
    let mut groups: BTreeMap<DeviceCategory, (u64, u64, u64)> = BTreeMap::new();

    for d in devices.iter().filter(|d| d.appearance_count > min_appearances) {
        let entry = groups
            .entry(classify(d.appearance_count, d.days_active))
            .or_default();
        entry.0 += 1;
        entry.1 += d.appearance_count;
        entry.2 += u64::from(d.active_hours);
    }

    DeviceCategory::ALL
        .iter()
        .filter_map(|category| {
            groups.get(category).map(|&(count, appearances, hours)| BehaviourGroup {
                category: *category,
                count,
                avg_appearances: (appearances as f64 / count as f64).round() as u64,
                avg_active_hours: (hours as f64 / count as f64).round() as u64,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn device(fp: &str, appearances: u64, days: u32, hours: u32) -> DeviceAggregate {
        let t = Utc.with_ymd_and_hms(2025, 4, 1, 8, 0, 0).unwrap();
        DeviceAggregate {
            fingerprint: fp.to_string(),
            appearance_count: appearances,
            days_active: days,
            active_hours: hours,
            avg_rssi: -67.25,
            min_rssi: -80,
            max_rssi: -55,
            first_seen: t,
            last_seen: t,
            manufacturer: None,
            services: Vec::new(),
        }
    }

    #[test]
    fn test_rule_order() {
        assert_eq!(classify(100, 7), DeviceCategory::Permanent);
        assert_eq!(classify(200, 3), DeviceCategory::Regular);
        assert_eq!(classify(60, 1), DeviceCategory::Frequent);
        assert_eq!(classify(5, 1), DeviceCategory::Occasional);
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(classify(99, 7), DeviceCategory::Regular);
        assert_eq!(classify(100, 6), DeviceCategory::Regular);
        assert_eq!(classify(1000, 2), DeviceCategory::Frequent);
        assert_eq!(classify(49, 2), DeviceCategory::Occasional);
        assert_eq!(classify(50, 0), DeviceCategory::Frequent);
        assert_eq!(classify(0, 0), DeviceCategory::Occasional);
    }

    #[test]
    fn test_details_ordering_and_defaults() {
        let devices = vec![
            device("b", 10, 1, 2),
            device("a", 500, 9, 20),
            device("c", 40, 1, 3),
        ];
        let details = device_details(&devices, 10);
        let order: Vec<_> = details.iter().map(|d| d.fingerprint.as_str()).collect();
        assert_eq!(order, ["a", "c", "b"]);
        assert_eq!(details[0].category, DeviceCategory::Permanent);
        assert_eq!(details[0].manufacturer, "Unknown");
        assert_eq!(details[0].signal_stats.avg_rssi, -67.3);

        assert_eq!(device_details(&devices, 2).len(), 2);
    }

    #[test]
    fn test_behaviour_summary_filters_and_orders() {
        let devices = vec![
            device("occ", 11, 1, 1),
            device("noise", 10, 1, 1),
            device("perm1", 150, 8, 20),
            device("perm2", 250, 10, 24),
            device("freq", 60, 1, 5),
        ];
        let groups = behaviour_summary(&devices, 10);
        let cats: Vec<_> = groups.iter().map(|g| g.category).collect();
        assert_eq!(
            cats,
            [DeviceCategory::Permanent, DeviceCategory::Frequent, DeviceCategory::Occasional]
        );
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[0].avg_appearances, 200);
        assert_eq!(groups[0].avg_active_hours, 22);
        // "noise" has exactly 10 appearances and is excluded
        assert_eq!(groups[2].count, 1);
    }
}
