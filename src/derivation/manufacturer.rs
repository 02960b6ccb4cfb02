//! Manufacturer ranking and service summary

use std::collections::HashMap;

use statrs::statistics::Statistics;

use crate::types::{
    ManufacturerAggregate, ManufacturerRecord, ManufacturerReport, ManufacturerSummary, ServiceCount,
};

use super::round_to;

/// Rank manufacturers by device count then (rounded) mean signal strength,
/// both descending, keep the top `rank_limit`, and summarise them.
///
/// Rows with no devices are skipped since appearances-per-device is undefined.
pub fn manufacturer_report(
    aggregates: &[ManufacturerAggregate],
    rank_limit: usize,
    top_services: usize,
) -> ManufacturerReport {
    let mut records: Vec<ManufacturerRecord> = aggregates
        .iter()
        .filter(|m| m.device_count > 0)
        .map(|m| ManufacturerRecord {
            manufacturer: m.manufacturer_label.clone(),
            device_count: m.device_count,
            avg_signal_strength: round_to(m.avg_signal_strength, 1),
            services: m.services.clone(),
            total_appearances: m.total_appearances,
            days_active: m.days_seen,
            appearances_per_device: round_to(
                m.total_appearances as f64 / m.device_count as f64,
                1,
            ),
        })
        .collect();

    // Stable: equal keys keep the input order
    records.sort_by(|a, b| {
        b.device_count
            .cmp(&a.device_count)
            .then_with(|| b.avg_signal_strength.total_cmp(&a.avg_signal_strength))
    });
    records.truncate(rank_limit);

    let summary = summarize(&records, top_services);
    ManufacturerReport {
        manufacturers: records,
        summary,
    }
}

fn summarize(records: &[ManufacturerRecord], top_services: usize) -> ManufacturerSummary {
    let average_signal_strength = if records.is_empty() {
        0.0
    } else {
        records.iter().map(|r| r.avg_signal_strength).mean()
    };

    ManufacturerSummary {
        total_manufacturers: records.len(),
        total_devices: records.iter().map(|r| r.device_count).sum(),
        average_signal_strength,
        most_common_services: most_common_services(records, top_services),
    }
}

/// Services ordered by how many manufacturers advertise them.
///
/// Ties keep first-encountered order.
pub fn most_common_services(records: &[ManufacturerRecord], limit: usize) -> Vec<ServiceCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<ServiceCount> = Vec::new();

    for service in records.iter().flat_map(|r| r.services.iter()) {
        let service = service.trim();
        if service.is_empty() {
            continue;
        }
        match index.get(service) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(service, counts.len());
                counts.push(ServiceCount {
                    service: service.to_string(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}
