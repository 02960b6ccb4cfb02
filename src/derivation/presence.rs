//! Daily presence series
//!
//! From per-device-per-day rows: unique devices, mean daily appearances and
//! mean active hours for every calendar day, oldest first, keeping only the
//! most recent `max_days` days.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use statrs::statistics::Statistics;

use crate::types::{DeviceDayAggregate, PresenceDay};

pub fn presence_series(rows: &[DeviceDayAggregate], max_days: usize) -> Vec<PresenceDay> {
    let mut by_day: BTreeMap<NaiveDate, Vec<&DeviceDayAggregate>> = BTreeMap::new();
    for row in rows {
        by_day.entry(row.date).or_default().push(row);
    }

    let skip = by_day.len().saturating_sub(max_days);

    by_day
        .into_iter()
        .skip(skip)
        .map(|(date, devices)| {
            let appearances: Vec<f64> = devices.iter().map(|d| d.appearances as f64).collect();
            let hours: Vec<f64> = devices.iter().map(|d| f64::from(d.active_hours)).collect();
            PresenceDay {
                date,
                unique_devices: devices.len() as u64,
                avg_appearances: appearances.iter().mean(),
                avg_active_hours: hours.iter().mean(),
            }
        })
        .collect()
}
