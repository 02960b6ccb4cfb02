//! Pure grouping of raw observations into aggregate rows
//!
//! Every function takes a slice of observations (already narrowed to the
//! requested window) and returns rows in a deterministic order. Day and hour
//! boundaries are UTC.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};

use crate::derivation::UNKNOWN_MANUFACTURER;
use crate::types::{
    DeviceAggregate, DeviceDayAggregate, HourlyCount, ManufacturerAggregate, Observation,
    TimeBucketAggregate, WeekdayHourAggregate,
};

/// Width of a calendar time bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketWidth {
    Hour,
    Minute,
}

impl BucketWidth {
    /// Bucket key for `ts`. Keys sort chronologically as strings.
    pub fn key(self, ts: DateTime<Utc>) -> String {
        match self {
            BucketWidth::Hour => ts.format("%Y-%m-%d %H:00").to_string(),
            BucketWidth::Minute => ts.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Running min/max/sum over RSSI readings.
#[derive(Debug, Clone, Copy)]
struct RssiAcc {
    count: u64,
    sum: i64,
    min: i32,
    max: i32,
}

impl RssiAcc {
    fn new(rssi: i32) -> Self {
        Self {
            count: 1,
            sum: i64::from(rssi),
            min: rssi,
            max: rssi,
        }
    }

    fn push(&mut self, rssi: i32) {
        self.count += 1;
        self.sum += i64::from(rssi);
        self.min = self.min.min(rssi);
        self.max = self.max.max(rssi);
    }

    fn mean(&self) -> f64 {
        self.sum as f64 / self.count as f64
    }
}

fn push_distinct(list: &mut Vec<String>, services: &[String]) {
    for s in services {
        if !s.is_empty() && !list.contains(s) {
            list.push(s.clone());
        }
    }
}

fn manufacturer_label(obs: &Observation) -> Option<&str> {
    obs.manufacturer_data
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
}

struct DeviceAcc {
    rssi: RssiAcc,
    days: BTreeSet<NaiveDate>,
    hours: BTreeSet<u32>,
    first_seen: DateTime<Utc>,
    last_seen: DateTime<Utc>,
    manufacturer: Option<String>,
    services: Vec<String>,
}

/// One row per fingerprint, ordered by fingerprint.
pub fn device_aggregates(observations: &[Observation]) -> Vec<DeviceAggregate> {
    let mut devices: BTreeMap<&str, DeviceAcc> = BTreeMap::new();

    for obs in observations {
        let acc = devices
            .entry(obs.fingerprint.as_str())
            .and_modify(|acc| {
                acc.rssi.push(obs.rssi);
                acc.first_seen = acc.first_seen.min(obs.timestamp);
                acc.last_seen = acc.last_seen.max(obs.timestamp);
            })
            .or_insert_with(|| DeviceAcc {
                rssi: RssiAcc::new(obs.rssi),
                days: BTreeSet::new(),
                hours: BTreeSet::new(),
                first_seen: obs.timestamp,
                last_seen: obs.timestamp,
                manufacturer: None,
                services: Vec::new(),
            });

        acc.days.insert(obs.timestamp.date_naive());
        acc.hours.insert(obs.timestamp.hour());
        if acc.manufacturer.is_none() {
            acc.manufacturer = manufacturer_label(obs).map(str::to_string);
        }
        push_distinct(&mut acc.services, obs.services());
    }

    devices
        .into_iter()
        .map(|(fingerprint, acc)| DeviceAggregate {
            fingerprint: fingerprint.to_string(),
            appearance_count: acc.rssi.count,
            days_active: acc.days.len() as u32,
            active_hours: acc.hours.len() as u32,
            avg_rssi: acc.rssi.mean(),
            min_rssi: acc.rssi.min,
            max_rssi: acc.rssi.max,
            first_seen: acc.first_seen,
            last_seen: acc.last_seen,
            manufacturer: acc.manufacturer,
            services: acc.services,
        })
        .collect()
}

/// One row per non-empty bucket, ascending by key.
pub fn time_buckets(observations: &[Observation], width: BucketWidth) -> Vec<TimeBucketAggregate> {
    let mut buckets: BTreeMap<String, (RssiAcc, HashSet<&str>, HashSet<String>)> = BTreeMap::new();

    for obs in observations {
        let key = width.key(obs.timestamp);
        let (_, devices, service_sets) = buckets
            .entry(key)
            .and_modify(|(acc, _, _)| acc.push(obs.rssi))
            .or_insert_with(|| (RssiAcc::new(obs.rssi), HashSet::new(), HashSet::new()));

        devices.insert(obs.fingerprint.as_str());
        let services = obs.services();
        if !services.is_empty() {
            service_sets.insert(services.join(","));
        }
    }

    buckets
        .into_iter()
        .map(|(bucket_key, (rssi, devices, service_sets))| TimeBucketAggregate {
            bucket_key,
            transmission_count: rssi.count,
            active_devices: devices.len() as u64,
            avg_rssi: rssi.mean(),
            min_rssi: rssi.min,
            max_rssi: rssi.max,
            unique_services: service_sets.len() as u64,
        })
        .collect()
}

pub fn hourly_buckets(observations: &[Observation]) -> Vec<TimeBucketAggregate> {
    time_buckets(observations, BucketWidth::Hour)
}

pub fn minute_buckets(observations: &[Observation]) -> Vec<TimeBucketAggregate> {
    time_buckets(observations, BucketWidth::Minute)
}

struct ManufacturerAcc<'a> {
    rssi: RssiAcc,
    devices: HashSet<&'a str>,
    days: HashSet<NaiveDate>,
    services: Vec<String>,
}

/// One row per manufacturer label, ordered by label. Observations without a
/// label are grouped under "Unknown".
pub fn manufacturer_aggregates(observations: &[Observation]) -> Vec<ManufacturerAggregate> {
    let mut groups: BTreeMap<&str, ManufacturerAcc> = BTreeMap::new();

    for obs in observations {
        let label = manufacturer_label(obs).unwrap_or(UNKNOWN_MANUFACTURER);
        let acc = groups
            .entry(label)
            .and_modify(|acc| acc.rssi.push(obs.rssi))
            .or_insert_with(|| ManufacturerAcc {
                rssi: RssiAcc::new(obs.rssi),
                devices: HashSet::new(),
                days: HashSet::new(),
                services: Vec::new(),
            });

        acc.devices.insert(obs.fingerprint.as_str());
        acc.days.insert(obs.timestamp.date_naive());
        push_distinct(&mut acc.services, obs.services());
    }

    groups
        .into_iter()
        .map(|(label, acc)| ManufacturerAggregate {
            manufacturer_label: label.to_string(),
            device_count: acc.devices.len() as u64,
            avg_signal_strength: acc.rssi.mean(),
            total_appearances: acc.rssi.count,
            days_seen: acc.days.len() as u32,
            services: acc.services,
        })
        .collect()
}

/// One row per (device, calendar day), ordered by fingerprint then date.
pub fn device_days(observations: &[Observation]) -> Vec<DeviceDayAggregate> {
    let mut rows: BTreeMap<(&str, NaiveDate), (u64, HashSet<u32>)> = BTreeMap::new();

    for obs in observations {
        let (count, hours) = rows
            .entry((obs.fingerprint.as_str(), obs.timestamp.date_naive()))
            .or_default();
        *count += 1;
        hours.insert(obs.timestamp.hour());
    }

    rows.into_iter()
        .map(|((fingerprint, date), (appearances, hours))| DeviceDayAggregate {
            fingerprint: fingerprint.to_string(),
            date,
            appearances,
            active_hours: hours.len() as u32,
        })
        .collect()
}

/// Distinct devices per (weekday, hour) cell, Sunday = 0. Empty cells are
/// not emitted.
pub fn weekday_hour_presence(observations: &[Observation]) -> Vec<WeekdayHourAggregate> {
    let mut cells: BTreeMap<(u32, u32), HashSet<&str>> = BTreeMap::new();

    for obs in observations {
        let cell = (obs.timestamp.weekday().num_days_from_sunday(), obs.timestamp.hour());
        cells.entry(cell).or_default().insert(obs.fingerprint.as_str());
    }

    cells
        .into_iter()
        .map(|((weekday, hour), devices)| WeekdayHourAggregate {
            weekday,
            hour,
            devices: devices.len() as u64,
        })
        .collect()
}

/// Scan count per hour of day, hours with no scans omitted.
pub fn hour_of_day_counts(observations: &[Observation]) -> Vec<HourlyCount> {
    let mut counts: BTreeMap<u32, u64> = BTreeMap::new();
    for obs in observations {
        *counts.entry(obs.timestamp.hour()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(hour, count)| HourlyCount { hour, count })
        .collect()
}

/// Earliest and latest timestamps, `None` when there are no observations.
pub fn time_range(observations: &[Observation]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let first = observations.iter().map(|o| o.timestamp).min()?;
    let last = observations.iter().map(|o| o.timestamp).max()?;
    Some((first, last))
}

/// Number of distinct fingerprints.
pub fn unique_devices(observations: &[Observation]) -> u64 {
    observations
        .iter()
        .map(|o| o.fingerprint.as_str())
        .collect::<HashSet<_>>()
        .len() as u64
}
