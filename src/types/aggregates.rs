//! Grouped aggregate rows
//!
//! Built fresh per request by the grouping layer and consumed by exactly one
//! derivation function. None of these outlive the request.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Per-device aggregate over the requested window.
///
/// `min_rssi <= avg_rssi <= max_rssi` and `active_hours <= 24 * days_active`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceAggregate {
    pub fingerprint: String,
    pub appearance_count: u64,
    /// Distinct calendar days with at least one observation
    pub days_active: u32,
    /// Distinct hours of the day with at least one observation
    pub active_hours: u32,
    pub avg_rssi: f64,
    pub min_rssi: i32,
    pub max_rssi: i32,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    /// First non-empty manufacturer label seen for the device
    pub manufacturer: Option<String>,
    /// Distinct services, first-encountered order
    pub services: Vec<String>,
}

/// Per time bucket (calendar hour or minute) aggregate.
///
/// `active_devices <= transmission_count`. Rate metrics require
/// `active_devices > 0`; derivation functions skip rows that violate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBucketAggregate {
    /// `YYYY-MM-DD HH:00` for hours, `YYYY-MM-DD HH:MM` for minutes
    pub bucket_key: String,
    pub transmission_count: u64,
    pub active_devices: u64,
    pub avg_rssi: f64,
    pub min_rssi: i32,
    pub max_rssi: i32,
    /// Distinct advertised service sets in the bucket
    #[serde(default)]
    pub unique_services: u64,
}

/// Per-manufacturer aggregate. Absent labels are grouped under "Unknown".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManufacturerAggregate {
    pub manufacturer_label: String,
    pub device_count: u64,
    pub avg_signal_strength: f64,
    pub total_appearances: u64,
    pub days_seen: u32,
    /// Distinct services, first-encountered order
    pub services: Vec<String>,
}

/// One device on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDayAggregate {
    pub fingerprint: String,
    pub date: NaiveDate,
    pub appearances: u64,
    /// Distinct hours of that day with an observation
    pub active_hours: u32,
}

/// Distinct devices seen in one (weekday, hour) cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayHourAggregate {
    /// 0 = Sunday .. 6 = Saturday
    pub weekday: u32,
    pub hour: u32,
    pub devices: u64,
}
