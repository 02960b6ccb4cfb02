//! Derived, dashboard-ready metric records
//!
//! Plain serializable outputs of the derivation layer. The HTTP layer wraps
//! them in its envelope; nothing here knows about the wire format.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Classification
// ============================================================================

/// Behavioural category of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeviceCategory {
    Permanent,
    Regular,
    Frequent,
    Occasional,
}

impl DeviceCategory {
    /// Display order used by the behaviour summary.
    pub const ALL: [Self; 4] = [
        Self::Permanent,
        Self::Regular,
        Self::Frequent,
        Self::Occasional,
    ];
}

impl std::fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Permanent => write!(f, "Permanent"),
            Self::Regular => write!(f, "Regular"),
            Self::Frequent => write!(f, "Frequent"),
            Self::Occasional => write!(f, "Occasional"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalStats {
    pub avg_rssi: f64,
    pub min_rssi: i32,
    pub max_rssi: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceStats {
    pub days_active: u32,
    pub total_hours: u32,
}

/// Row of the device details table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDetail {
    pub fingerprint: String,
    pub category: DeviceCategory,
    pub manufacturer: String,
    pub services: Vec<String>,
    pub signal_stats: SignalStats,
    pub presence_stats: PresenceStats,
}

/// Devices of one category in the behaviour pie chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviourGroup {
    pub category: DeviceCategory,
    pub count: u64,
    pub avg_appearances: u64,
    pub avg_active_hours: u64,
}

// ============================================================================
// Signal
// ============================================================================

/// One point of the propagation scatter plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationPoint {
    pub fingerprint: String,
    /// Estimated distance (m)
    pub distance_m: f64,
    /// tx power - rssi (dB)
    pub path_loss_db: i32,
    pub rssi: i32,
    pub tx_power: i32,
}

/// Per-device signal ranking with a live distance estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RssiRanking {
    pub fingerprint: String,
    pub avg_rssi: f64,
    pub min_rssi: i32,
    pub max_rssi: i32,
    pub estimated_distance_m: f64,
    pub distance_label: String,
}

// ============================================================================
// Interference & channel load
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterferenceRecord {
    pub time_block: String,
    pub avg_rssi: f64,
    pub device_count: u64,
    pub signal_range: i32,
    pub reading_density: f64,
    /// Always within 0..=100
    pub interference_score: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for LoadLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelLoadRecord {
    pub time_block: String,
    pub transmission_count: u64,
    pub active_devices: u64,
    pub transmissions_per_device: f64,
    pub channel_load_factor: f64,
    pub avg_signal_strength: f64,
    pub unique_services: u64,
    pub load_level: LoadLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelLoadSummary {
    pub average_channel_load: f64,
    pub peak_utilisation: f64,
    /// Mean active devices per bucket, rounded
    pub device_density: u64,
    pub time_blocks: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelUtilisation {
    pub buckets: Vec<ChannelLoadRecord>,
    pub summary: ChannelLoadSummary,
}

// ============================================================================
// Dwell & presence
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DwellBucket {
    #[serde(rename = "0-5")]
    UpTo5,
    #[serde(rename = "6-15")]
    UpTo15,
    #[serde(rename = "16-30")]
    UpTo30,
    #[serde(rename = "31-60")]
    UpTo60,
    #[serde(rename = "60+")]
    Over60,
}

impl DwellBucket {
    /// Buckets in order of increasing minimum dwell time.
    pub const ALL: [Self; 5] = [
        Self::UpTo5,
        Self::UpTo15,
        Self::UpTo30,
        Self::UpTo60,
        Self::Over60,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::UpTo5 => "0-5",
            Self::UpTo15 => "6-15",
            Self::UpTo30 => "16-30",
            Self::UpTo60 => "31-60",
            Self::Over60 => "60+",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DwellCount {
    pub time_range: DwellBucket,
    pub device_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceDay {
    pub date: NaiveDate,
    pub unique_devices: u64,
    pub avg_appearances: f64,
    pub avg_active_hours: f64,
}

// ============================================================================
// Manufacturers
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManufacturerRecord {
    pub manufacturer: String,
    pub device_count: u64,
    pub avg_signal_strength: f64,
    pub services: Vec<String>,
    pub total_appearances: u64,
    pub days_active: u32,
    pub appearances_per_device: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCount {
    pub service: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManufacturerSummary {
    pub total_manufacturers: usize,
    pub total_devices: u64,
    pub average_signal_strength: f64,
    pub most_common_services: Vec<ServiceCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManufacturerReport {
    pub manufacturers: Vec<ManufacturerRecord>,
    pub summary: ManufacturerSummary,
}

// ============================================================================
// Activity & overview
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapCell {
    /// Hour of day (x axis)
    pub x: u32,
    /// Weekday, 0 = Sunday (y axis)
    pub y: u32,
    pub devices: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakUsageRecord {
    pub minute_block: String,
    pub scan_count: u64,
    pub unique_devices: u64,
    pub avg_signal: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyCount {
    pub hour: u32,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewStats {
    pub total_scans: u64,
    pub unique_devices: u64,
    pub first_scan: Option<DateTime<Utc>>,
    pub last_scan: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentDevice {
    pub fingerprint: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub reading_count: u64,
}

// ============================================================================
// Dashboard summary
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: DeviceCategory,
    pub count: u64,
}

/// Headline figures for the landing page, built from several independent
/// grouped queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub overview: OverviewStats,
    pub categories: Vec<CategoryCount>,
    pub channel_load: ChannelLoadSummary,
    pub manufacturers: ManufacturerSummary,
    /// Bucket with the highest interference score, earliest on ties
    pub peak_interference: Option<InterferenceRecord>,
}
