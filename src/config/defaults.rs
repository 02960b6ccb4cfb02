//! Built-in configuration defaults.
//!
//! Every value here can be overridden from `beaconscope.toml`. Constants that
//! are not operator-tunable (classification, load and interference thresholds)
//! live in `types::thresholds` instead.

use crate::types::thresholds::signal_constants;

// ============================================================================
// Server
// ============================================================================

/// HTTP bind address.
pub const SERVER_ADDR: &str = "0.0.0.0:8080";

// ============================================================================
// Storage
// ============================================================================

/// Sled database directory for stored observations.
pub const STORAGE_PATH: &str = "./data/observations.db";

// ============================================================================
// Signal model
// ============================================================================

/// Path-loss exponent for the live RSSI distance display.
pub const LIVE_PATH_LOSS_EXPONENT: f64 = signal_constants::LIVE_PATH_LOSS_EXPONENT;

/// Path-loss exponent for propagation analysis over advertised tx power.
pub const PROPAGATION_PATH_LOSS_EXPONENT: f64 = signal_constants::PROPAGATION_PATH_LOSS_EXPONENT;

/// Assumed 1 m transmit power when a device does not advertise one (dBm).
pub const REFERENCE_TX_POWER_DBM: i32 = signal_constants::REFERENCE_TX_POWER_DBM;

// ============================================================================
// Output limits
// ============================================================================

/// Calendar days kept in the presence series (most recent).
pub const PRESENCE_DAYS: usize = 30;

/// Manufacturers kept in the ranking.
pub const MANUFACTURER_RANK: usize = 20;

/// Services listed in the manufacturer summary.
pub const TOP_SERVICES: usize = 5;

/// Hourly buckets for channel utilisation and interference. 168 = one week.
pub const HOURLY_BUCKETS: usize = 168;

/// Minute buckets returned by the peak-usage view.
pub const PEAK_MINUTES: usize = 100;

/// Observations returned by propagation analysis.
pub const PROPAGATION_SAMPLES: usize = 1_000;

/// Devices in the details table.
pub const DEVICE_DETAILS: usize = 50;

/// Behaviour summary only counts devices with more appearances than this.
pub const BEHAVIOUR_MIN_APPEARANCES: u64 = 10;

/// Devices in the RSSI ranking.
pub const RSSI_RANKING: usize = 20;

/// Devices in the recently-seen list.
pub const RECENT_DEVICES: usize = 50;
