//! Derivation layer
//!
//! Pure, stateless transforms from grouped aggregate rows to labelled,
//! bounded, dashboard-ready records. No I/O, no shared state: the same input
//! always produces bit-identical output.
//!
//! ## Core metrics
//! - `estimate_distance()` - log-distance path-loss model
//! - `classify()` - Permanent / Regular / Frequent / Occasional
//! - `interference_score()` - bounded 0-100 score per hourly bucket
//! - `channel_utilisation()` - per-bucket load plus summary
//! - `dwell_distribution()` - device counts per dwell-time range
//! - `presence_series()` - daily unique devices and activity
//! - `manufacturer_report()` - manufacturer ranking and service summary
//!
//! ## Degenerate input
//! Rows whose denominator would be zero (`active_devices == 0`, devices with
//! no dwell span, manufacturers with no devices) are dropped locally instead
//! of producing NaN or infinity.

pub mod activity;
pub mod channel_load;
pub mod classifier;
pub mod dwell;
pub mod interference;
pub mod manufacturer;
pub mod presence;
pub mod signal;
pub mod summary;

pub use activity::{activity_heatmap, hourly_histogram, overview, peak_usage, recent_devices};
pub use channel_load::{channel_load, channel_utilisation, load_level};
pub use classifier::{behaviour_summary, classify, device_details};
pub use dwell::{dwell_bucket, dwell_distribution, dwell_minutes};
pub use interference::{interference_score, interference_series};
pub use manufacturer::{manufacturer_report, most_common_services};
pub use presence::presence_series;
pub use signal::{estimate_distance, format_distance, path_loss, propagation_points, rssi_ranking};
pub use summary::{category_counts, dashboard_summary, overview_from_devices};

/// Label used when an observation carries no manufacturer data.
pub const UNKNOWN_MANUFACTURER: &str = "Unknown";

/// Round half away from zero to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
