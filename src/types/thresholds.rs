//! Classification thresholds, scoring weights and signal constants
//!
//! These are fixed design constants. They are grouped per metric so each can
//! be covered individually by tests.

/// Device behaviour categories (first matching rule wins)
pub mod classification_thresholds {
    /// Distinct active days required for Permanent
    pub const PERMANENT_MIN_DAYS: u32 = 7;
    /// Appearances required for Permanent
    pub const PERMANENT_MIN_APPEARANCES: u64 = 100;
    /// Distinct active days required for Regular
    pub const REGULAR_MIN_DAYS: u32 = 3;
    /// Appearances required for Frequent
    pub const FREQUENT_MIN_APPEARANCES: u64 = 50;
}

/// Interference score weights and normalisers
pub mod interference_weights {
    /// Weight of |avg RSSI| / 100
    pub const AVG_RSSI: f64 = 0.3;
    /// Weight of (max - min RSSI) / 100
    pub const SIGNAL_SPREAD: f64 = 0.3;
    /// Weight of the device density factor
    pub const DEVICE_DENSITY: f64 = 0.2;
    /// Weight of the reading density factor
    pub const READING_DENSITY: f64 = 0.2;

    /// Assumed RSSI span (dBm) used to normalise strength and spread
    pub const RSSI_SPAN_DBM: f64 = 100.0;
    /// Device count at which device density saturates
    pub const DEVICE_DENSITY_SATURATION: f64 = 10.0;
    /// Readings per device at which reading density saturates
    pub const READING_DENSITY_SATURATION: f64 = 100.0;

    pub const SCORE_MIN: i64 = 0;
    pub const SCORE_MAX: i64 = 100;
}

/// Channel load levels (applied to transmissions per device)
pub mod load_thresholds {
    /// Strictly above this is High
    pub const HIGH_TRANSMISSIONS_PER_DEVICE: f64 = 10.0;
    /// Strictly above this is Medium
    pub const MEDIUM_TRANSMISSIONS_PER_DEVICE: f64 = 5.0;
    /// Minutes per bucket used to normalise the load factor
    pub const MINUTES_PER_BUCKET: f64 = 60.0;
}

/// Dwell-time bucket upper bounds (minutes, inclusive)
pub mod dwell_bounds {
    pub const UP_TO_5: f64 = 5.0;
    pub const UP_TO_15: f64 = 15.0;
    pub const UP_TO_30: f64 = 30.0;
    pub const UP_TO_60: f64 = 60.0;
}

/// Signal model constants
pub mod signal_constants {
    use std::ops::RangeInclusive;

    /// Free-space style exponent used for the live distance display
    pub const LIVE_PATH_LOSS_EXPONENT: f64 = 2.7;
    /// Indoor exponent used for propagation / path-loss analysis
    pub const PROPAGATION_PATH_LOSS_EXPONENT: f64 = 2.5;
    /// Assumed 1 m transmit power when an advertisement carries none (dBm)
    pub const REFERENCE_TX_POWER_DBM: i32 = -59;
    /// Plausible advertised tx power range (dBm); 127 means "not available"
    pub const TX_POWER_RANGE_DBM: RangeInclusive<i32> = -127..=20;
    /// Estimates below this are displayed in centimetres
    pub const CENTIMETRE_DISPLAY_BELOW_M: f64 = 1.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interference_weights_sum_to_one() {
        let sum = interference_weights::AVG_RSSI
            + interference_weights::SIGNAL_SPREAD
            + interference_weights::DEVICE_DENSITY
            + interference_weights::READING_DENSITY;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_load_thresholds_ordered() {
        assert!(
            load_thresholds::HIGH_TRANSMISSIONS_PER_DEVICE
                > load_thresholds::MEDIUM_TRANSMISSIONS_PER_DEVICE
        );
    }

    #[test]
    fn test_dwell_bounds_ascending() {
        let bounds = [
            dwell_bounds::UP_TO_5,
            dwell_bounds::UP_TO_15,
            dwell_bounds::UP_TO_30,
            dwell_bounds::UP_TO_60,
        ];
        assert!(bounds.windows(2).all(|w| w[0] < w[1]));
    }
}
