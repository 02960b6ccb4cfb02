//! Config validation: unknown-key detection with Levenshtein suggestions
//! and range checks.
//!
//! Unknown keys are found by walking the raw `toml::Value` tree before serde
//! sees it, since serde silently ignores them. They only ever produce
//! warnings.

use std::collections::HashSet;

use crate::types::thresholds::signal_constants;

use super::DashboardConfig;

/// Maximum edit distance for a "did you mean" suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Every valid dotted key path in `DashboardConfig`.
///
/// Must be kept in step with the structs in `dashboard_config.rs`.
pub fn known_config_keys() -> HashSet<&'static str> {
    [
        // [server]
        "server",
        "server.addr",
        // [storage]
        "storage",
        "storage.path",
        // [signal]
        "signal",
        "signal.live_path_loss_exponent",
        "signal.propagation_path_loss_exponent",
        "signal.reference_tx_power_dbm",
        // [limits]
        "limits",
        "limits.presence_days",
        "limits.manufacturer_rank",
        "limits.top_services",
        "limits.hourly_buckets",
        "limits.peak_minutes",
        "limits.propagation_samples",
        "limits.device_details",
        "limits.behaviour_min_appearances",
        "limits.rssi_ranking",
        "limits.recent_devices",
    ]
    .into_iter()
    .collect()
}

/// Recursively collect dotted key paths from a TOML value.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Closest known key within edit distance 3. Ties go to the alphabetically
/// first key so suggestions are stable.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (levenshtein(unknown, k), k))
        .filter(|(dist, _)| *dist <= MAX_SUGGESTION_DISTANCE)
        .min()
        .map(|(_, k)| k.to_string())
}

// ============================================================================
// Unknown Key Validation
// ============================================================================

/// Warnings for every key in `raw_toml` that the config does not define.
///
/// Unparseable input yields no warnings; serde reports the syntax error.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(),
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Range Validation
// ============================================================================

/// Returns (errors, warnings). Errors are values the derivation layer cannot
/// use; warnings are usable but unusual.
pub fn validate_ranges(config: &DashboardConfig) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let s = &config.signal;
    for (name, n) in [
        ("signal.live_path_loss_exponent", s.live_path_loss_exponent),
        ("signal.propagation_path_loss_exponent", s.propagation_path_loss_exponent),
    ] {
        if !n.is_finite() || n <= 0.0 {
            errors.push(format!("{name} = {n} must be a finite number > 0"));
        } else if !(1.5..=6.0).contains(&n) {
            warnings.push(ValidationWarning {
                field: name.to_string(),
                message: format!("{name} = {n:.2} is outside the typical indoor/outdoor range (1.5-6.0)"),
                suggestion: None,
            });
        }
    }

    if !signal_constants::TX_POWER_RANGE_DBM.contains(&s.reference_tx_power_dbm) {
        errors.push(format!(
            "signal.reference_tx_power_dbm = {} is outside the BLE range ({}..={} dBm)",
            s.reference_tx_power_dbm,
            signal_constants::TX_POWER_RANGE_DBM.start(),
            signal_constants::TX_POWER_RANGE_DBM.end(),
        ));
    }

    let l = &config.limits;
    let limits: [(&str, u64); 10] = [
        ("limits.presence_days", l.presence_days as u64),
        ("limits.manufacturer_rank", l.manufacturer_rank as u64),
        ("limits.top_services", l.top_services as u64),
        ("limits.hourly_buckets", l.hourly_buckets as u64),
        ("limits.peak_minutes", l.peak_minutes as u64),
        ("limits.propagation_samples", l.propagation_samples as u64),
        ("limits.device_details", l.device_details as u64),
        ("limits.behaviour_min_appearances", l.behaviour_min_appearances),
        ("limits.rssi_ranking", l.rssi_ranking as u64),
        ("limits.recent_devices", l.recent_devices as u64),
    ];
    for (name, value) in limits {
        if value == 0 {
            errors.push(format!("{name} must be > 0"));
        }
    }

    if l.presence_days > 366 {
        warnings.push(ValidationWarning {
            field: "limits.presence_days".to_string(),
            message: format!("limits.presence_days = {} spans more than a year", l.presence_days),
            suggestion: None,
        });
    }

    if config.server.addr.trim().is_empty() {
        errors.push("server.addr must not be empty".to_string());
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("limits", "limits"), 0);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
    }

    #[test]
    fn test_typo_suggestion() {
        let warnings = validate_unknown_keys("[limits]\npeak_minute = 10\n");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "limits.peak_minute");
        assert_eq!(warnings[0].suggestion.as_deref(), Some("limits.peak_minutes"));
    }

    #[test]
    fn test_unrelated_key_has_no_suggestion() {
        let warnings = validate_unknown_keys("[completely_unrelated]\n");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].suggestion.is_none());
    }

    #[test]
    fn test_known_keys_produce_no_warnings() {
        let text = DashboardConfig::default().to_toml().unwrap();
        assert!(validate_unknown_keys(&text).is_empty());
    }

    #[test]
    fn test_range_errors() {
        let mut config = DashboardConfig::default();
        config.signal.live_path_loss_exponent = f64::NAN;
        config.signal.reference_tx_power_dbm = 127;
        config.limits.top_services = 0;
        let (errors, _) = validate_ranges(&config);
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_unusual_exponent_is_warning() {
        let mut config = DashboardConfig::default();
        config.signal.propagation_path_loss_exponent = 8.0;
        let (errors, warnings) = validate_ranges(&config);
        assert!(errors.is_empty());
        assert_eq!(warnings.len(), 1);
    }
}
