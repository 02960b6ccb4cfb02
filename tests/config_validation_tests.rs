//! Config Validation Tests
//!
//! Typo detection for unknown keys and range validation, exercised
//! independently from the server.

use beaconscope::config::validation::{
    known_config_keys, suggest_correction, validate_ranges, validate_unknown_keys,
};
use beaconscope::config::{ConfigError, DashboardConfig};

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_signal_key_warns_with_suggestion() {
    let toml_str = r#"
[signal]
live_path_los_exponent = 3.0
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("live_path_los_exponent"));
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("signal.live_path_loss_exponent"),
        "Should suggest the correct spelling"
    );
}

#[test]
fn typo_in_section_name_warns() {
    let toml_str = r#"
[limit]
peak_minutes = 10
"#;
    let warnings = validate_unknown_keys(toml_str);
    let section = warnings.iter().find(|w| w.field == "limit").unwrap();
    assert_eq!(section.suggestion.as_deref(), Some("limits"));
}

#[test]
fn valid_config_has_no_warnings() {
    let toml_str = r#"
[server]
addr = "127.0.0.1:9000"

[storage]
path = "/var/lib/beaconscope/db"

[signal]
live_path_loss_exponent = 2.7
propagation_path_loss_exponent = 2.5
reference_tx_power_dbm = -59

[limits]
presence_days = 14
hourly_buckets = 72
"#;
    assert!(validate_unknown_keys(toml_str).is_empty());
}

#[test]
fn unknown_keys_are_not_fatal() {
    let config = DashboardConfig::from_toml_str("[limits]\npeak_minuts = 10\n").unwrap();
    assert_eq!(config.limits.peak_minutes, 100, "typo leaves the default in place");
}

#[test]
fn suggestion_requires_close_match() {
    let known = known_config_keys();
    assert_eq!(suggest_correction("server.adr", &known).as_deref(), Some("server.addr"));
    assert!(suggest_correction("telemetry.endpoint", &known).is_none());
}

// ============================================================================
// Range Validation
// ============================================================================

#[test]
fn zero_limit_is_rejected() {
    let err = DashboardConfig::from_toml_str("[limits]\nrssi_ranking = 0\n").unwrap_err();
    match err {
        ConfigError::Validation(errors) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].contains("limits.rssi_ranking"));
        }
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn non_positive_exponent_is_rejected() {
    for n in ["0.0", "-2.0"] {
        let text = format!("[signal]\nlive_path_loss_exponent = {n}\n");
        assert!(
            matches!(DashboardConfig::from_toml_str(&text), Err(ConfigError::Validation(_))),
            "exponent {n} should be rejected"
        );
    }
}

#[test]
fn reference_power_outside_ble_range_is_rejected() {
    let mut config = DashboardConfig::default();
    config.signal.reference_tx_power_dbm = 30;
    let (errors, _) = validate_ranges(&config);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("reference_tx_power_dbm"));
}

#[test]
fn unusual_values_only_warn() {
    let mut config = DashboardConfig::default();
    config.signal.live_path_loss_exponent = 1.2;
    config.limits.presence_days = 500;
    let (errors, warnings) = validate_ranges(&config);
    assert!(errors.is_empty());
    assert_eq!(warnings.len(), 2);
    assert!(config.validate().is_ok());
}

#[test]
fn wrong_value_type_is_parse_error() {
    let err = DashboardConfig::from_toml_str("[limits]\npeak_minutes = \"lots\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_, _)));
}
