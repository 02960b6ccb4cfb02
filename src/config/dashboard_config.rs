//! Dashboard configuration loaded from TOML
//!
//! All fields have serde defaults, so a partial file (or none at all) yields
//! a working configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "BEACONSCOPE_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "beaconscope.toml";

/// Top-level dashboard configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Observation store
    #[serde(default)]
    pub storage: StorageConfig,

    /// Distance model parameters
    #[serde(default)]
    pub signal: SignalConfig,

    /// Output caps for each view
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl DashboardConfig {
    /// Load configuration using the standard search order:
    /// 1. `explicit` path (the `--config` flag)
    /// 2. `$BEACONSCOPE_CONFIG`
    /// 3. `./beaconscope.toml`
    /// 4. Built-in defaults
    ///
    /// An explicit path that fails to load is an error; the other sources
    /// fall back with a warning.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            let config = Self::load_from_file(path)?;
            info!(path = %path.display(), "Loaded config from --config");
            return Ok(config);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from {}", CONFIG_ENV_VAR);
                        return Ok(config);
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./{}", LOCAL_CONFIG_FILE);
                    return Ok(config);
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Ok(Self::default())
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, err) => ConfigError::Parse(path.to_path_buf(), err),
            other => other,
        })
    }

    /// Parse and validate TOML text. Unknown keys are logged, never fatal.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Reject values the derivation layer cannot work with.
    ///
    /// Suspicious but usable values are logged as warnings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (errors, warnings) = super::validation::validate_ranges(self);
        for w in &warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({path}): {err}", path = .0.display(), err = .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config parse error ({path}): {err}", path = .0.display(), err = .1)]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[source] toml::ser::Error),

    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Sections
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server bind address.
    ///
    /// Can be overridden by `BEACONSCOPE_SERVER_ADDR` env var or `--addr` CLI flag.
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

fn default_server_addr() -> String {
    defaults::SERVER_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Sled database directory. Overridden by `--db`.
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(defaults::STORAGE_PATH)
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

/// Log-distance path-loss model parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalConfig {
    #[serde(default = "default_live_exponent")]
    pub live_path_loss_exponent: f64,
    #[serde(default = "default_propagation_exponent")]
    pub propagation_path_loss_exponent: f64,
    /// Used for the live distance display, which has no per-device tx power.
    #[serde(default = "default_reference_tx_power")]
    pub reference_tx_power_dbm: i32,
}

fn default_live_exponent() -> f64 { defaults::LIVE_PATH_LOSS_EXPONENT }
fn default_propagation_exponent() -> f64 { defaults::PROPAGATION_PATH_LOSS_EXPONENT }
fn default_reference_tx_power() -> i32 { defaults::REFERENCE_TX_POWER_DBM }

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            live_path_loss_exponent: default_live_exponent(),
            propagation_path_loss_exponent: default_propagation_exponent(),
            reference_tx_power_dbm: default_reference_tx_power(),
        }
    }
}

/// Output caps for each dashboard view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_presence_days")]
    pub presence_days: usize,
    #[serde(default = "default_manufacturer_rank")]
    pub manufacturer_rank: usize,
    #[serde(default = "default_top_services")]
    pub top_services: usize,
    #[serde(default = "default_hourly_buckets")]
    pub hourly_buckets: usize,
    #[serde(default = "default_peak_minutes")]
    pub peak_minutes: usize,
    #[serde(default = "default_propagation_samples")]
    pub propagation_samples: usize,
    #[serde(default = "default_device_details")]
    pub device_details: usize,
    #[serde(default = "default_behaviour_min_appearances")]
    pub behaviour_min_appearances: u64,
    #[serde(default = "default_rssi_ranking")]
    pub rssi_ranking: usize,
    #[serde(default = "default_recent_devices")]
    pub recent_devices: usize,
}

fn default_presence_days() -> usize { defaults::PRESENCE_DAYS }
fn default_manufacturer_rank() -> usize { defaults::MANUFACTURER_RANK }
fn default_top_services() -> usize { defaults::TOP_SERVICES }
fn default_hourly_buckets() -> usize { defaults::HOURLY_BUCKETS }
fn default_peak_minutes() -> usize { defaults::PEAK_MINUTES }
fn default_propagation_samples() -> usize { defaults::PROPAGATION_SAMPLES }
fn default_device_details() -> usize { defaults::DEVICE_DETAILS }
fn default_behaviour_min_appearances() -> u64 { defaults::BEHAVIOUR_MIN_APPEARANCES }
fn default_rssi_ranking() -> usize { defaults::RSSI_RANKING }
fn default_recent_devices() -> usize { defaults::RECENT_DEVICES }

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            presence_days: default_presence_days(),
            manufacturer_rank: default_manufacturer_rank(),
            top_services: default_top_services(),
            hourly_buckets: default_hourly_buckets(),
            peak_minutes: default_peak_minutes(),
            propagation_samples: default_propagation_samples(),
            device_details: default_device_details(),
            behaviour_min_appearances: default_behaviour_min_appearances(),
            rssi_ranking: default_rssi_ranking(),
            recent_devices: default_recent_devices(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = DashboardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.addr, "0.0.0.0:8080");
        assert_eq!(config.limits.hourly_buckets, 168);
        assert_eq!(config.signal.reference_tx_power_dbm, -59);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = DashboardConfig::from_toml_str(
            r#"
            [signal]
            live_path_loss_exponent = 3.0

            [limits]
            peak_minutes = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.signal.live_path_loss_exponent, 3.0);
        assert_eq!(config.signal.propagation_path_loss_exponent, 2.5);
        assert_eq!(config.limits.peak_minutes, 10);
        assert_eq!(config.limits.presence_days, 30);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = DashboardConfig::from_toml_str("[signal]\npropagation_path_loss_exponent = 0.0\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_parse_error_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[limits\npeak_minutes = ").unwrap();
        let err = DashboardConfig::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = DashboardConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(DashboardConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let err = DashboardConfig::load(Some(Path::new("/nonexistent/beaconscope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_, _)));
        assert!(std::error::Error::source(&err).is_some(), "I/O cause is chained");
        assert!(err.to_string().contains("/nonexistent/beaconscope.toml"));
    }

    #[test]
    fn test_validation_error_lists_every_problem() {
        let err = DashboardConfig::from_toml_str("[limits]
peak_minutes = 0
rssi_ranking = 0
")
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("limits.peak_minutes"));
        assert!(message.contains("limits.rssi_ranking"));
    }
}
