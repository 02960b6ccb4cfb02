//! Dashboard Configuration Module
//!
//! Server, storage, signal-model and output-limit settings loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. `--config <path>` on the command line
//! 2. `BEACONSCOPE_CONFIG` environment variable (path to TOML file)
//! 3. `beaconscope.toml` in the current working directory
//! 4. Built-in defaults
//!
//! ## Usage
//!
//! Call `config::init()` once at startup, then `config::get()` anywhere:
//!
//! ```ignore
//! config::init(DashboardConfig::load(args.config.as_deref())?);
//! let cap = config::get().limits.peak_minutes;
//! ```

mod dashboard_config;
pub mod defaults;
pub mod validation;

pub use dashboard_config::*;

use std::sync::OnceLock;

/// Global dashboard configuration, initialized once at startup.
static DASHBOARD_CONFIG: OnceLock<DashboardConfig> = OnceLock::new();

/// Initialize the global configuration. Later calls are ignored.
pub fn init(config: DashboardConfig) {
    if DASHBOARD_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Get a reference to the global configuration.
///
/// Falls back to built-in defaults if `init()` has not been called.
pub fn get() -> &'static DashboardConfig {
    DASHBOARD_CONFIG.get_or_init(|| {
        tracing::warn!("config::get() called before config::init(), using defaults");
        DashboardConfig::default()
    })
}

/// Check whether the config has been initialized.
pub fn is_initialized() -> bool {
    DASHBOARD_CONFIG.get().is_some()
}
