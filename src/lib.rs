//! beaconscope: BLE beacon observation analytics
//!
//! Turns raw beacon advertisements into the labelled, bounded records a
//! monitoring dashboard renders.
//!
//! ## Architecture
//!
//! - **Storage**: pluggable [`storage::ObservationSource`] (sled on disk, in-memory for tests)
//! - **Grouping**: [`grouping::GroupingAdapter`] builds per-device, per-bucket and per-manufacturer rows
//! - **Derivation**: pure transforms from grouped rows to dashboard records
//! - **API**: axum handlers wrapping each derivation in a JSON envelope

pub mod api;
pub mod config;
pub mod derivation;
pub mod grouping;
pub mod storage;
pub mod types;

// Re-export configuration
pub use config::DashboardConfig;

// Re-export commonly used types
pub use types::{
    DeviceAggregate, DeviceCategory, ManufacturerAggregate, Observation, TimeBucketAggregate,
};

// Re-export storage
pub use storage::{InMemorySource, ObservationSource, SledObservationStore, SourceError, TimeWindow};

// Re-export grouping
pub use grouping::GroupingAdapter;
