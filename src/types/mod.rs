//! Shared data structures for beacon observation analytics
//!
//! - `observation`: raw advertisements as supplied by the observation store
//! - `aggregates`: grouped rows produced by the grouping layer
//! - `metrics`: derived records returned by the derivation layer
//! - `thresholds`: fixed classification/scoring constants

mod aggregates;
mod metrics;
mod observation;
pub mod thresholds;

pub use aggregates::*;
pub use metrics::*;
pub use observation::*;
pub use thresholds::*;
