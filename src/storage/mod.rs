//! Observation storage
//!
//! Read-side access to stored beacon observations. The derivation layer never
//! talks to storage directly; it receives grouped rows from
//! [`crate::grouping::GroupingAdapter`], which sits on top of a
//! [`ObservationSource`].

mod sled_store;
pub mod source;

pub use sled_store::SledObservationStore;
pub use source::{InMemorySource, ObservationSource, SourceError, TimeWindow, UnavailableSource};
