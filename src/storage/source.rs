//! ObservationSource trait - pluggable observation backend
//!
//! Abstracts where observations come from so the grouping layer and the
//! HTTP handlers never depend on a concrete store:
//! - `InMemorySource`: vector-backed, for tests and the simulator
//! - `SledObservationStore`: on-disk store used by the server

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Observation;

/// Optional inclusive time bounds applied to every query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,
    #[serde(default)]
    pub until: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// Unbounded window.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        Self {
            since: Some(since),
            until: Some(until),
        }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.since.map_or(true, |s| ts >= s) && self.until.map_or(true, |u| ts <= u)
    }

    /// True when `since` is after `until`, which can never match anything.
    pub fn is_inverted(&self) -> bool {
        matches!((self.since, self.until), (Some(s), Some(u)) if s > u)
    }
}

/// Trait for observation backends
///
/// Implementations must be thread-safe (Send + Sync) for shared access
/// across request handlers.
#[async_trait]
pub trait ObservationSource: Send + Sync {
    /// Observations inside `window`, in ascending timestamp order.
    async fn observations(&self, window: &TimeWindow) -> Result<Vec<Observation>, SourceError>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// Source errors
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The backend cannot supply rows. Passed upward unchanged.
    #[error("data unavailable: {0}")]
    DataUnavailable(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<sled::Error> for SourceError {
    fn from(err: sled::Error) -> Self {
        SourceError::DataUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Serialization(err.to_string())
    }
}

/// In-memory observations for tests and minimal deployments
///
/// Thread-safe via `RwLock`. Not durable.
pub struct InMemorySource {
    observations: std::sync::RwLock<Vec<Observation>>,
}

impl InMemorySource {
    /// Create a source holding `observations`, sorted by timestamp.
    pub fn new(mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|o| o.timestamp);
        Self {
            observations: std::sync::RwLock::new(observations),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Append observations, keeping timestamp order.
    pub fn extend(&self, more: impl IntoIterator<Item = Observation>) -> Result<(), SourceError> {
        let mut store = self
            .observations
            .write()
            .map_err(|e| SourceError::DataUnavailable(e.to_string()))?;
        store.extend(more);
        store.sort_by_key(|o| o.timestamp);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.observations.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemorySource {
    fn default() -> Self {
        Self::empty()
    }
}

#[async_trait]
impl ObservationSource for InMemorySource {
    async fn observations(&self, window: &TimeWindow) -> Result<Vec<Observation>, SourceError> {
        let store = self
            .observations
            .read()
            .map_err(|e| SourceError::DataUnavailable(e.to_string()))?;

        Ok(store
            .iter()
            .filter(|o| window.contains(o.timestamp))
            .cloned()
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "InMemory"
    }
}

/// Source that always fails, for exercising the DataUnavailable path.
pub struct UnavailableSource {
    reason: String,
}

impl UnavailableSource {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ObservationSource for UnavailableSource {
    async fn observations(&self, _window: &TimeWindow) -> Result<Vec<Observation>, SourceError> {
        Err(SourceError::DataUnavailable(self.reason.clone()))
    }

    fn backend_name(&self) -> &'static str {
        "Unavailable"
    }
}
