//! Sled-backed observation store
//!
//! Key: order-preserving timestamp nanoseconds (8 bytes, big-endian) followed
//! by a sled-generated id (8 bytes), so iteration is chronological and
//! simultaneous observations never collide.
//! Value: JSON-serialized `Observation`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;

use super::source::{ObservationSource, SourceError, TimeWindow};
use crate::types::Observation;

/// On-disk observation store
#[derive(Clone)]
pub struct SledObservationStore {
    db: Arc<sled::Db>,
}

fn encode_ts(ts: DateTime<Utc>) -> [u8; 8] {
    // Out-of-range instants (beyond ~year 2262) clamp to the extremes
    let nanos = ts
        .timestamp_nanos_opt()
        .unwrap_or(if ts.timestamp() < 0 { i64::MIN } else { i64::MAX });
    // Flip the sign bit so negative timestamps sort before positive ones
    ((nanos as u64) ^ (1 << 63)).to_be_bytes()
}

fn key_bound(ts: DateTime<Utc>, fill: u8) -> [u8; 16] {
    let mut key = [fill; 16];
    key[..8].copy_from_slice(&encode_ts(ts));
    key
}

impl SledObservationStore {
    /// Open or create the store at the specified path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path_ref = path.as_ref();
        let db = sled::open(path_ref)?;
        tracing::info!(path = %path_ref.display(), records = db.len(), "Observation store opened");
        Ok(Self { db: Arc::new(db) })
    }

    /// Store one observation.
    pub fn insert(&self, observation: &Observation) -> Result<(), SourceError> {
        let key = self.next_key(observation.timestamp)?;
        let value = serde_json::to_vec(observation)?;
        self.db.insert(key, value)?;
        Ok(())
    }

    /// Store a batch atomically and flush. Returns the number written.
    pub fn insert_batch(&self, observations: &[Observation]) -> Result<usize, SourceError> {
        let mut batch = sled::Batch::default();
        for obs in observations {
            let key = self.next_key(obs.timestamp)?;
            batch.insert(&key[..], serde_json::to_vec(obs)?);
        }
        self.db.apply_batch(batch)?;
        self.db.flush()?;
        Ok(observations.len())
    }

    fn next_key(&self, ts: DateTime<Utc>) -> Result<[u8; 16], SourceError> {
        let id = self.db.generate_id()?;
        let mut key = [0u8; 16];
        key[..8].copy_from_slice(&encode_ts(ts));
        key[8..].copy_from_slice(&id.to_be_bytes());
        Ok(key)
    }

    /// Get total number of stored observations
    pub fn count(&self) -> usize {
        self.db.len()
    }

    /// Get database size in bytes
    pub fn size_bytes(&self) -> u64 {
        self.db.size_on_disk().unwrap_or(0)
    }

    /// Blocking scan of the window. Undecodable records are skipped.
    fn scan(db: &sled::Db, window: &TimeWindow) -> Result<Vec<Observation>, SourceError> {
        if window.is_inverted() {
            return Ok(Vec::new());
        }

        let iter = match (window.since, window.until) {
            (Some(s), Some(u)) => db.range(key_bound(s, 0x00)..=key_bound(u, 0xff)),
            (Some(s), None) => db.range(key_bound(s, 0x00)..),
            (None, Some(u)) => db.range(..=key_bound(u, 0xff)),
            (None, None) => db.iter(),
        };

        let mut observations = Vec::new();
        let mut skipped = 0usize;
        for item in iter {
            let (_key, value) = item?;
            match serde_json::from_slice::<Observation>(&value) {
                Ok(obs) => observations.push(obs),
                Err(e) => {
                    skipped += 1;
                    tracing::warn!("Failed to deserialize stored observation: {}", e);
                }
            }
        }

        if skipped > 0 {
            tracing::warn!(skipped, "Skipped undecodable observations");
        }
        Ok(observations)
    }
}

#[async_trait]
impl ObservationSource for SledObservationStore {
    async fn observations(&self, window: &TimeWindow) -> Result<Vec<Observation>, SourceError> {
        let db = Arc::clone(&self.db);
        let window = *window;
        let observations = tokio::task::spawn_blocking(move || Self::scan(&db, &window))
            .await
            .map_err(|e| SourceError::DataUnavailable(format!("scan task failed: {e}")))??;

        tracing::debug!(count = observations.len(), "Loaded observations from sled");
        Ok(observations)
    }

    fn backend_name(&self) -> &'static str {
        "Sled"
    }
}
