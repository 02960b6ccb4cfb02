//! Beacon observation records
//!
//! An [`Observation`] is one advertisement heard by the scanner. Records are
//! supplied by the observation store and never mutated by the derivation layer.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

use super::thresholds::signal_constants;

/// A single received advertisement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Opaque stable device identifier
    pub fingerprint: String,
    pub timestamp: DateTime<Utc>,
    /// Received signal strength (dBm)
    pub rssi: i32,
    /// Advertised transmit power (dBm), when the device includes one
    #[serde(default)]
    pub tx_power_level: Option<i32>,
    /// Advertised service identifiers
    #[serde(default)]
    pub service_uuids: Option<Vec<String>>,
    /// Manufacturer label decoded from the advertisement
    #[serde(default)]
    pub manufacturer_data: Option<String>,
}

impl Observation {
    /// Minimal observation with no optional fields.
    pub fn new(fingerprint: impl Into<String>, timestamp: DateTime<Utc>, rssi: i32) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            timestamp,
            rssi,
            tx_power_level: None,
            service_uuids: None,
            manufacturer_data: None,
        }
    }

    pub fn with_tx_power(mut self, tx_power: i32) -> Self {
        self.tx_power_level = Some(tx_power);
        self
    }

    pub fn with_services<I, S>(mut self, services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.service_uuids = Some(services.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer_data = Some(manufacturer.into());
        self
    }

    /// Services advertised by this observation, empty when absent.
    pub fn services(&self) -> &[String] {
        self.service_uuids.as_deref().unwrap_or(&[])
    }

    /// Normalize optional fields so that malformed values become absent.
    ///
    /// - tx power outside the plausible BLE range (including the 127
    ///   "not available" sentinel) is dropped
    /// - service identifiers are trimmed, non-UUID text is dropped, and an
    ///   empty list becomes `None`
    /// - a blank manufacturer label becomes `None`
    pub fn sanitized(mut self) -> Self {
        if let Some(tx) = self.tx_power_level {
            if !signal_constants::TX_POWER_RANGE_DBM.contains(&tx) {
                tracing::debug!(fingerprint = %self.fingerprint, tx, "Dropping implausible tx power");
                self.tx_power_level = None;
            }
        }

        self.service_uuids = self.service_uuids.take().and_then(|services| {
            let cleaned: Vec<String> = services
                .iter()
                .map(|s| s.trim())
                .filter(|s| {
                    let ok = is_service_uuid(s);
                    if !ok && !s.is_empty() {
                        tracing::debug!(service = %s, "Dropping malformed service identifier");
                    }
                    ok
                })
                .map(str::to_lowercase)
                .collect();
            (!cleaned.is_empty()).then_some(cleaned)
        });

        self.manufacturer_data = self
            .manufacturer_data
            .take()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());

        self
    }
}

fn service_uuid_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^(0x)?([0-9a-f]{4}|[0-9a-f]{8}|[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12})$",
        )
        .unwrap_or_else(|_| unreachable!("service UUID pattern is a valid regex"))
    })
}

/// True for 16-bit, 32-bit or 128-bit UUID text.
pub fn is_service_uuid(s: &str) -> bool {
    service_uuid_regex().is_match(s)
}

/// Errors for raw records that cannot become an [`Observation`] at all.
#[derive(Error, Debug)]
pub enum ObservationError {
    #[error("line {line}: invalid observation JSON: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: empty fingerprint")]
    MissingFingerprint { line: usize },
}

/// Parse one JSON-lines record into a sanitized observation.
pub fn parse_observation_line(line_no: usize, line: &str) -> Result<Observation, ObservationError> {
    let obs: Observation = serde_json::from_str(line).map_err(|source| ObservationError::Json {
        line: line_no,
        source,
    })?;
    if obs.fingerprint.trim().is_empty() {
        return Err(ObservationError::MissingFingerprint { line: line_no });
    }
    Ok(obs.sanitized())
}
