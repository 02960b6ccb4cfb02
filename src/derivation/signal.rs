//! Signal model: log-distance path loss
//!
//! `distance = 10 ^ ((tx_power - rssi) / (10 * n))`
//!
//! The exponent `n` depends on the environment and is always passed by the
//! caller: the live display uses a free-space style value, the propagation
//! analysis an indoor one (see `config::SignalConfig`).

use crate::types::{signal_constants, DeviceAggregate, Observation, PropagationPoint, RssiRanking};

/// Estimate transmitter distance (m) from received and transmitted power.
///
/// Never fails. Equal `rssi` and `tx_power` give exactly 1 m. A non-finite
/// or non-positive exponent has no physical meaning and yields the same
/// degenerate 1 m estimate. The result is unbounded; presentation is the
/// caller's concern.
pub fn estimate_distance(rssi: f64, tx_power: f64, path_loss_exponent: f64) -> f64 {
    if !path_loss_exponent.is_finite() || path_loss_exponent <= 0.0 {
        tracing::debug!(path_loss_exponent, "Degenerate path-loss exponent, using 1 m");
        return 1.0;
    }
    10f64.powf((tx_power - rssi) / (10.0 * path_loss_exponent))
}

/// Path loss (dB) between advertised tx power and received RSSI.
pub fn path_loss(tx_power: i32, rssi: i32) -> i32 {
    tx_power - rssi
}

/// Human-readable distance: centimetres below 1 m, metres otherwise.
pub fn format_distance(distance_m: f64) -> String {
    if distance_m < signal_constants::CENTIMETRE_DISPLAY_BELOW_M {
        format!("{:.1} cm", distance_m * 100.0)
    } else {
        format!("{distance_m:.1} m")
    }
}

/// Propagation scatter points for observations that advertise a tx power.
///
/// Input must be in time order; the first `limit` qualifying observations
/// are kept in that order.
pub fn propagation_points(
    observations: &[Observation],
    path_loss_exponent: f64,
    limit: usize,
) -> Vec<PropagationPoint> {
    observations
        .iter()
        .filter_map(|obs| {
            obs.tx_power_level.map(|tx| PropagationPoint {
                fingerprint: obs.fingerprint.clone(),
                distance_m: estimate_distance(f64::from(obs.rssi), f64::from(tx), path_loss_exponent),
                path_loss_db: path_loss(tx, obs.rssi),
                rssi: obs.rssi,
                tx_power: tx,
            })
        })
        .take(limit)
        .collect()
}

/// Devices ranked by average RSSI (strongest first) with a live distance
/// estimate against a reference transmit power.
pub fn rssi_ranking(
    devices: &[DeviceAggregate],
    path_loss_exponent: f64,
    reference_tx_power: i32,
    limit: usize,
) -> Vec<RssiRanking> {
    let mut ranked: Vec<&DeviceAggregate> = devices.iter().collect();
    ranked.sort_by(|a, b| {
        b.avg_rssi
            .total_cmp(&a.avg_rssi)
            .then_with(|| a.fingerprint.cmp(&b.fingerprint))
    });

    ranked
        .into_iter()
        .take(limit)
        .map(|d| {
            let distance = estimate_distance(d.avg_rssi, f64::from(reference_tx_power), path_loss_exponent);
            RssiRanking {
                fingerprint: d.fingerprint.clone(),
                avg_rssi: d.avg_rssi,
                min_rssi: d.min_rssi,
                max_rssi: d.max_rssi,
                estimated_distance_m: distance,
                distance_label: format_distance(distance),
            }
        })
        .collect()
}
