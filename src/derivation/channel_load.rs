//! Channel load analysis per time bucket
//!
//! - transmissions per device = transmissions / active devices
//! - load factor = transmissions / (60 * active devices)
//! - level: `> 10` High, `> 5` Medium, else Low (on transmissions per device)

use crate::types::{
    load_thresholds as lt, ChannelLoadRecord, ChannelLoadSummary, ChannelUtilisation, LoadLevel,
    TimeBucketAggregate,
};

/// Load level for a transmissions-per-device rate. Thresholds are strict.
pub fn load_level(transmissions_per_device: f64) -> LoadLevel {
    if transmissions_per_device > lt::HIGH_TRANSMISSIONS_PER_DEVICE {
        LoadLevel::High
    } else if transmissions_per_device > lt::MEDIUM_TRANSMISSIONS_PER_DEVICE {
        LoadLevel::Medium
    } else {
        LoadLevel::Low
    }
}

/// Load metrics for one bucket, `None` when it has no active devices.
pub fn channel_load(bucket: &TimeBucketAggregate) -> Option<ChannelLoadRecord> {
    if bucket.active_devices == 0 {
        return None;
    }

    let devices = bucket.active_devices as f64;
    let transmissions = bucket.transmission_count as f64;
    let transmissions_per_device = transmissions / devices;

    Some(ChannelLoadRecord {
        time_block: bucket.bucket_key.clone(),
        transmission_count: bucket.transmission_count,
        active_devices: bucket.active_devices,
        transmissions_per_device,
        channel_load_factor: transmissions / (lt::MINUTES_PER_BUCKET * devices),
        avg_signal_strength: bucket.avg_rssi,
        unique_services: bucket.unique_services,
        load_level: load_level(transmissions_per_device),
    })
}

/// Summary across already-computed bucket records.
///
/// An empty input yields an all-zero summary.
pub fn summarize(records: &[ChannelLoadRecord]) -> ChannelLoadSummary {
    if records.is_empty() {
        return ChannelLoadSummary {
            average_channel_load: 0.0,
            peak_utilisation: 0.0,
            device_density: 0,
            time_blocks: 0,
        };
    }

    let n = records.len() as f64;
    let average_channel_load = records.iter().map(|r| r.channel_load_factor).sum::<f64>() / n;
    let peak_utilisation = records
        .iter()
        .map(|r| r.transmissions_per_device)
        .fold(0.0, f64::max);
    let mean_devices = records.iter().map(|r| r.active_devices as f64).sum::<f64>() / n;

    ChannelLoadSummary {
        average_channel_load,
        peak_utilisation,
        device_density: mean_devices.round() as u64,
        time_blocks: records.len(),
    }
}

/// Per-bucket load records plus summary. Buckets without active devices
/// are excluded entirely.
pub fn channel_utilisation(buckets: &[TimeBucketAggregate]) -> ChannelUtilisation {
    let records: Vec<ChannelLoadRecord> = buckets.iter().filter_map(channel_load).collect();

    let skipped = buckets.len() - records.len();
    if skipped > 0 {
        tracing::debug!(skipped, "Excluded buckets with no active devices from channel load");
    }

    let summary = summarize(&records);
    ChannelUtilisation {
        buckets: records,
        summary,
    }
}
