//! Grouping adapter
//!
//! Turns raw observations from an [`ObservationSource`] into the aggregate
//! rows the derivation layer consumes. The adapter holds no state beyond the
//! shared source handle; every call re-reads the window.

pub mod aggregate;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::storage::{ObservationSource, SourceError, TimeWindow};
use crate::types::{
    DeviceAggregate, DeviceDayAggregate, HourlyCount, ManufacturerAggregate, Observation,
    TimeBucketAggregate, WeekdayHourAggregate,
};

pub use aggregate::{
    device_aggregates, device_days, hour_of_day_counts, hourly_buckets, manufacturer_aggregates,
    minute_buckets, time_buckets, weekday_hour_presence, BucketWidth,
};

/// Async grouped queries over a shared observation source.
#[derive(Clone)]
pub struct GroupingAdapter {
    source: Arc<dyn ObservationSource>,
}

impl GroupingAdapter {
    pub fn new(source: Arc<dyn ObservationSource>) -> Self {
        Self { source }
    }

    pub fn backend_name(&self) -> &'static str {
        self.source.backend_name()
    }

    async fn fetch(&self, window: &TimeWindow) -> Result<Vec<Observation>, SourceError> {
        self.source.observations(window).await
    }

    /// Per-device aggregates, ordered by fingerprint.
    pub async fn devices(&self, window: &TimeWindow) -> Result<Vec<DeviceAggregate>, SourceError> {
        Ok(aggregate::device_aggregates(&self.fetch(window).await?))
    }

    /// The most recent `limit` calendar-hour buckets, ascending.
    pub async fn hourly_buckets(
        &self,
        window: &TimeWindow,
        limit: usize,
    ) -> Result<Vec<TimeBucketAggregate>, SourceError> {
        let mut buckets = aggregate::hourly_buckets(&self.fetch(window).await?);
        let skip = buckets.len().saturating_sub(limit);
        buckets.drain(..skip);
        Ok(buckets)
    }

    pub async fn minute_buckets(
        &self,
        window: &TimeWindow,
    ) -> Result<Vec<TimeBucketAggregate>, SourceError> {
        Ok(aggregate::minute_buckets(&self.fetch(window).await?))
    }

    pub async fn manufacturers(
        &self,
        window: &TimeWindow,
    ) -> Result<Vec<ManufacturerAggregate>, SourceError> {
        Ok(aggregate::manufacturer_aggregates(&self.fetch(window).await?))
    }

    pub async fn device_days(
        &self,
        window: &TimeWindow,
    ) -> Result<Vec<DeviceDayAggregate>, SourceError> {
        Ok(aggregate::device_days(&self.fetch(window).await?))
    }

    pub async fn weekday_hour_presence(
        &self,
        window: &TimeWindow,
    ) -> Result<Vec<WeekdayHourAggregate>, SourceError> {
        Ok(aggregate::weekday_hour_presence(&self.fetch(window).await?))
    }

    pub async fn hour_of_day_counts(
        &self,
        window: &TimeWindow,
    ) -> Result<Vec<HourlyCount>, SourceError> {
        Ok(aggregate::hour_of_day_counts(&self.fetch(window).await?))
    }

    /// Observations that carry a transmit power, in time order.
    pub async fn tx_power_observations(
        &self,
        window: &TimeWindow,
    ) -> Result<Vec<Observation>, SourceError> {
        let mut observations = self.fetch(window).await?;
        observations.retain(|o| o.tx_power_level.is_some());
        Ok(observations)
    }

    pub async fn total_scans(&self, window: &TimeWindow) -> Result<u64, SourceError> {
        Ok(self.fetch(window).await?.len() as u64)
    }

    pub async fn unique_devices(&self, window: &TimeWindow) -> Result<u64, SourceError> {
        Ok(aggregate::unique_devices(&self.fetch(window).await?))
    }

    pub async fn time_range(
        &self,
        window: &TimeWindow,
    ) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, SourceError> {
        Ok(aggregate::time_range(&self.fetch(window).await?))
    }

    /// Total scans, unique devices and time range, retrieved concurrently.
    pub async fn overview_counts(
        &self,
        window: &TimeWindow,
    ) -> Result<(u64, u64, Option<(DateTime<Utc>, DateTime<Utc>)>), SourceError> {
        futures::try_join!(
            self.total_scans(window),
            self.unique_devices(window),
            self.time_range(window),
        )
    }
}
