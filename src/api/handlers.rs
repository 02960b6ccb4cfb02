//! API handlers: fetch grouped rows, run one derivation, wrap in the envelope.
//!
//! Display rounding (transmissions per device 2 dp, load factor 3 dp, RSSI
//! 1 dp) is applied here and nowhere else.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Query, State};
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::envelope::{ApiErrorResponse, ApiResponse};
use crate::config::DashboardConfig;
use crate::derivation::{self, round_to};
use crate::grouping::GroupingAdapter;
use crate::storage::{SourceError, TimeWindow};
use crate::types::{ChannelUtilisation, PeakUsageRecord, RssiRanking};

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers
#[derive(Clone)]
pub struct DashboardState {
    /// Grouped queries over the observation store
    pub adapter: GroupingAdapter,
    /// Signal parameters and output caps
    pub config: Arc<DashboardConfig>,
    pub started_at: Instant,
}

impl DashboardState {
    pub fn new(adapter: GroupingAdapter, config: DashboardConfig) -> Self {
        Self {
            adapter,
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }
}

// ============================================================================
// Query types
// ============================================================================

/// `?since=&until=` as RFC 3339 timestamps, both optional.
#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    #[serde(default)]
    pub since: Option<String>,
    #[serde(default)]
    pub until: Option<String>,
}

impl WindowQuery {
    pub fn window(&self) -> Result<TimeWindow, Response> {
        let window = TimeWindow {
            since: parse_bound("since", self.since.as_deref())?,
            until: parse_bound("until", self.until.as_deref())?,
        };
        if window.is_inverted() {
            return Err(ApiErrorResponse::bad_request("'since' must not be after 'until'"));
        }
        Ok(window)
    }
}

fn parse_bound(name: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>, Response> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| {
            DateTime::parse_from_rfc3339(v.trim())
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| ApiErrorResponse::bad_request(format!("Invalid '{name}' timestamp: {e}")))
        })
        .transpose()
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub backend: &'static str,
    pub uptime_secs: u64,
    pub version: &'static str,
}

// ============================================================================
// Internal helpers
// ============================================================================

/// Map a source failure to a response. Unavailable data is a 503, never an
/// empty result.
fn source_error(err: SourceError) -> Response {
    match err {
        SourceError::DataUnavailable(reason) => {
            tracing::warn!(reason = %reason, "Observation data unavailable");
            ApiErrorResponse::service_unavailable(format!("Observation data unavailable: {reason}"))
        }
        SourceError::Serialization(reason) => {
            tracing::error!(reason = %reason, "Observation data could not be decoded");
            ApiErrorResponse::internal(format!("Storage error: {reason}"))
        }
    }
}

/// Resolve the window or return the 400 response from the enclosing handler.
macro_rules! window_or_return {
    ($q:expr) => {
        match $q.window() {
            Ok(w) => w,
            Err(resp) => return resp,
        }
    };
}

fn display_channel_utilisation(mut utilisation: ChannelUtilisation) -> ChannelUtilisation {
    for b in &mut utilisation.buckets {
        b.transmissions_per_device = round_to(b.transmissions_per_device, 2);
        b.channel_load_factor = round_to(b.channel_load_factor, 3);
        b.avg_signal_strength = round_to(b.avg_signal_strength, 1);
    }
    let s = &mut utilisation.summary;
    s.average_channel_load = round_to(s.average_channel_load, 3);
    s.peak_utilisation = round_to(s.peak_utilisation, 2);
    utilisation
}

fn display_peak_usage(records: Vec<PeakUsageRecord>) -> Vec<PeakUsageRecord> {
    records
        .into_iter()
        .map(|r| PeakUsageRecord {
            avg_signal: round_to(r.avg_signal, 1),
            ..r
        })
        .collect()
}

fn display_rssi_ranking(ranking: Vec<RssiRanking>) -> Vec<RssiRanking> {
    ranking
        .into_iter()
        .map(|r| RssiRanking {
            avg_rssi: round_to(r.avg_rssi, 1),
            ..r
        })
        .collect()
}

// ============================================================================
// Health
// ============================================================================

/// GET /health
pub async fn health(State(state): State<DashboardState>) -> Response {
    ApiResponse::ok(HealthResponse {
        status: "ok",
        backend: state.adapter.backend_name(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Device activity
// ============================================================================

/// GET /api/device-activity/heatmap
pub async fn heatmap(State(state): State<DashboardState>, Query(q): Query<WindowQuery>) -> Response {
    let window = window_or_return!(q);
    match state.adapter.weekday_hour_presence(&window).await {
        Ok(cells) => ApiResponse::ok(derivation::activity_heatmap(&cells)),
        Err(e) => source_error(e),
    }
}

/// GET /api/device-activity/presence
pub async fn presence(State(state): State<DashboardState>, Query(q): Query<WindowQuery>) -> Response {
    let window = window_or_return!(q);
    match state.adapter.device_days(&window).await {
        Ok(rows) => ApiResponse::ok(derivation::presence_series(&rows, state.config.limits.presence_days)),
        Err(e) => source_error(e),
    }
}

/// GET /api/device-activity/dwell-time
pub async fn dwell_time(State(state): State<DashboardState>, Query(q): Query<WindowQuery>) -> Response {
    let window = window_or_return!(q);
    match state.adapter.devices(&window).await {
        Ok(devices) => ApiResponse::ok(derivation::dwell_distribution(&devices)),
        Err(e) => source_error(e),
    }
}

// ============================================================================
// Device types
// ============================================================================

/// GET /api/device-types/details
pub async fn device_details(
    State(state): State<DashboardState>,
    Query(q): Query<WindowQuery>,
) -> Response {
    let window = window_or_return!(q);
    match state.adapter.devices(&window).await {
        Ok(devices) => ApiResponse::ok(derivation::device_details(&devices, state.config.limits.device_details)),
        Err(e) => source_error(e),
    }
}

/// GET /api/device-types/behaviour
pub async fn behaviour(State(state): State<DashboardState>, Query(q): Query<WindowQuery>) -> Response {
    let window = window_or_return!(q);
    match state.adapter.devices(&window).await {
        Ok(devices) => ApiResponse::ok(derivation::behaviour_summary(
            &devices,
            state.config.limits.behaviour_min_appearances,
        )),
        Err(e) => source_error(e),
    }
}

/// GET /api/device-types/manufacturers
pub async fn manufacturers(
    State(state): State<DashboardState>,
    Query(q): Query<WindowQuery>,
) -> Response {
    let window = window_or_return!(q);
    let limits = &state.config.limits;
    match state.adapter.manufacturers(&window).await {
        Ok(groups) => ApiResponse::ok(derivation::manufacturer_report(
            &groups,
            limits.manufacturer_rank,
            limits.top_services,
        )),
        Err(e) => source_error(e),
    }
}

// ============================================================================
// Network
// ============================================================================

/// GET /api/network/peak-usage
pub async fn peak_usage(State(state): State<DashboardState>, Query(q): Query<WindowQuery>) -> Response {
    let window = window_or_return!(q);
    match state.adapter.minute_buckets(&window).await {
        Ok(buckets) => ApiResponse::ok(display_peak_usage(derivation::peak_usage(
            &buckets,
            state.config.limits.peak_minutes,
        ))),
        Err(e) => source_error(e),
    }
}

/// GET /api/network/channel-utilisation
pub async fn channel_utilisation(
    State(state): State<DashboardState>,
    Query(q): Query<WindowQuery>,
) -> Response {
    let window = window_or_return!(q);
    match state.adapter.hourly_buckets(&window, state.config.limits.hourly_buckets).await {
        Ok(buckets) => {
            let utilisation = derivation::channel_utilisation(&buckets);
            tracing::debug!(time_blocks = utilisation.summary.time_blocks, "Channel utilisation computed");
            ApiResponse::ok(display_channel_utilisation(utilisation))
        }
        Err(e) => source_error(e),
    }
}

// ============================================================================
// Environment
// ============================================================================

/// GET /api/environment/propagation
pub async fn propagation(State(state): State<DashboardState>, Query(q): Query<WindowQuery>) -> Response {
    let window = window_or_return!(q);
    match state.adapter.tx_power_observations(&window).await {
        Ok(observations) => ApiResponse::ok(derivation::propagation_points(
            &observations,
            state.config.signal.propagation_path_loss_exponent,
            state.config.limits.propagation_samples,
        )),
        Err(e) => source_error(e),
    }
}

/// GET /api/environment/interference
pub async fn interference(
    State(state): State<DashboardState>,
    Query(q): Query<WindowQuery>,
) -> Response {
    let window = window_or_return!(q);
    match state.adapter.hourly_buckets(&window, state.config.limits.hourly_buckets).await {
        Ok(buckets) => ApiResponse::ok(derivation::interference_series(&buckets)),
        Err(e) => source_error(e),
    }
}

// ============================================================================
// Stats
// ============================================================================

/// GET /api/stats/overview
pub async fn overview(State(state): State<DashboardState>, Query(q): Query<WindowQuery>) -> Response {
    let window = window_or_return!(q);
    match state.adapter.overview_counts(&window).await {
        Ok((total, unique, range)) => ApiResponse::ok(derivation::overview(total, unique, range)),
        Err(e) => source_error(e),
    }
}

/// GET /api/stats/hourly
pub async fn hourly(State(state): State<DashboardState>, Query(q): Query<WindowQuery>) -> Response {
    let window = window_or_return!(q);
    match state.adapter.hour_of_day_counts(&window).await {
        Ok(counts) => ApiResponse::ok(derivation::hourly_histogram(&counts)),
        Err(e) => source_error(e),
    }
}

/// GET /api/stats/rssi
pub async fn rssi(State(state): State<DashboardState>, Query(q): Query<WindowQuery>) -> Response {
    let window = window_or_return!(q);
    let signal = &state.config.signal;
    match state.adapter.devices(&window).await {
        Ok(devices) => ApiResponse::ok(display_rssi_ranking(derivation::rssi_ranking(
            &devices,
            signal.live_path_loss_exponent,
            signal.reference_tx_power_dbm,
            state.config.limits.rssi_ranking,
        ))),
        Err(e) => source_error(e),
    }
}

/// GET /api/stats/devices
pub async fn devices(State(state): State<DashboardState>, Query(q): Query<WindowQuery>) -> Response {
    let window = window_or_return!(q);
    match state.adapter.devices(&window).await {
        Ok(devices) => ApiResponse::ok(derivation::recent_devices(&devices, state.config.limits.recent_devices)),
        Err(e) => source_error(e),
    }
}

// ============================================================================
// Dashboard summary
// ============================================================================

/// GET /api/dashboard/summary
///
/// Devices, hourly buckets and manufacturers are retrieved concurrently.
pub async fn dashboard_summary(
    State(state): State<DashboardState>,
    Query(q): Query<WindowQuery>,
) -> Response {
    let window = window_or_return!(q);
    let limits = &state.config.limits;
    let adapter = &state.adapter;

    let fetched = futures::try_join!(
        adapter.devices(&window),
        adapter.hourly_buckets(&window, limits.hourly_buckets),
        adapter.manufacturers(&window),
    );

    match fetched {
        Ok((devices, buckets, groups)) => ApiResponse::ok(derivation::dashboard_summary(
            &devices,
            &buckets,
            &groups,
            limits.manufacturer_rank,
            limits.top_services,
        )),
        Err(e) => source_error(e),
    }
}
