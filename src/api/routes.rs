//! API route table.

use axum::routing::get;
use axum::Router;

use super::handlers::{self, DashboardState};

/// Build the dashboard API router.
pub fn api_routes(state: DashboardState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Device activity
        .route("/api/device-activity/heatmap", get(handlers::heatmap))
        .route("/api/device-activity/presence", get(handlers::presence))
        .route("/api/device-activity/dwell-time", get(handlers::dwell_time))
        // Device types
        .route("/api/device-types/details", get(handlers::device_details))
        .route("/api/device-types/behaviour", get(handlers::behaviour))
        .route("/api/device-types/manufacturers", get(handlers::manufacturers))
        // Network
        .route("/api/network/peak-usage", get(handlers::peak_usage))
        .route("/api/network/channel-utilisation", get(handlers::channel_utilisation))
        // Environment
        .route("/api/environment/propagation", get(handlers::propagation))
        .route("/api/environment/interference", get(handlers::interference))
        // Stats
        .route("/api/stats/overview", get(handlers::overview))
        .route("/api/stats/hourly", get(handlers::hourly))
        .route("/api/stats/rssi", get(handlers::rssi))
        .route("/api/stats/devices", get(handlers::devices))
        // Landing page
        .route("/api/dashboard/summary", get(handlers::dashboard_summary))
        .with_state(state)
}
