//! REST API module using Axum
//!
//! Read-only JSON endpoints backing the beacon dashboard. Every response uses
//! the envelope in [`envelope`]; unknown paths get a `NOT_FOUND` envelope.

pub mod envelope;
pub mod handlers;
mod routes;

pub use handlers::DashboardState;
pub use routes::api_routes;

use axum::http::{header, HeaderValue, Method, Uri};
use axum::response::Response;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Environment variable listing allowed cross-origin callers.
pub const CORS_ENV_VAR: &str = "BEACONSCOPE_CORS_ORIGINS";

async fn not_found(uri: Uri) -> Response {
    envelope::ApiErrorResponse::not_found(format!("No route for {}", uri.path()))
}

/// Build a CORS layer that is restrictive by default (same-origin only).
///
/// Set `BEACONSCOPE_CORS_ORIGINS` to a comma-separated list of allowed
/// origins, e.g. `http://localhost:5173` for a dashboard dev server.
fn build_cors_layer() -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    match std::env::var(CORS_ENV_VAR) {
        Ok(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            tracing::info!(origins = %origins, "CORS: allowing configured origins");
            base.allow_origin(allowed)
        }
        Err(_) => base,
    }
}

/// Create the complete application router.
pub fn create_app(state: DashboardState) -> Router {
    routes::api_routes(state)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(build_cors_layer())
}
