//! REST API module using Axum
//!
//! Serves forecasts, AQI lookups and health advisories under `/api/v1`.
//! Each forecast request carries its own observation history.

pub mod envelope;
pub mod handlers;
mod routes;

pub use handlers::ApiState;

use axum::http::{header, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Environment variable holding a comma-separated list of allowed CORS origins.
pub const CORS_ENV_VAR: &str = "AQI_FORECASTER_CORS_ORIGINS";

/// Maximum accepted request body (observation histories).
const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Build a CORS layer that is restrictive by default (same-origin only).
///
/// Set `AQI_FORECASTER_CORS_ORIGINS` to a comma-separated list of allowed
/// origins, e.g. `http://localhost:5173`.
fn build_cors_layer() -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    match std::env::var(CORS_ENV_VAR) {
        Ok(origins) => {
            let allowed: Vec<_> = origins
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
pub fn create_app(state: ApiState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes(state))
        .fallback(handlers::not_found)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}
