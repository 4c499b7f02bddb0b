//! API route table.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{self, ApiState};

/// Build the `/api/v1` router.
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/model", get(handlers::model_summary))
        .route("/aqi/:pm25", get(handlers::aqi_lookup))
        // Forecasts
        .route("/forecast", post(handlers::forecast))
        .route("/forecast/extended", post(handlers::extended))
        .route("/forecast/baseline", post(handlers::baseline))
        // Advisory
        .route("/advisory", post(handlers::advisory))
        .with_state(state)
}
