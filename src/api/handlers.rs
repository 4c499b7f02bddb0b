//! API handlers.
//!
//! All handlers return `Response` via [`ApiResponse::ok`] or [`ApiErrorResponse`].
//! Forecast bodies carry their own observation history; the shared predictor
//! is read-only and every request gets its own working copy and noise source.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use super::envelope::{ApiErrorResponse, ApiResponse};
use crate::acquisition::{into_observations, Reading};
use crate::advisory::HealthAdvisory;
use crate::aqi::{pm25_to_aqi, AqiCategory};
use crate::config::ForecasterConfig;
use crate::forecast::{
    daily_summaries, extended_forecast, hourly_averages, pattern_forecast, DailySummary, ForecastError,
    ForecastStats, GruPredictor, SeededNoise,
};
use crate::types::{ForecastPoint, Observation};

/// Largest horizon accepted over HTTP (two weeks).
pub const MAX_FORECAST_HOURS: usize = 24 * 14;

/// Largest extended forecast accepted over HTTP.
pub const MAX_EXTENDED_DAYS: usize = 14;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct ApiState {
    pub predictor: Arc<GruPredictor>,
    pub config: Arc<ForecasterConfig>,
}

impl ApiState {
    pub fn new(predictor: GruPredictor, config: ForecasterConfig) -> Self {
        Self {
            predictor: Arc::new(predictor),
            config: Arc::new(config),
        }
    }
}

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ForecastRequest {
    pub observations: Vec<Reading>,
    #[serde(default)]
    pub hours: Option<usize>,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ExtendedRequest {
    pub observations: Vec<Reading>,
    #[serde(default)]
    pub days: Option<usize>,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct AdvisoryRequest {
    pub current_pm25: f64,
    #[serde(default)]
    pub forecast_pm25: Vec<f64>,
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub window_length: usize,
    pub seed: u64,
}

#[derive(Debug, Serialize)]
pub struct AqiResponse {
    pub pm25: f64,
    pub aqi: u32,
    pub category: AqiCategory,
    pub label: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub points: Vec<ForecastPoint>,
    pub stats: Option<ForecastStats>,
    pub advisory: HealthAdvisory,
}

#[derive(Debug, Serialize)]
pub struct ExtendedResponse {
    pub points: Vec<ForecastPoint>,
    pub days: Vec<DailySummary>,
    pub stats: Option<ForecastStats>,
    /// Mean PM2.5 of the submitted history per hour of day (UTC).
    pub hourly_profile: [f64; 24],
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
pub async fn health(State(state): State<ApiState>) -> Response {
    ApiResponse::ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        window_length: state.predictor.window_length(),
        seed: state.predictor.seed(),
    })
}

/// GET /model
pub async fn model_summary(State(state): State<ApiState>) -> Response {
    ApiResponse::ok(state.predictor.summary())
}

/// GET /aqi/:pm25
pub async fn aqi_lookup(pm25: Result<Path<f64>, PathRejection>) -> Response {
    let pm25 = match pm25 {
        Ok(Path(v)) => v,
        Err(e) => return ApiErrorResponse::bad_request(e.body_text()),
    };
    if let Err(msg) = check_concentration(pm25) {
        return ApiErrorResponse::unprocessable(msg);
    }

    let aqi = pm25_to_aqi(pm25);
    let category = AqiCategory::from_aqi(aqi);
    ApiResponse::ok(AqiResponse {
        pm25,
        aqi,
        category,
        label: category.label(),
        color: category.color(),
    })
}

/// POST /forecast
pub async fn forecast(State(state): State<ApiState>, body: Result<Json<ForecastRequest>, JsonRejection>) -> Response {
    let req = match body {
        Ok(Json(r)) => r,
        Err(e) => return ApiErrorResponse::bad_request(e.body_text()),
    };
    let hours = req.hours.unwrap_or(state.config.forecast.horizon_hours);
    if hours > MAX_FORECAST_HOURS {
        return ApiErrorResponse::bad_request(format!("hours must be at most {MAX_FORECAST_HOURS}"));
    }
    let history = match into_observations(req.observations) {
        Ok(h) => h,
        Err(e) => return ApiErrorResponse::unprocessable(e.to_string()),
    };

    let predictor = Arc::clone(&state.predictor);
    let seed = req.seed;
    let result = tokio::task::spawn_blocking(move || {
        let points = predictor.forecast_points(&history, hours, &mut SeededNoise::new(seed))?;
        Ok::<_, ForecastError>(forecast_response(&history, points))
    })
    .await;

    respond(result)
}

/// POST /forecast/extended
pub async fn extended(State(state): State<ApiState>, body: Result<Json<ExtendedRequest>, JsonRejection>) -> Response {
    let req = match body {
        Ok(Json(r)) => r,
        Err(e) => return ApiErrorResponse::bad_request(e.body_text()),
    };
    let days = req.days.unwrap_or(state.config.forecast.extended_days);
    if days > MAX_EXTENDED_DAYS {
        return ApiErrorResponse::bad_request(format!("days must be at most {MAX_EXTENDED_DAYS}"));
    }
    let history = match into_observations(req.observations) {
        Ok(h) => h,
        Err(e) => return ApiErrorResponse::unprocessable(e.to_string()),
    };

    let predictor = Arc::clone(&state.predictor);
    let seed = req.seed;
    let result = tokio::task::spawn_blocking(move || {
        let points = extended_forecast(&predictor, &history, days, &mut SeededNoise::new(seed))?;
        let values: Vec<f64> = points.iter().map(|p| p.pm25).collect();
        Ok::<_, ForecastError>(ExtendedResponse {
            days: daily_summaries(&points),
            stats: ForecastStats::from_values(&values),
            hourly_profile: hourly_averages(&history),
            points,
        })
    })
    .await;

    respond(result)
}

/// POST /forecast/baseline
pub async fn baseline(State(state): State<ApiState>, body: Result<Json<ForecastRequest>, JsonRejection>) -> Response {
    let req = match body {
        Ok(Json(r)) => r,
        Err(e) => return ApiErrorResponse::bad_request(e.body_text()),
    };
    let hours = req.hours.unwrap_or(state.config.forecast.horizon_hours);
    if hours > MAX_FORECAST_HOURS {
        return ApiErrorResponse::bad_request(format!("hours must be at most {MAX_FORECAST_HOURS}"));
    }
    let history = match into_observations(req.observations) {
        Ok(h) => h,
        Err(e) => return ApiErrorResponse::unprocessable(e.to_string()),
    };

    let config = Arc::clone(&state.config);
    let seed = req.seed;
    let result = tokio::task::spawn_blocking(move || {
        let mut noise = SeededNoise::new(seed);
        let points = pattern_forecast(&history, hours, &config.model, &config.corrections, &mut noise)?;
        Ok::<_, ForecastError>(forecast_response(&history, points))
    })
    .await;

    respond(result)
}

/// POST /advisory
pub async fn advisory(body: Result<Json<AdvisoryRequest>, JsonRejection>) -> Response {
    let req = match body {
        Ok(Json(r)) => r,
        Err(e) => return ApiErrorResponse::bad_request(e.body_text()),
    };
    if let Some(msg) = std::iter::once(req.current_pm25)
        .chain(req.forecast_pm25.iter().copied())
        .find_map(|v| check_concentration(v).err())
    {
        return ApiErrorResponse::unprocessable(msg);
    }

    let forecast_aqis: Vec<u32> = req.forecast_pm25.iter().map(|&v| pm25_to_aqi(v)).collect();
    ApiResponse::ok(HealthAdvisory::assess(pm25_to_aqi(req.current_pm25), &forecast_aqis))
}

/// Fallback for unknown routes.
pub async fn not_found() -> Response {
    ApiErrorResponse::not_found("No such endpoint")
}

// ============================================================================
// Helpers
// ============================================================================

fn check_concentration(pm25: f64) -> Result<(), String> {
    if !pm25.is_finite() {
        return Err(format!("pm25 must be finite, got {pm25}"));
    }
    if pm25 < 0.0 {
        return Err(format!("pm25 cannot be negative, got {pm25}"));
    }
    Ok(())
}

fn forecast_response(history: &[Observation], points: Vec<ForecastPoint>) -> ForecastResponse {
    let values: Vec<f64> = points.iter().map(|p| p.pm25).collect();
    let forecast_aqis: Vec<u32> = points.iter().map(|p| p.aqi).collect();
    let current_aqi = history.last().map_or(0, |o| pm25_to_aqi(o.pm25));

    ForecastResponse {
        stats: ForecastStats::from_values(&values),
        advisory: HealthAdvisory::assess(current_aqi, &forecast_aqis),
        points,
    }
}

fn respond<T: Serialize>(result: Result<Result<T, ForecastError>, tokio::task::JoinError>) -> Response {
    match result {
        Ok(Ok(data)) => ApiResponse::ok(data),
        Ok(Err(e)) => {
            debug!(error = %e, "Rejected forecast request");
            ApiErrorResponse::unprocessable(e.to_string())
        }
        Err(e) => {
            warn!(error = %e, "Forecast task failed");
            ApiErrorResponse::internal("Forecast task failed")
        }
    }
}
