//! API Regression Tests
//!
//! In-process tests that build the Axum app via `create_app()` and exercise
//! every /api/v1/* endpoint using `tower::ServiceExt::oneshot()`.
//! No binary spawn, no network port.

use aqi_forecaster::api::{create_app, ApiState};
use aqi_forecaster::config::ForecasterConfig;
use aqi_forecaster::forecast::GruPredictor;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

fn create_test_app() -> Router {
    let mut config = ForecasterConfig::default();
    config.model.seed = Some(2024);
    let predictor = GruPredictor::new(&config).unwrap();
    create_app(ApiState::new(predictor, config))
}

/// 48 hourly readings following a daily cycle around 30 µg/m³.
fn history_json() -> Value {
    let readings: Vec<Value> = (0..48)
        .map(|i| {
            let day = 1 + i / 24;
            let hour = i % 24;
            let pm25 = 30.0 + 10.0 * ((f64::from(hour) - 6.0) / 24.0 * std::f64::consts::TAU).sin();
            json!({ "timestamp": format!("2024-03-{day:02}T{hour:02}:00:00Z"), "pm25": pm25 })
        })
        .collect();
    Value::Array(readings)
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn assert_points_valid(points: &[Value], first_timestamp: &str) {
    assert_eq!(points[0]["timestamp"], first_timestamp);
    for p in points {
        let pm25 = p["pm25"].as_f64().unwrap();
        assert!((5.0..=250.0).contains(&pm25), "pm25 {pm25} out of range");
        assert!(p["aqi"].as_u64().is_some());
        assert!(p["category"].is_string());
    }
}

#[tokio::test]
async fn test_get_endpoints_return_200() {
    for endpoint in ["/api/v1/health", "/api/v1/model", "/api/v1/aqi/12.0"] {
        let (status, body) = get(create_test_app(), endpoint).await;
        assert_eq!(status, StatusCode::OK, "GET {endpoint}");
        assert!(body.get("data").is_some(), "GET {endpoint} missing data");
        assert!(body.get("meta").is_some(), "GET {endpoint} missing meta");
    }
}

#[tokio::test]
async fn test_model_summary_is_untrained() {
    let (_, body) = get(create_test_app(), "/api/v1/model").await;
    assert_eq!(body["data"]["trained"], false);
    assert_eq!(body["data"]["window_length"], 24);
    assert_eq!(body["data"]["input_features"], 11);
    assert_eq!(body["data"]["seed"], 2024);
}

#[tokio::test]
async fn test_forecast_returns_hourly_points() {
    let (status, body) = post(
        create_test_app(),
        "/api/v1/forecast",
        json!({ "observations": history_json(), "hours": 6, "seed": 9 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let points = body["data"]["points"].as_array().unwrap();
    assert_eq!(points.len(), 6);
    assert_points_valid(points, "2024-03-03T00:00:00Z");
    assert!(body["data"]["stats"]["average"].is_number());
    assert!(body["data"]["advisory"]["recommended_actions"].is_array());
}

#[tokio::test]
async fn test_forecast_defaults_to_configured_horizon() {
    let (status, body) = post(
        create_test_app(),
        "/api/v1/forecast",
        json!({ "observations": history_json() }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["points"].as_array().unwrap().len(), 24);
}

#[tokio::test]
async fn test_same_seed_same_forecast() {
    let request = json!({ "observations": history_json(), "hours": 12, "seed": 77 });
    let (_, first) = post(create_test_app(), "/api/v1/forecast", request.clone()).await;
    let (_, second) = post(create_test_app(), "/api/v1/forecast", request).await;
    assert_eq!(first["data"]["points"], second["data"]["points"]);
}

#[tokio::test]
async fn test_extended_forecast_has_daily_summaries() {
    let (status, body) = post(
        create_test_app(),
        "/api/v1/forecast/extended",
        json!({ "observations": history_json(), "days": 2, "seed": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let points = body["data"]["points"].as_array().unwrap();
    assert_eq!(points.len(), 48);
    assert_points_valid(points, "2024-03-03T00:00:00Z");

    let days = body["data"]["days"].as_array().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["date"], "2024-03-03");
    assert_eq!(days[1]["date"], "2024-03-04");

    // History follows sin((h - 6) / 24 · 2π): flat at 06:00, peak at 12:00
    let profile = body["data"]["hourly_profile"].as_array().unwrap();
    assert_eq!(profile.len(), 24);
    assert_eq!(profile[6].as_f64().unwrap(), 30.0);
    assert_eq!(profile[12].as_f64().unwrap(), 40.0);
    assert_eq!(profile[0].as_f64().unwrap(), 20.0);
}

#[tokio::test]
async fn test_baseline_forecast() {
    let (status, body) = post(
        create_test_app(),
        "/api/v1/forecast/baseline",
        json!({ "observations": history_json(), "hours": 8, "seed": 5 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let points = body["data"]["points"].as_array().unwrap();
    assert_eq!(points.len(), 8);
    assert_points_valid(points, "2024-03-03T00:00:00Z");
}

#[tokio::test]
async fn test_baseline_zero_hours_is_unprocessable() {
    let (status, body) = post(
        create_test_app(),
        "/api/v1/forecast/baseline",
        json!({ "observations": history_json(), "hours": 0 }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_advisory_uses_worse_of_current_and_forecast() {
    let (status, body) = post(
        create_test_app(),
        "/api/v1/advisory",
        json!({ "current_pm25": 10.0, "forecast_pm25": [80.0, 90.0] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["current_category"], "good");
    assert_eq!(body["data"]["forecast_category"], "unhealthy");
    assert!(body["data"]["governing_aqi"].as_u64().unwrap() > 150);
}

#[tokio::test]
async fn test_empty_history_is_unprocessable() {
    let (status, body) = post(
        create_test_app(),
        "/api/v1/forecast",
        json!({ "observations": [], "hours": 3 }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_zero_hours_is_unprocessable() {
    let (status, _) = post(
        create_test_app(),
        "/api/v1/forecast",
        json!({ "observations": history_json(), "hours": 0 }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_negative_reading_is_unprocessable() {
    let (status, body) = post(
        create_test_app(),
        "/api/v1/forecast",
        json!({ "observations": [{ "timestamp": "2024-03-01T00:00:00Z", "pm25": -4.0 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]["message"].as_str().unwrap().contains("negative"));
}

#[tokio::test]
async fn test_oversized_horizon_is_bad_request() {
    let (status, body) = post(
        create_test_app(),
        "/api/v1/forecast",
        json!({ "observations": history_json(), "hours": 100_000 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (status, body) = post(create_test_app(), "/api/v1/forecast", json!({ "readings": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}
