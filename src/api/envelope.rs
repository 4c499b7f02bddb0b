//! JSON wrapper shared by every `/api/v1` reply.
//!
//! Forecasts and lookups come back as `{ "data": ..., "meta": ... }`; rejected
//! requests as `{ "error": { "code", "message" }, "meta": ... }`. `meta` carries
//! the API revision and the time the reply was produced.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// API revision reported in `meta.version`.
pub const API_VERSION: &str = "1";

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
}

impl ResponseMeta {
    fn now() -> Self {
        Self {
            timestamp: Utc::now(),
            version: API_VERSION,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 with `data` set to the payload.
    pub fn ok(data: T) -> Response {
        let body = Self { data, meta: ResponseMeta::now() };
        (StatusCode::OK, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Stable machine-readable code (`BAD_REQUEST`, `INVALID_INPUT`, ...)
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub error: ErrorDetail,
    pub meta: ResponseMeta,
}

impl ApiErrorResponse {
    fn reply(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
        let body = Self {
            error: ErrorDetail { code, message: message.into() },
            meta: ResponseMeta::now(),
        };
        (status, Json(body)).into_response()
    }

    /// 404: unknown route.
    pub fn not_found(message: impl Into<String>) -> Response {
        Self::reply(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    /// 400: body or path could not be decoded, or a limit was exceeded.
    pub fn bad_request(message: impl Into<String>) -> Response {
        Self::reply(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// 422: well-formed request whose readings or horizon cannot be forecast.
    pub fn unprocessable(message: impl Into<String>) -> Response {
        Self::reply(StatusCode::UNPROCESSABLE_ENTITY, "INVALID_INPUT", message)
    }

    /// 500: the forecast task died.
    pub fn internal(message: impl Into<String>) -> Response {
        Self::reply(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}
