//! Request handlers for API endpoints
//!
//! Handlers only read the shared cache; they never touch the network.

use axum::{Json, extract::State};

use crate::cache::AqiCache;
use crate::models::*;

/// Get the most recent AQI value
#[utoipa::path(
    get,
    path = "/aqi",
    tag = "aqi",
    responses(
        (status = 200, description = "Latest AQI (-1 until the first refresh succeeds)", body = AqiResponse),
    )
)]
pub async fn aqi_handler(State(cache): State<AqiCache>) -> Json<AqiResponse> {
    Json(AqiResponse { aqi: cache.get() })
}

/// Get the cached AQI with refresh bookkeeping
#[utoipa::path(
    get,
    path = "/aqi/status",
    tag = "aqi",
    responses(
        (status = 200, description = "Cache status", body = AqiStatus),
    )
)]
pub async fn status_handler(State(cache): State<AqiCache>) -> Json<AqiStatus> {
    Json(cache.snapshot().into())
}

/// Health check endpoint for monitoring
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthCheck),
    )
)]
pub async fn health_handler() -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
