//! Route configuration for the AQI API

use axum::{Router, routing::get};

use crate::cache::AqiCache;
use crate::handlers;

/// Create the main application router
pub fn create_router(cache: AqiCache) -> Router {
    Router::new()
        .route("/aqi", get(handlers::aqi_handler))
        .route("/aqi/status", get(handlers::status_handler))
        // Health check
        .route("/health", get(handlers::health_handler))
        .with_state(cache)
}
