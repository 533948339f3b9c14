//! AQI REST API Server
//!
//! Polls one PurpleAir sensor for its 24-hour PM2.5 average, converts it to a
//! US EPA AQI value and serves the latest value over HTTP.
//!
//! ## Pipeline
//! - [`schedule`] fires a startup trigger, then one per interval from the
//!   next whole hour
//! - [`refresh`] runs fetch → convert → cache write, at most one at a time
//! - [`fetcher`] talks to the provider
//! - [`cache`] holds the single latest value
//! - [`handlers`] answer `GET /aqi` from the cache
//!
//! ## Environment Variables
//! - `SENSOR_ID`: PurpleAir sensor index (required)
//! - `API_KEY`: PurpleAir read key (required)
//! - `AQI_API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `AQI_API_PORT`: Port to listen on (default: 8080)
//! - `AQI_PROVIDER_URL`: Provider base URL (default: https://api.purpleair.com)
//! - `AQI_REFRESH_INTERVAL_SECS`: Refresh period (default: 3600)
//! - `AQI_FETCH_TIMEOUT_SECS`: Request and cycle timeout (default: 30)

pub mod cache;
pub mod config;
pub mod fetcher;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod refresh;
pub mod routes;
pub mod schedule;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use cache::AqiCache;
use openapi::ApiDoc;

/// Router with docs and HTTP tracing, ready to serve.
pub fn build_app(cache: AqiCache, cors: bool) -> Router {
    let mut app = routes::create_router(cache).merge(
        SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    if cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
