//! OpenAPI documentation configuration

use utoipa::OpenApi;

use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "AQI API",
        version = "2026.1.16",
        description = "Latest US EPA Air Quality Index computed from a PurpleAir sensor's 24-hour PM2.5 average",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    tags(
        (name = "aqi", description = "Cached air quality"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        handlers::aqi_handler,
        handlers::status_handler,
        handlers::health_handler,
    ),
    components(
        schemas(
            AqiResponse,
            AqiStatus,
            HealthCheck,
        )
    )
)]
pub struct ApiDoc;
