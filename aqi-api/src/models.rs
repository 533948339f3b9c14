//! Data models for API responses

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::cache::CacheSnapshot;

/// Latest AQI value
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AqiResponse {
    /// US EPA AQI, or -1 before the first successful refresh
    #[schema(example = 56)]
    pub aqi: i32,
}

/// Cache state for monitoring
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AqiStatus {
    /// Same value `/aqi` serves
    #[schema(example = 56)]
    pub aqi: i32,

    /// Whether any refresh has succeeded yet
    pub ready: bool,

    /// Health band of `aqi`
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Moderate")]
    pub category: Option<String>,

    /// Provider timestamp of the reading behind `aqi`
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "1718900050")]
    pub source_timestamp: Option<String>,

    /// RFC 3339 time of the last successful refresh
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "2024-06-20T16:00:01Z")]
    pub updated_at: Option<String>,

    /// Failed refreshes since the last success
    #[schema(example = 0)]
    pub consecutive_failures: u32,

    /// No successful refresh within two refresh intervals
    pub stale: bool,
}

impl From<CacheSnapshot> for AqiStatus {
    fn from(snapshot: CacheSnapshot) -> Self {
        Self {
            aqi: snapshot.aqi,
            ready: snapshot.is_ready(),
            category: snapshot.category.map(|c| c.label().to_string()),
            source_timestamp: snapshot.source_timestamp,
            updated_at: snapshot.updated_at.map(|t| t.to_rfc3339()),
            consecutive_failures: snapshot.consecutive_failures,
            stale: snapshot.stale,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthCheck {
    /// Service status
    #[schema(example = "healthy")]
    pub status: String,

    /// Service version
    #[schema(example = "2026.1.16")]
    pub version: String,
}
