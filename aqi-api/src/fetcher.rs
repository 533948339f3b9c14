//! PurpleAir sensor fetcher
//!
//! One GET per call against `/v1/sensors/{id}?fields=pm2.5_24hour` with the
//! read key in the `X-API-Key` header. No retries here; the refresh cycle
//! decides what a failure means.

use std::{fmt, future::Future, time::Duration};

use aqi_core::SensorReading;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;

/// Default provider base URL
pub const PURPLEAIR_API_URL: &str = "https://api.purpleair.com";

/// The only field requested from the provider
pub const PM25_24HOUR_FIELD: &str = "pm2.5_24hour";

/// Header carrying the read key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Fetch failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("provider returned HTTP {0}")]
    HttpStatus(u16),

    #[error("invalid provider response: {0}")]
    Parse(String),
}

impl FetchError {
    /// HTTP status, if the provider answered with one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::HttpStatus(code) => StatusCode::from_u16(*code).ok(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        // `without_url` keeps query strings out of logs
        FetchError::Network(err.without_url().to_string())
    }
}

/// Anything that can produce a reading for a sensor.
pub trait SensorSource: Send + Sync {
    fn fetch(
        &self,
        sensor_id: &str,
        api_key: &str,
    ) -> impl Future<Output = Result<SensorReading, FetchError>> + Send;
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Deserialize)]
struct SensorResponse {
    #[serde(default)]
    data_timestamp: Option<Scalar>,
    sensor: SensorPayload,
}

#[derive(Debug, Deserialize)]
struct SensorPayload {
    sensor_index: Scalar,
    stats: SensorStats,
}

#[derive(Debug, Deserialize)]
struct SensorStats {
    #[serde(rename = "pm2.5_24hour")]
    pm25_24hour: f64,
    #[serde(default)]
    time_stamp: Option<Scalar>,
}

/// The provider sends ids and timestamps as either strings or integers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Parse a provider response body into a reading.
pub fn parse_sensor_response(body: &str) -> Result<SensorReading, FetchError> {
    let response: SensorResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    let timestamp = response
        .sensor
        .stats
        .time_stamp
        .or(response.data_timestamp)
        .ok_or_else(|| FetchError::Parse("missing `time_stamp` and `data_timestamp`".into()))?;

    Ok(SensorReading {
        sensor_id: response.sensor.sensor_index.to_string(),
        pm25_24hr_average: response.sensor.stats.pm25_24hour,
        timestamp: timestamp.to_string(),
    })
}

// ============================================================================
// HTTP client
// ============================================================================

/// Client for the PurpleAir read API
#[derive(Debug, Clone)]
pub struct PurpleAirClient {
    http: Client,
    base_url: Url,
}

impl PurpleAirClient {
    /// Build a client against `base_url` with a per-request timeout.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, FetchError> {
        if base_url.cannot_be_a_base() {
            return Err(FetchError::Network(format!(
                "provider URL cannot be a base: {}",
                base_url
            )));
        }

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("aqi-api/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base_url })
    }

    /// URL for one sensor, without credentials.
    pub fn sensor_url(&self, sensor_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["v1", "sensors", sensor_id]);
        }
        url.query_pairs_mut()
            .clear()
            .append_pair("fields", PM25_24HOUR_FIELD);
        url
    }
}

impl SensorSource for PurpleAirClient {
    async fn fetch(&self, sensor_id: &str, api_key: &str) -> Result<SensorReading, FetchError> {
        let url = self.sensor_url(sensor_id);
        tracing::debug!(%url, "requesting sensor data");

        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await?;
        tracing::debug!(%body, "provider response");

        parse_sensor_response(&body)
    }
}
