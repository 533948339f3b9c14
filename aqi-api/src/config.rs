//! Process configuration
//!
//! Flags fall back to environment variables, which may come from a `.env`
//! file loaded at startup.

use std::{fmt, net::SocketAddr, time::Duration};

use clap::Parser;
use reqwest::Url;
use thiserror::Error;

use crate::fetcher::PURPLEAIR_API_URL;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("invalid provider URL `{url}`: {reason}")]
    ProviderUrl { url: String, reason: String },

    #[error("invalid listen address `{0}`")]
    ListenAddr(String),
}

#[derive(Parser)]
#[command(name = "aqi-api")]
#[command(author = "AQI Contributors")]
#[command(version)]
#[command(about = "Serves the AQI of one PurpleAir sensor", long_about = None)]
pub struct Args {
    /// PurpleAir sensor index to poll
    #[arg(long, env = "SENSOR_ID")]
    pub sensor_id: String,

    /// PurpleAir read API key
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "AQI_API_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8080, env = "AQI_API_PORT")]
    pub port: u16,

    /// Provider base URL
    #[arg(long, default_value = PURPLEAIR_API_URL, env = "AQI_PROVIDER_URL")]
    pub provider_url: String,

    /// Seconds between scheduled refreshes
    #[arg(long, default_value_t = 3600, env = "AQI_REFRESH_INTERVAL_SECS")]
    pub refresh_interval_secs: u64,

    /// Upper bound on one provider request and on one refresh cycle
    #[arg(long, default_value_t = 30, env = "AQI_FETCH_TIMEOUT_SECS")]
    pub fetch_timeout_secs: u64,

    /// Enable CORS for all origins
    #[arg(long, default_value_t = false)]
    pub cors: bool,
}

/// Validated configuration
#[derive(Clone, PartialEq)]
pub struct Config {
    pub sensor_id: String,
    pub api_key: String,
    pub listen_addr: SocketAddr,
    pub provider_url: Url,
    pub refresh_interval: Duration,
    pub fetch_timeout: Duration,
    pub cors: bool,
}

impl Config {
    /// A value is reported stale after two missed refreshes.
    pub fn stale_after(&self) -> Duration {
        self.refresh_interval.saturating_mul(2)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("sensor_id", &self.sensor_id)
            .field("api_key", &"<redacted>")
            .field("listen_addr", &self.listen_addr)
            .field("provider_url", &self.provider_url.as_str())
            .field("refresh_interval", &self.refresh_interval)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("cors", &self.cors)
            .finish()
    }
}

impl TryFrom<Args> for Config {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let sensor_id = args.sensor_id.trim().to_string();
        if sensor_id.is_empty() {
            return Err(ConfigError::Empty("SENSOR_ID"));
        }

        let api_key = args.api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(ConfigError::Empty("API_KEY"));
        }

        if args.refresh_interval_secs == 0 {
            return Err(ConfigError::Zero("refresh interval"));
        }
        if args.fetch_timeout_secs == 0 {
            return Err(ConfigError::Zero("fetch timeout"));
        }

        let provider_url = Url::parse(&args.provider_url).map_err(|e| ConfigError::ProviderUrl {
            url: args.provider_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(provider_url.scheme(), "http" | "https") {
            return Err(ConfigError::ProviderUrl {
                url: args.provider_url,
                reason: "scheme must be http or https".into(),
            });
        }

        let listen = format!("{}:{}", args.host, args.port);
        let listen_addr = listen
            .parse()
            .map_err(|_| ConfigError::ListenAddr(listen))?;

        Ok(Self {
            sensor_id,
            api_key,
            listen_addr,
            provider_url,
            refresh_interval: Duration::from_secs(args.refresh_interval_secs),
            fetch_timeout: Duration::from_secs(args.fetch_timeout_secs),
            cors: args.cors,
        })
    }
}
