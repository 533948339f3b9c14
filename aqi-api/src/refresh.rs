//! Refresh cycle: fetch → convert → cache write
//!
//! ```text
//!            StartupTrigger / ScheduledTrigger
//!   Idle ─────────────────────────────────────▶ Running
//!    ▲                                              │
//!    └──────────── success or failure ──────────────┘
//! ```
//!
//! A trigger that arrives while a cycle is `Running` is dropped. Failures are
//! logged and counted; the cached value is left as it was.

use std::{
    fmt,
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use aqi_core::{AqiConversion, ConversionError, convert_detailed};
use thiserror::Error;
use tracing::Instrument;

use crate::cache::AqiCacheWriter;
use crate::fetcher::{FetchError, SensorSource};

/// What started a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Startup,
    Scheduled,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Startup => f.write_str("startup"),
            Trigger::Scheduled => f.write_str("scheduled"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Running,
}

/// Why a cycle failed
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CycleError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    #[error("cycle timed out after {0:?}")]
    TimedOut(Duration),
}

/// Result of one trigger
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// The cache now holds this conversion.
    Updated(AqiConversion),
    /// The cache was left untouched.
    Failed {
        error: CycleError,
        consecutive_failures: u32,
    },
    /// Another cycle was already running.
    Skipped,
}

/// Resets the in-flight flag when a cycle ends, however it ends.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives fetch → convert → cache write for one sensor.
pub struct RefreshCycle<S> {
    source: S,
    sensor_id: String,
    api_key: String,
    cache: AqiCacheWriter,
    timeout: Duration,
    running: AtomicBool,
}

impl<S: SensorSource> RefreshCycle<S> {
    pub fn new(
        source: S,
        sensor_id: impl Into<String>,
        api_key: impl Into<String>,
        cache: AqiCacheWriter,
        timeout: Duration,
    ) -> Self {
        Self {
            source,
            sensor_id: sensor_id.into(),
            api_key: api_key.into(),
            cache,
            timeout,
            running: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> CycleState {
        if self.running.load(Ordering::Acquire) {
            CycleState::Running
        } else {
            CycleState::Idle
        }
    }

    fn try_begin(&self) -> Option<RunningGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunningGuard(&self.running))
    }

    /// Run one cycle, or skip if one is already in flight.
    pub async fn run(&self, trigger: Trigger) -> CycleOutcome {
        let Some(_guard) = self.try_begin() else {
            tracing::warn!(%trigger, "refresh already in flight, dropping trigger");
            return CycleOutcome::Skipped;
        };

        let span = tracing::info_span!("refresh", %trigger, sensor = %self.sensor_id);
        self.run_guarded().instrument(span).await
    }

    async fn run_guarded(&self) -> CycleOutcome {
        let result = match tokio::time::timeout(self.timeout, self.fetch_and_convert()).await {
            Ok(result) => result,
            Err(_) => Err(CycleError::TimedOut(self.timeout)),
        };

        match result {
            Ok(conversion) => CycleOutcome::Updated(conversion),
            Err(error) => {
                let consecutive_failures = self.cache.record_failure();
                tracing::error!(%error, consecutive_failures, "refresh failed, keeping previous AQI");
                let snapshot = self.cache.snapshot();
                if snapshot.stale {
                    tracing::warn!(
                        aqi = snapshot.aqi,
                        updated_at = ?snapshot.updated_at,
                        "cached AQI is stale"
                    );
                }
                CycleOutcome::Failed {
                    error,
                    consecutive_failures,
                }
            }
        }
    }

    async fn fetch_and_convert(&self) -> Result<AqiConversion, CycleError> {
        let reading = self.source.fetch(&self.sensor_id, &self.api_key).await?;
        let conversion = convert_detailed(reading.pm25_24hr_average)?;

        if conversion.saturated {
            tracing::warn!(
                pm25 = conversion.pm25,
                aqi = conversion.aqi,
                "PM2.5 above the top of the breakpoint table, AQI extrapolated"
            );
        }

        self.cache.record_success(&conversion, &reading);
        tracing::info!(
            pm25 = conversion.pm25,
            aqi = conversion.aqi,
            category = %conversion.category,
            source_timestamp = %reading.timestamp,
            "AQI updated"
        );
        Ok(conversion)
    }
}
