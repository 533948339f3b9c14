//! Shared AQI cache
//!
//! A single slot holding the latest computed AQI. The refresh cycle owns the
//! only [`AqiCacheWriter`]; request handlers get cloned [`AqiCache`] readers.
//! The lock is held only for the copy in or out, never across I/O.

use std::{
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

use aqi_core::{AqiCategory, AqiConversion, SensorReading};
use chrono::{DateTime, TimeDelta, Utc};

/// Value served before the first successful refresh.
pub const NO_DATA: i32 = -1;

#[derive(Debug, Clone)]
struct CacheState {
    aqi: i32,
    category: Option<AqiCategory>,
    source_timestamp: Option<String>,
    updated_at: Option<DateTime<Utc>>,
    consecutive_failures: u32,
}

impl Default for CacheState {
    fn default() -> Self {
        Self {
            aqi: NO_DATA,
            category: None,
            source_timestamp: None,
            updated_at: None,
            consecutive_failures: 0,
        }
    }
}

#[derive(Debug)]
struct Shared {
    state: RwLock<CacheState>,
    stale_after: TimeDelta,
    /// Staleness reference until the first success
    created_at: DateTime<Utc>,
}

impl Shared {
    fn read(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot_at(&self, now: DateTime<Utc>) -> CacheSnapshot {
        let state = self.read().clone();
        let since = state.updated_at.unwrap_or(self.created_at);
        let stale = now.signed_duration_since(since) > self.stale_after;
        CacheSnapshot {
            aqi: state.aqi,
            category: state.category,
            source_timestamp: state.source_timestamp,
            updated_at: state.updated_at,
            consecutive_failures: state.consecutive_failures,
            stale,
        }
    }
}

/// A consistent copy of the cache contents.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSnapshot {
    pub aqi: i32,
    pub category: Option<AqiCategory>,
    /// Provider timestamp of the reading behind `aqi`
    pub source_timestamp: Option<String>,
    /// When `aqi` was last written
    pub updated_at: Option<DateTime<Utc>>,
    /// Failed refresh cycles since the last success
    pub consecutive_failures: u32,
    /// No successful refresh within the staleness window
    pub stale: bool,
}

impl CacheSnapshot {
    /// True once a refresh has succeeded.
    pub fn is_ready(&self) -> bool {
        self.updated_at.is_some()
    }
}

/// Create the cache, returning its single writer and a reader.
///
/// `stale_after` is how long a value may go without a refresh before
/// snapshots report it as stale. Before the first success it is measured
/// from creation.
pub fn shared(stale_after: Duration) -> (AqiCacheWriter, AqiCache) {
    let inner = Arc::new(Shared {
        state: RwLock::new(CacheState::default()),
        stale_after: TimeDelta::from_std(stale_after).unwrap_or(TimeDelta::MAX),
        created_at: Utc::now(),
    });
    (
        AqiCacheWriter {
            inner: Arc::clone(&inner),
        },
        AqiCache { inner },
    )
}

/// Read handle. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AqiCache {
    inner: Arc<Shared>,
}

impl AqiCache {
    /// Current AQI, or [`NO_DATA`].
    pub fn get(&self) -> i32 {
        self.inner.read().aqi
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        self.inner.snapshot_at(Utc::now())
    }

    pub fn snapshot_at(&self, now: DateTime<Utc>) -> CacheSnapshot {
        self.inner.snapshot_at(now)
    }
}

/// Write handle, owned by the refresh cycle.
#[derive(Debug)]
pub struct AqiCacheWriter {
    inner: Arc<Shared>,
}

impl AqiCacheWriter {
    /// Store a bare AQI value. It has no source reading, so any previous
    /// source timestamp is cleared.
    pub fn set(&self, value: i32) {
        let mut state = self.inner.write();
        state.aqi = value;
        state.category = Some(AqiCategory::from_aqi(value));
        state.source_timestamp = None;
        state.updated_at = Some(Utc::now());
        state.consecutive_failures = 0;
    }

    /// Store a successful conversion along with the reading it came from.
    pub fn record_success(&self, conversion: &AqiConversion, reading: &SensorReading) {
        let mut state = self.inner.write();
        state.aqi = conversion.aqi;
        state.category = Some(conversion.category);
        state.source_timestamp = Some(reading.timestamp.clone());
        state.updated_at = Some(Utc::now());
        state.consecutive_failures = 0;
    }

    /// Count a failed cycle. The cached value is left untouched.
    /// Returns the number of failures in a row.
    pub fn record_failure(&self) -> u32 {
        let mut state = self.inner.write();
        state.consecutive_failures = state.consecutive_failures.saturating_add(1);
        state.consecutive_failures
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        self.inner.snapshot_at(Utc::now())
    }

    /// A new reader onto the same slot.
    pub fn reader(&self) -> AqiCache {
        AqiCache {
            inner: Arc::clone(&self.inner),
        }
    }
}
