//! Recurring refresh triggers
//!
//! One startup trigger immediately, then a trigger every `period` starting
//! at the next whole hour. Each trigger runs the cycle on its own task so a
//! slow cycle never delays the ticker; overlapping triggers are dropped by
//! the cycle's in-flight guard.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, TimeDelta, Utc};
use tokio::{
    sync::watch,
    task::JoinSet,
    time::{Instant, MissedTickBehavior},
};

use crate::fetcher::SensorSource;
use crate::refresh::{CycleOutcome, RefreshCycle, Trigger};

const HOUR_SECS: i64 = 3600;

/// The next whole hour strictly after `now`.
pub fn next_hour_boundary(now: DateTime<Utc>) -> DateTime<Utc> {
    let next = (now.timestamp().div_euclid(HOUR_SECS) + 1) * HOUR_SECS;
    DateTime::from_timestamp(next, 0).unwrap_or(now + TimeDelta::hours(1))
}

/// When the first scheduled trigger fires and how often after that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    /// Delay from start to the first scheduled trigger
    pub first_delay: Duration,
    pub period: Duration,
}

impl Schedule {
    /// First trigger at the next whole hour after `now`.
    pub fn aligned_to_next_hour(now: DateTime<Utc>, period: Duration) -> Self {
        let first_delay = (next_hour_boundary(now) - now)
            .to_std()
            .unwrap_or(Duration::ZERO);
        Self {
            first_delay,
            period,
        }
    }
}

fn spawn_cycle<S>(tasks: &mut JoinSet<CycleOutcome>, cycle: &Arc<RefreshCycle<S>>, trigger: Trigger)
where
    S: SensorSource + 'static,
{
    let cycle = Arc::clone(cycle);
    tasks.spawn(async move { cycle.run(trigger).await });
}

/// Run triggers until `shutdown` flips (or its sender is dropped).
///
/// On shutdown, an in-flight cycle gets `grace` to finish before it is
/// abandoned.
pub async fn run_scheduler<S>(
    cycle: Arc<RefreshCycle<S>>,
    schedule: Schedule,
    mut shutdown: watch::Receiver<bool>,
    grace: Duration,
) where
    S: SensorSource + 'static,
{
    let mut tasks = JoinSet::new();
    spawn_cycle(&mut tasks, &cycle, Trigger::Startup);

    tracing::info!(
        first_in = ?schedule.first_delay,
        period = ?schedule.period,
        "scheduler started"
    );

    let mut ticker = tokio::time::interval_at(Instant::now() + schedule.first_delay, schedule.period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                while tasks.try_join_next().is_some() {}
                spawn_cycle(&mut tasks, &cycle, Trigger::Scheduled);
            }
            _ = shutdown.changed() => break,
        }
    }

    tracing::info!("scheduler stopping");
    let drain = async { while tasks.join_next().await.is_some() {} };
    if tokio::time::timeout(grace, drain).await.is_err() {
        tracing::warn!(?grace, "abandoning in-flight refresh");
        tasks.abort_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache;
    use crate::fetcher::FetchError;
    use aqi_core::SensorReading;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_next_hour_boundary() {
        let now = Utc.with_ymd_and_hms(2024, 6, 20, 14, 37, 12).unwrap();
        assert_eq!(
            next_hour_boundary(now),
            Utc.with_ymd_and_hms(2024, 6, 20, 15, 0, 0).unwrap()
        );

        let on_the_hour = Utc.with_ymd_and_hms(2024, 6, 20, 15, 0, 0).unwrap();
        assert_eq!(
            next_hour_boundary(on_the_hour),
            Utc.with_ymd_and_hms(2024, 6, 20, 16, 0, 0).unwrap()
        );

        let before_midnight = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(
            next_hour_boundary(before_midnight),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_aligned_schedule() {
        let now = Utc.with_ymd_and_hms(2024, 6, 20, 14, 45, 0).unwrap();
        let schedule = Schedule::aligned_to_next_hour(now, Duration::from_secs(3600));
        assert_eq!(schedule.first_delay, Duration::from_secs(15 * 60));
        assert_eq!(schedule.period, Duration::from_secs(3600));
    }

    /// Counts fetches; each one takes `latency` of (virtual) time.
    struct CountingSource {
        calls: Arc<AtomicUsize>,
        latency: Duration,
    }

    impl SensorSource for CountingSource {
        async fn fetch(&self, sensor_id: &str, _api_key: &str) -> Result<SensorReading, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.latency).await;
            Ok(SensorReading::new(sensor_id, 20.0, "1718900000"))
        }
    }

    fn counting_cycle(latency: Duration) -> (Arc<RefreshCycle<CountingSource>>, Arc<AtomicUsize>, cache::AqiCache) {
        let calls = Arc::new(AtomicUsize::new(0));
        let (writer, reader) = cache::shared(Duration::from_secs(7200));
        let source = CountingSource {
            calls: calls.clone(),
            latency,
        };
        let cycle = RefreshCycle::new(source, "1", "k", writer, Duration::from_secs(300));
        (Arc::new(cycle), calls, reader)
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_then_periodic_triggers() {
        let (cycle, calls, cache) = counting_cycle(Duration::ZERO);
        let (tx, rx) = watch::channel(false);
        let schedule = Schedule {
            first_delay: Duration::from_secs(10),
            period: Duration::from_secs(60),
        };

        let scheduler = tokio::spawn(run_scheduler(cycle, schedule, rx, Duration::from_secs(30)));

        // startup at 0s, then 10s, 70s, 130s
        tokio::time::sleep(Duration::from_secs(135)).await;
        tx.send(true).unwrap();
        scheduler.await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(cache.get(), 71);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_triggers_are_dropped() {
        let (cycle, calls, cache) = counting_cycle(Duration::from_secs(90));
        let (tx, rx) = watch::channel(false);
        let schedule = Schedule {
            first_delay: Duration::from_secs(10),
            period: Duration::from_secs(60),
        };

        let scheduler = tokio::spawn(run_scheduler(cycle, schedule, rx, Duration::from_secs(300)));

        // startup runs 0s..90s, so the 10s and 70s triggers are dropped;
        // the 130s trigger starts a second cycle
        tokio::time::sleep(Duration::from_secs(135)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        tx.send(true).unwrap();
        scheduler.await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.get(), 71);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_abandons_slow_cycle_after_grace() {
        let (cycle, calls, cache) = counting_cycle(Duration::from_secs(3600));
        let (tx, rx) = watch::channel(false);
        let schedule = Schedule {
            first_delay: Duration::from_secs(7200),
            period: Duration::from_secs(3600),
        };

        let scheduler = tokio::spawn(run_scheduler(cycle.clone(), schedule, rx, Duration::from_secs(30)));
        tokio::time::sleep(Duration::from_secs(1)).await;
        tx.send(true).unwrap();
        scheduler.await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get(), cache::NO_DATA);
    }
}
