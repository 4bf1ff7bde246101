//! Interval-driven dashboard refresh.
//!
//! A [`Dashboard`] turns what the [`ReadingService`] returns into a
//! renderable [`DashboardSnapshot`]. [`DashboardPoller`] runs that refresh
//! on a timer in a background task and publishes each snapshot on a
//! `watch` channel.

use std::time::Duration;

use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info};

use gasoo_types::usage::{average_daily_usage, days_remaining, usage_samples};
use gasoo_types::{DEFAULT_TANK_CAPACITY, LevelStatus, UsageSample};

use crate::placeholder::{PLACEHOLDER_DAYS, placeholder_usage};
use crate::service::{DegradedPolicy, ReadingService};
use crate::source::ReadingSource;

/// Level shown before any reading has been seen.
pub const DEFAULT_INITIAL_LEVEL: f64 = 35.0;

/// Dashboard settings.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Tank units represented by a 100% reading.
    pub tank_capacity: f64,
    /// Level reported until the first reading arrives.
    pub initial_level: f64,
    /// Days of placeholder history shown in degraded mode.
    pub placeholder_days: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            tank_capacity: DEFAULT_TANK_CAPACITY,
            initial_level: DEFAULT_INITIAL_LEVEL,
            placeholder_days: PLACEHOLDER_DAYS,
        }
    }
}

/// Everything a dashboard view needs for one render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    /// Current fill level in percent.
    pub level: f64,
    pub status: LevelStatus,
    /// Usage history, oldest day first.
    pub usage: Vec<UsageSample>,
    pub average_daily_usage: f64,
    pub days_remaining: f64,
    /// Whether the reading source failed during this refresh.
    pub degraded: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Dashboard state: the reading service plus the last known level.
pub struct Dashboard<S> {
    service: ReadingService<S>,
    config: DashboardConfig,
    level: f64,
}

impl<S: ReadingSource> Dashboard<S> {
    /// Create a dashboard over a reading service.
    pub fn new(service: ReadingService<S>, config: DashboardConfig) -> Self {
        let level = config.initial_level;
        Self {
            service,
            config,
            level,
        }
    }

    /// The underlying reading service.
    pub fn service(&self) -> &ReadingService<S> {
        &self.service
    }

    /// The last known level.
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Fetch the latest reading and history and recompute the estimate.
    ///
    /// Never fails. Without a latest reading the previous level is kept.
    /// Placeholder samples replace an empty history only when the source
    /// failed during this refresh and the policy is
    /// [`DegradedPolicy::Placeholder`]. A healthy empty source yields no usage
    /// and the unlimited days-remaining sentinel.
    pub async fn refresh(&mut self) -> DashboardSnapshot {
        let latest = self.service.get_latest_reading().await;
        let mut degraded = self.service.is_degraded();
        let readings = self.service.get_readings().await;
        degraded |= self.service.is_degraded();

        if let Some(reading) = latest {
            self.level = reading.level;
        }

        let mut usage = usage_samples(&readings, self.config.tank_capacity);
        if usage.is_empty()
            && degraded
            && self.service.policy() == DegradedPolicy::Placeholder
        {
            let today = OffsetDateTime::now_utc().date();
            usage = placeholder_usage(self.config.placeholder_days, today, &mut rand::rng());
        }

        let average = average_daily_usage(&usage);
        let snapshot = DashboardSnapshot {
            level: self.level,
            status: LevelStatus::from_level(self.level),
            days_remaining: days_remaining(self.level, average, self.config.tank_capacity),
            average_daily_usage: average,
            usage,
            degraded,
            updated_at: OffsetDateTime::now_utc(),
        };

        debug!(
            "Dashboard refreshed: level={:.1}% avg={:.1} days={:.1}",
            snapshot.level, snapshot.average_daily_usage, snapshot.days_remaining
        );
        snapshot
    }
}

/// Handle to a background task refreshing a [`Dashboard`] on an interval.
pub struct DashboardPoller<S> {
    snapshot_rx: watch::Receiver<Option<DashboardSnapshot>>,
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<Dashboard<S>>,
}

impl<S: ReadingSource + 'static> DashboardPoller<S> {
    /// Start refreshing `dashboard` every `period`.
    ///
    /// The first refresh happens immediately.
    pub fn spawn(mut dashboard: Dashboard<S>, period: Duration) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let (stop_tx, mut stop_rx) = watch::channel(false);

        info!("Starting dashboard refresh (interval: {}s)", period.as_secs());

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = stop_rx.changed() => {
                        info!("Dashboard refresh stopped");
                        break;
                    }
                }

                // An in-flight refresh always completes; stop only takes
                // effect between ticks.
                let snapshot = dashboard.refresh().await;
                snapshot_tx.send_replace(Some(snapshot));
            }

            dashboard
        });

        Self {
            snapshot_rx,
            stop_tx,
            handle,
        }
    }

    /// Receiver for published snapshots. Holds `None` until the first refresh.
    pub fn subscribe(&self) -> watch::Receiver<Option<DashboardSnapshot>> {
        self.snapshot_rx.clone()
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> Option<DashboardSnapshot> {
        self.snapshot_rx.borrow().clone()
    }

    /// Signal the task to stop. Future ticks are cancelled.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Stop the task and wait for it, returning the dashboard.
    pub async fn join(self) -> Result<Dashboard<S>, tokio::task::JoinError> {
        self.stop();
        self.handle.await
    }
}
