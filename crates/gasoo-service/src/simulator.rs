//! Background usage simulator.
//!
//! Stands in for a real sensor: while the valve is open, each tick lowers
//! the latest level by a small random amount and stores the result.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use time::OffsetDateTime;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use gasoo_types::{MIN_LEVEL, Reading};

use crate::state::AppState;

/// Smallest simulated drop per tick, in percent.
pub const MIN_DRAIN: f64 = 0.1;
/// Upper bound (exclusive) of the simulated drop per tick, in percent.
pub const MAX_DRAIN: f64 = 0.3;

/// Background task that drains the simulated cylinder.
pub struct Simulator {
    state: Arc<AppState>,
}

impl Simulator {
    /// Create a new simulator.
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Start the simulator in the background.
    ///
    /// Returns immediately. The task runs until
    /// [`SimulatorState::signal_stop`](crate::state::SimulatorState::signal_stop)
    /// is called.
    pub async fn start(&self) {
        let config = self.state.config.read().await.simulation.clone();
        if !config.enabled {
            info!("Usage simulator disabled in configuration");
            return;
        }

        let state = Arc::clone(&self.state);
        state.simulator.reset_stop();
        state.simulator.set_running(true);

        tokio::spawn(async move {
            run(state, Duration::from_secs(config.interval_secs), config.initial_level).await;
        });
    }
}

async fn run(state: Arc<AppState>, period: Duration, initial_level: f64) {
    info!(
        "Starting usage simulator (interval: {}s, initial level: {:.1}%)",
        period.as_secs(),
        initial_level
    );

    let mut stop_rx = state.simulator.subscribe_stop();
    let mut rng = StdRng::from_os_rng();
    let mut interval_timer = interval(period);
    // The first tick completes immediately; skip it so the first drain
    // happens one full period after startup.
    interval_timer.tick().await;
    let mut consecutive_failures = 0u32;

    loop {
        tokio::select! {
            _ = interval_timer.tick() => {}
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    info!("Usage simulator stopped");
                    break;
                }
                continue;
            }
        }

        match tick(&state, initial_level, &mut rng).await {
            Ok(Some(reading)) => {
                consecutive_failures = 0;
                debug!("Simulated reading {}: level={:.1}", reading.id, reading.level);
            }
            Ok(None) => {
                debug!("Valve closed, skipping simulated usage");
            }
            Err(e) => {
                consecutive_failures += 1;
                if consecutive_failures <= 3 {
                    warn!("Failed to store simulated reading: {} (attempt {})", e, consecutive_failures);
                } else if consecutive_failures == 4 {
                    error!(
                        "Failed to store simulated reading after {} attempts, will continue trying silently",
                        consecutive_failures
                    );
                }
            }
        }
    }

    state.simulator.set_running(false);
}

/// Run one simulation step.
///
/// Returns `Ok(None)` when the valve is closed and nothing was consumed.
pub async fn tick<R: Rng + ?Sized>(
    state: &AppState,
    initial_level: f64,
    rng: &mut R,
) -> Result<Option<Reading>, SimulatorError> {
    let now = OffsetDateTime::now_utc();

    if !state.valve.read().await.state.is_open() {
        let mut stats = state.simulator.stats.write().await;
        stats.skipped_closed += 1;
        stats.last_tick_at = Some(now);
        return Ok(None);
    }

    let drain: f64 = rng.random_range(MIN_DRAIN..MAX_DRAIN);
    let result = {
        let store = state.store.lock().await;
        store.latest().and_then(|latest| {
            let current = latest.map_or(initial_level, |r| r.level);
            store.insert(next_level(current, drain))
        })
    };

    let mut stats = state.simulator.stats.write().await;
    stats.last_tick_at = Some(now);
    match result {
        Ok(reading) => {
            stats.inserted += 1;
            stats.last_level = Some(reading.level);
            stats.last_error = None;
            Ok(Some(reading))
        }
        Err(e) => {
            stats.failures += 1;
            stats.last_error = Some(e.to_string());
            Err(SimulatorError::Store(e))
        }
    }
}

/// Lower `current` by `drain`, never going below empty.
pub fn next_level(current: f64, drain: f64) -> f64 {
    (current - drain).max(MIN_LEVEL)
}

/// Simulator errors.
#[derive(Debug, thiserror::Error)]
pub enum SimulatorError {
    #[error("Failed to store: {0}")]
    Store(gasoo_store::Error),
}
