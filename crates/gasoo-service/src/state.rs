//! Application state shared across handlers.
//!
//! The store sits behind a single async mutex. Handlers and the usage
//! simulator hold it for exactly one store call at a time.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock, watch};

use gasoo_store::ReadingStore;
use gasoo_types::ValveState;

use crate::config::Config;

/// Shared application state.
pub struct AppState {
    /// The reading store, whichever backend was configured.
    pub store: Mutex<Box<dyn ReadingStore>>,
    /// Configuration (RwLock for runtime updates).
    pub config: RwLock<Config>,
    /// Remote valve position.
    pub valve: RwLock<ValveStatus>,
    /// Usage simulator control state.
    pub simulator: SimulatorState,
}

impl AppState {
    /// Create new application state around any store backend.
    pub fn new<S: ReadingStore + 'static>(store: S, config: Config) -> Arc<Self> {
        Self::with_boxed_store(Box::new(store), config)
    }

    /// Create new application state from an already boxed store.
    pub fn with_boxed_store(store: Box<dyn ReadingStore>, config: Config) -> Arc<Self> {
        Arc::new(Self {
            store: Mutex::new(store),
            config: RwLock::new(config),
            valve: RwLock::new(ValveStatus::default()),
            simulator: SimulatorState::new(),
        })
    }
}

/// Valve position and when it last changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ValveStatus {
    pub state: ValveState,
    /// `None` until the valve is first switched.
    #[serde(with = "time::serde::rfc3339::option")]
    pub changed_at: Option<OffsetDateTime>,
}

impl ValveStatus {
    /// Switch to `state`. Returns whether the position actually changed.
    pub fn set(&mut self, state: ValveState) -> bool {
        if self.state == state {
            return false;
        }
        self.state = state;
        self.changed_at = Some(OffsetDateTime::now_utc());
        true
    }
}

/// State for tracking and controlling the usage simulator.
pub struct SimulatorState {
    /// Whether the simulator is currently running.
    running: AtomicBool,
    /// When the simulator was started (Unix timestamp).
    started_at: AtomicU64,
    /// Channel to signal the simulator task to stop.
    stop_tx: watch::Sender<bool>,
    /// Receiver for stop signal (cloned by the simulator task).
    stop_rx: watch::Receiver<bool>,
    /// Tick statistics.
    pub stats: RwLock<SimulatorStats>,
}

impl SimulatorState {
    /// Create a new simulator state.
    pub fn new() -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            running: AtomicBool::new(false),
            started_at: AtomicU64::new(0),
            stop_tx,
            stop_rx,
            stats: RwLock::new(SimulatorStats::default()),
        }
    }

    /// Check if the simulator is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Mark the simulator as started or stopped.
    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
        if running {
            let now = OffsetDateTime::now_utc().unix_timestamp() as u64;
            self.started_at.store(now, Ordering::SeqCst);
        }
    }

    /// Get the simulator start time.
    pub fn started_at(&self) -> Option<OffsetDateTime> {
        let ts = self.started_at.load(Ordering::SeqCst);
        if ts == 0 {
            None
        } else {
            OffsetDateTime::from_unix_timestamp(ts as i64).ok()
        }
    }

    /// Get a receiver for the stop signal.
    pub fn subscribe_stop(&self) -> watch::Receiver<bool> {
        self.stop_rx.clone()
    }

    /// Signal the simulator task to stop.
    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(true);
        self.running.store(false, Ordering::SeqCst);
    }

    /// Reset the stop signal (for restarting).
    pub fn reset_stop(&self) {
        let _ = self.stop_tx.send(false);
    }
}

impl Default for SimulatorState {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters reported by the detailed health endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulatorStats {
    /// Readings the simulator has inserted.
    pub inserted: u64,
    /// Ticks skipped because the valve was closed.
    pub skipped_closed: u64,
    /// Ticks that failed to reach the store.
    pub failures: u64,
    /// Level of the last simulated reading.
    pub last_level: Option<f64>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_tick_at: Option<OffsetDateTime>,
    pub last_error: Option<String>,
}
