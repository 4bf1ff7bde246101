//! Resilient access to readings.
//!
//! [`ReadingService`] wraps a [`ReadingSource`] and never surfaces its
//! failures. When the source errors, the failure is logged and the
//! service's [`DegradedPolicy`] decides what the caller sees.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use gasoo_store::{DEFAULT_LIST_LIMIT, MemoryStore, ReadingStore};
use gasoo_types::{Reading, validate_level};

use crate::source::ReadingSource;

/// What a [`ReadingService`] returns while its source is failing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegradedPolicy {
    /// Report "no data": `None` and empty lists. Failed writes are dropped.
    #[default]
    Empty,
    /// Serve the process-local fallback buffer. Failed writes go into it.
    Placeholder,
}

impl fmt::Display for DegradedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradedPolicy::Empty => write!(f, "empty"),
            DegradedPolicy::Placeholder => write!(f, "placeholder"),
        }
    }
}

impl FromStr for DegradedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "empty" => Ok(DegradedPolicy::Empty),
            "placeholder" => Ok(DegradedPolicy::Placeholder),
            _ => Err(format!(
                "Invalid policy: {}. Use 'empty' or 'placeholder'",
                s
            )),
        }
    }
}

/// Reading access that absorbs source failures.
///
/// Every call makes one attempt against the source. Nothing is retried and
/// the fallback buffer is never replayed to the source.
pub struct ReadingService<S> {
    source: S,
    policy: DegradedPolicy,
    fallback: MemoryStore,
    degraded: AtomicBool,
    history_limit: u32,
}

impl<S: ReadingSource> ReadingService<S> {
    /// Wrap a source.
    pub fn new(source: S, policy: DegradedPolicy) -> Self {
        Self {
            source,
            policy,
            fallback: MemoryStore::new(),
            degraded: AtomicBool::new(false),
            history_limit: DEFAULT_LIST_LIMIT,
        }
    }

    /// Set how many readings [`get_readings`](Self::get_readings) asks for.
    pub fn with_history_limit(mut self, limit: u32) -> Self {
        self.history_limit = limit;
        self
    }

    /// Replace the fallback buffer, e.g. with a bounded one.
    pub fn with_fallback(mut self, fallback: MemoryStore) -> Self {
        self.fallback = fallback;
        self
    }

    /// The configured degraded-mode policy.
    pub fn policy(&self) -> DegradedPolicy {
        self.policy
    }

    /// The wrapped source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The process-local fallback buffer.
    pub fn fallback(&self) -> &MemoryStore {
        &self.fallback
    }

    /// Whether the most recent call had to fall back.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    /// The newest reading, or `None` when there is none or the source failed
    /// under [`DegradedPolicy::Empty`].
    pub async fn get_latest_reading(&self) -> Option<Reading> {
        match self.source.latest().await {
            Ok(reading) => {
                self.mark_healthy();
                reading
            }
            Err(e) => {
                warn!("Failed to fetch latest reading: {}", e);
                self.mark_degraded();
                match self.policy {
                    DegradedPolicy::Empty => None,
                    DegradedPolicy::Placeholder => self.fallback.latest().ok().flatten(),
                }
            }
        }
    }

    /// Recent readings, newest first. Empty when there are none or the
    /// source failed under [`DegradedPolicy::Empty`].
    pub async fn get_readings(&self) -> Vec<Reading> {
        match self.source.readings(self.history_limit).await {
            Ok(readings) => {
                self.mark_healthy();
                readings
            }
            Err(e) => {
                warn!("Failed to fetch readings: {}", e);
                self.mark_degraded();
                match self.policy {
                    DegradedPolicy::Empty => Vec::new(),
                    DegradedPolicy::Placeholder => {
                        self.fallback.list(self.history_limit).unwrap_or_default()
                    }
                }
            }
        }
    }

    /// Record a new reading.
    ///
    /// Returns the stored reading, the buffered reading when the source
    /// failed under [`DegradedPolicy::Placeholder`], or `None` when the
    /// level is invalid or the sample was dropped.
    pub async fn add_reading(&self, level: f64) -> Option<Reading> {
        if let Err(e) = validate_level(level) {
            warn!("Rejected reading: {}", e);
            return None;
        }

        match self.source.add(level).await {
            Ok(reading) => {
                self.mark_healthy();
                Some(reading)
            }
            Err(e) => {
                warn!("Failed to add reading: {}", e);
                self.mark_degraded();
                match self.policy {
                    DegradedPolicy::Empty => None,
                    DegradedPolicy::Placeholder => match self.fallback.insert(level) {
                        Ok(reading) => {
                            debug!("Reading buffered locally ({} pending)", self.fallback.len());
                            Some(reading)
                        }
                        Err(e) => {
                            warn!("Failed to buffer reading: {}", e);
                            None
                        }
                    },
                }
            }
        }
    }

    fn mark_healthy(&self) {
        if self.degraded.swap(false, Ordering::SeqCst) {
            debug!("Reading source recovered");
        }
    }

    fn mark_degraded(&self) {
        self.degraded.store(true, Ordering::SeqCst);
    }
}
