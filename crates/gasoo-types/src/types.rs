//! Core types for Gasoo reading data.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::ValidationError;

/// Lowest accepted fill level, in percent.
pub const MIN_LEVEL: f64 = 0.0;

/// Highest accepted fill level, in percent.
pub const MAX_LEVEL: f64 = 100.0;

/// Default tank capacity used to turn a percentage into gas units.
pub const DEFAULT_TANK_CAPACITY: f64 = 100.0;

/// A single timestamped gas-level sample as stored by a reading store.
///
/// Readings are immutable once stored. The `id` is assigned by the store and
/// is only guaranteed to be unique within that store.
///
/// On the wire the identifier is named `_id`:
///
/// ```json
/// { "_id": 7, "level": 42.5, "timestamp": "2026-10-14T08:30:00Z" }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    /// Store-assigned identifier.
    #[cfg_attr(feature = "serde", serde(rename = "_id"))]
    pub id: i64,
    /// Fill level in percent (`0..=100`).
    pub level: f64,
    /// When the reading was stored.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub timestamp: OffsetDateTime,
}

impl Reading {
    /// Status badge for this reading's level.
    #[must_use]
    pub fn status(&self) -> LevelStatus {
        LevelStatus::from_level(self.level)
    }
}

/// Insert payload for a new reading.
///
/// `level` is optional so that a missing field can be reported as a
/// [`ValidationError::MissingLevel`] instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NewReading {
    /// Fill level in percent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub level: Option<f64>,
}

impl NewReading {
    /// Create a payload carrying the given level.
    pub fn new(level: f64) -> Self {
        Self { level: Some(level) }
    }

    /// Validate the payload and return the accepted level.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingLevel`] when `level` is absent, or
    /// the error from [`validate_level`] otherwise.
    pub fn validate(&self) -> Result<f64, ValidationError> {
        let level = self.level.ok_or(ValidationError::MissingLevel)?;
        validate_level(level)
    }
}

/// Check that a level is finite and within `MIN_LEVEL..=MAX_LEVEL`.
///
/// Out-of-range values are rejected, not clamped.
///
/// ```
/// use gasoo_types::{validate_level, ValidationError};
///
/// assert_eq!(validate_level(42.0), Ok(42.0));
/// assert_eq!(validate_level(-1.0), Err(ValidationError::LevelOutOfRange(-1.0)));
/// assert_eq!(validate_level(f64::NAN), Err(ValidationError::NonFiniteLevel));
/// ```
pub fn validate_level(level: f64) -> Result<f64, ValidationError> {
    if !level.is_finite() {
        return Err(ValidationError::NonFiniteLevel);
    }
    if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
        return Err(ValidationError::LevelOutOfRange(level));
    }
    Ok(level)
}

/// One point of the usage history chart.
///
/// Derived from readings on every fetch cycle and never persisted.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UsageSample {
    /// Day label, formatted as `"Mon DD"` (e.g. `"Oct 14"`).
    pub date: String,
    /// Gas consumed on that day, in tank units. Never negative.
    pub usage: f64,
}

impl UsageSample {
    /// Create a new sample.
    pub fn new(date: impl Into<String>, usage: f64) -> Self {
        Self {
            date: date.into(),
            usage,
        }
    }
}

/// Fill-level status shown next to the cylinder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LevelStatus {
    /// Above 70%.
    Optimal,
    /// Between 40% and 70% inclusive.
    Adequate,
    /// Below 40%.
    Low,
}

impl LevelStatus {
    /// Classify a fill level.
    ///
    /// ```
    /// use gasoo_types::LevelStatus;
    ///
    /// assert_eq!(LevelStatus::from_level(71.0), LevelStatus::Optimal);
    /// assert_eq!(LevelStatus::from_level(70.0), LevelStatus::Adequate);
    /// assert_eq!(LevelStatus::from_level(40.0), LevelStatus::Adequate);
    /// assert_eq!(LevelStatus::from_level(39.9), LevelStatus::Low);
    /// ```
    #[must_use]
    pub fn from_level(level: f64) -> Self {
        if level > 70.0 {
            LevelStatus::Optimal
        } else if level >= 40.0 {
            LevelStatus::Adequate
        } else {
            LevelStatus::Low
        }
    }
}

impl fmt::Display for LevelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelStatus::Optimal => write!(f, "Optimal"),
            LevelStatus::Adequate => write!(f, "Adequate"),
            LevelStatus::Low => write!(f, "Low"),
        }
    }
}

/// Position of the remote shut-off valve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ValveState {
    /// Gas is flowing.
    #[default]
    Open,
    /// Supply is shut off.
    Closed,
}

impl ValveState {
    /// Whether gas can flow.
    pub fn is_open(self) -> bool {
        matches!(self, ValveState::Open)
    }
}

impl fmt::Display for ValveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValveState::Open => write!(f, "Open"),
            ValveState::Closed => write!(f, "Closed"),
        }
    }
}

impl std::str::FromStr for ValveState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" | "on" => Ok(ValveState::Open),
            "closed" | "close" | "off" => Ok(ValveState::Closed),
            other => Err(format!("unknown valve state '{}'", other)),
        }
    }
}
