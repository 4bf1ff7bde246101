//! Validation errors for reading payloads.

use thiserror::Error;

/// Errors raised when a reading payload fails validation at the insert boundary.
///
/// This enum is marked `#[non_exhaustive]` so new checks can be added without
/// breaking downstream matches.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// The payload carried no `level` field.
    #[error("level is required")]
    MissingLevel,

    /// The level was NaN or infinite.
    #[error("level must be a finite number")]
    NonFiniteLevel,

    /// The level fell outside the `0..=100` percent range.
    #[error("level {0} is out of range (expected 0 to 100)")]
    LevelOutOfRange(f64),
}
