//! Shared types for the Gasoo gas-cylinder monitor.
//!
//! This crate holds the data model that every other Gasoo crate speaks:
//! stored [`Reading`]s, derived [`UsageSample`]s, the [`LevelStatus`] badge
//! and the remote [`ValveState`]. It also contains the usage estimator in
//! [`usage`], which is pure and has no I/O.
//!
//! # Example
//!
//! ```
//! use gasoo_types::usage::{average_daily_usage, days_remaining};
//! use gasoo_types::UsageSample;
//!
//! let samples = vec![
//!     UsageSample::new("Oct 13", 10.0),
//!     UsageSample::new("Oct 14", 20.0),
//! ];
//! let avg = average_daily_usage(&samples);
//! assert_eq!(avg, 15.0);
//! assert_eq!(days_remaining(45.0, avg, 100.0), 3.0);
//! ```

pub mod error;
pub mod types;
pub mod usage;

pub use error::ValidationError;
pub use types::{
    DEFAULT_TANK_CAPACITY, LevelStatus, MAX_LEVEL, MIN_LEVEL, NewReading, Reading, UsageSample,
    ValveState, validate_level,
};
