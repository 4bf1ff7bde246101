//! The storage contract shared by every reading backend.

use gasoo_types::Reading;

use crate::error::Result;

/// Number of readings returned by a listing when no limit is given.
pub const DEFAULT_LIST_LIMIT: u32 = 30;

/// Persistence contract for gas-level readings.
///
/// Readings are append-only: there is no update or delete. Implementations
/// assign the identifier and stamp the reading with the current time.
pub trait ReadingStore: Send {
    /// Validate `level` and store it with the current time.
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) for levels
    /// outside `0..=100`.
    fn insert(&self, level: f64) -> Result<Reading>;

    /// At most `limit` readings, newest first.
    fn list(&self, limit: u32) -> Result<Vec<Reading>>;

    /// The newest reading, or `None` if nothing has been stored yet.
    fn latest(&self) -> Result<Option<Reading>>;

    /// Total number of stored readings.
    fn count(&self) -> Result<u64>;
}
