//! In-memory reading store.
//!
//! [`MemoryStore`] keeps readings in a process-local buffer. Its lifetime is
//! the lifetime of the value: nothing is written to disk and a restart starts
//! from empty. It serves two roles:
//!
//! - the `memory` storage backend of the API server
//! - the fallback buffer a reading service writes to while its real source
//!   is unreachable

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use time::OffsetDateTime;
use tracing::debug;

use gasoo_types::{Reading, validate_level};

use crate::error::Result;
use crate::queries::ReadingQuery;
use crate::traits::ReadingStore;

/// A process-scoped, non-durable reading store.
#[derive(Debug)]
pub struct MemoryStore {
    /// Readings in insertion order (oldest at the front).
    readings: Mutex<VecDeque<Reading>>,
    next_id: AtomicI64,
    capacity: Option<usize>,
}

impl MemoryStore {
    /// Create an unbounded store.
    pub fn new() -> Self {
        Self {
            readings: Mutex::new(VecDeque::new()),
            next_id: AtomicI64::new(1),
            capacity: None,
        }
    }

    /// Create a store that keeps at most `capacity` readings.
    ///
    /// Once full, each insert evicts the oldest reading.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            readings: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            next_id: AtomicI64::new(1),
            capacity: Some(capacity.max(1)),
        }
    }

    /// Insert a reading with an explicit timestamp.
    pub fn insert_at(&self, level: f64, timestamp: OffsetDateTime) -> Result<Reading> {
        let level = validate_level(level)?;
        let reading = Reading {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            level,
            timestamp,
        };

        let mut readings = self.lock();
        if let Some(capacity) = self.capacity {
            while readings.len() >= capacity {
                readings.pop_front();
            }
        }
        readings.push_back(reading.clone());
        debug!("Buffered reading {} in memory (level={:.1})", reading.id, level);

        Ok(reading)
    }

    /// Query buffered readings with filters.
    pub fn query_readings(&self, query: &ReadingQuery) -> Vec<Reading> {
        let mut matching: Vec<Reading> = self
            .lock()
            .iter()
            .filter(|r| query.matches(r.timestamp))
            .cloned()
            .collect();

        matching.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        if query.newest_first {
            matching.reverse();
        }
        if let Some(limit) = query.limit {
            matching.truncate(limit as usize);
        }

        matching
    }

    /// Number of buffered readings.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Reading>> {
        // A panic while holding the lock cannot leave the deque half-written.
        self.readings.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadingStore for MemoryStore {
    fn insert(&self, level: f64) -> Result<Reading> {
        self.insert_at(level, OffsetDateTime::now_utc())
    }

    fn list(&self, limit: u32) -> Result<Vec<Reading>> {
        Ok(self.query_readings(&ReadingQuery::new().limit(limit)))
    }

    fn latest(&self) -> Result<Option<Reading>> {
        Ok(self.query_readings(&ReadingQuery::new().limit(1)).pop())
    }

    fn count(&self) -> Result<u64> {
        Ok(self.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;
    use time::macros::datetime;

    #[test]
    fn test_empty_store() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert!(store.latest().unwrap().is_none());
        assert!(store.list(30).unwrap().is_empty());
    }

    #[test]
    fn test_insert_then_latest() {
        let store = MemoryStore::new();
        store.insert(50.0).unwrap();
        store.insert(49.8).unwrap();

        let latest = store.latest().unwrap().unwrap();
        assert_eq!(latest.level, 49.8);
        assert_eq!(latest.id, 2);
    }

    #[test]
    fn test_list_newest_first_with_limit() {
        let store = MemoryStore::new();
        let base = datetime!(2026-10-01 00:00 UTC);
        for i in 0..35 {
            store.insert_at(50.0, base + Duration::minutes(i)).unwrap();
        }

        let readings = store.list(30).unwrap();
        assert_eq!(readings.len(), 30);
        assert_eq!(readings[0].timestamp, base + Duration::minutes(34));
        assert!(
            readings
                .windows(2)
                .all(|w| w[0].timestamp > w[1].timestamp)
        );
    }

    #[test]
    fn test_rejects_invalid_level() {
        let store = MemoryStore::new();
        assert!(store.insert(f64::NAN).unwrap_err().is_validation());
        assert!(store.insert(101.0).unwrap_err().is_validation());
        assert!(store.is_empty());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let store = MemoryStore::with_capacity(3);
        for level in [10.0, 20.0, 30.0, 40.0] {
            store.insert(level).unwrap();
        }

        assert_eq!(store.len(), 3);
        let levels: Vec<f64> = store.list(10).unwrap().into_iter().map(|r| r.level).collect();
        assert_eq!(levels, vec![40.0, 30.0, 20.0]);
    }

    #[test]
    fn test_usable_as_trait_object() {
        let store: Box<dyn ReadingStore> = Box::new(MemoryStore::new());
        store.insert(33.3).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }
}
