//! SQLite-backed reading store.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Row};
use time::OffsetDateTime;
use tracing::{debug, info};

use gasoo_types::{Reading, validate_level};

use crate::error::{Error, Result};
use crate::queries::ReadingQuery;
use crate::schema;
use crate::traits::ReadingStore;

/// SQLite-based store for gas-level readings.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        schema::initialize(&conn)?;

        Ok(Self { conn })
    }

    /// Open the default database location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    /// Insert a reading with an explicit timestamp.
    ///
    /// Used when replaying readings that were captured elsewhere. The level is
    /// validated the same way as [`ReadingStore::insert`].
    pub fn insert_at(&self, level: f64, timestamp: OffsetDateTime) -> Result<Reading> {
        let level = validate_level(level)?;
        // Stored with millisecond precision, so hand back what a query would return.
        let created_at = to_millis(timestamp);

        self.conn.execute(
            "INSERT INTO readings (level, created_at) VALUES (?1, ?2)",
            rusqlite::params![level, created_at],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted reading {} (level={:.1})", id, level);

        Ok(Reading {
            id,
            level,
            timestamp: from_millis(created_at)?,
        })
    }

    /// Query readings with filters.
    pub fn query_readings(&self, query: &ReadingQuery) -> Result<Vec<Reading>> {
        let sql = query.build_sql();
        let (_, params) = query.build_where();

        debug!("Executing query: {}", sql);

        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let readings = stmt
            .query_map(params_ref.as_slice(), row_to_reading)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(readings)
    }
}

impl ReadingStore for Store {
    fn insert(&self, level: f64) -> Result<Reading> {
        self.insert_at(level, OffsetDateTime::now_utc())
    }

    fn list(&self, limit: u32) -> Result<Vec<Reading>> {
        self.query_readings(&ReadingQuery::new().limit(limit))
    }

    fn latest(&self) -> Result<Option<Reading>> {
        let reading = self
            .conn
            .query_row(
                "SELECT id, level, created_at FROM readings
                 ORDER BY created_at DESC, id DESC LIMIT 1",
                [],
                row_to_reading,
            )
            .optional()?;

        Ok(reading)
    }

    fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM readings", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn row_to_reading(row: &Row<'_>) -> rusqlite::Result<Reading> {
    let created_at: i64 = row.get(2)?;
    let timestamp = from_millis(created_at).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Integer, Box::new(e))
    })?;

    Ok(Reading {
        id: row.get(0)?,
        level: row.get(1)?,
        timestamp,
    })
}

/// Unix milliseconds for a timestamp.
pub(crate) fn to_millis(ts: OffsetDateTime) -> i64 {
    (ts.unix_timestamp_nanos() / 1_000_000) as i64
}

fn from_millis(ms: i64) -> Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
        .map_err(|e| Error::InvalidTimestamp(format!("{} ms: {}", ms, e)))
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("path", &self.conn.path())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;
    use time::macros::datetime;

    #[test]
    fn test_open_in_memory() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.list(30).unwrap().is_empty());
        assert!(store.latest().unwrap().is_none());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_insert_then_latest() {
        let store = Store::open_in_memory().unwrap();

        store.insert(40.0).unwrap();
        let inserted = store.insert(38.7).unwrap();

        let latest = store.latest().unwrap().unwrap();
        assert_eq!(latest.id, inserted.id);
        assert_eq!(latest.level, 38.7);
    }

    #[test]
    fn test_insert_rejects_out_of_range() {
        let store = Store::open_in_memory().unwrap();

        let err = store.insert(120.0).unwrap_err();
        assert!(err.is_validation());
        let err = store.insert(-0.1).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_list_limit_and_order() {
        let store = Store::open_in_memory().unwrap();
        let base = datetime!(2026-10-01 00:00 UTC);

        for i in 0..40 {
            store
                .insert_at(100.0 - i as f64, base + Duration::hours(i))
                .unwrap();
        }

        let readings = store.list(30).unwrap();
        assert_eq!(readings.len(), 30);
        assert!(
            readings
                .windows(2)
                .all(|w| w[0].timestamp > w[1].timestamp)
        );
        // Newest is the last inserted
        assert_eq!(readings[0].level, 61.0);
    }

    #[test]
    fn test_latest_breaks_timestamp_ties_by_id() {
        let store = Store::open_in_memory().unwrap();
        let ts = datetime!(2026-10-14 12:00 UTC);

        store.insert_at(50.0, ts).unwrap();
        let second = store.insert_at(49.0, ts).unwrap();

        let latest = store.latest().unwrap().unwrap();
        assert_eq!(latest.id, second.id);
    }

    #[test]
    fn test_insert_at_preserves_out_of_order_timestamps() {
        let store = Store::open_in_memory().unwrap();

        store.insert_at(30.0, datetime!(2026-10-14 12:00 UTC)).unwrap();
        store.insert_at(60.0, datetime!(2026-10-10 12:00 UTC)).unwrap();

        let latest = store.latest().unwrap().unwrap();
        assert_eq!(latest.level, 30.0);
    }

    #[test]
    fn test_query_time_range() {
        let store = Store::open_in_memory().unwrap();
        let base = datetime!(2026-10-01 00:00 UTC);
        for i in 0..10 {
            store.insert_at(50.0, base + Duration::days(i)).unwrap();
        }

        let query = ReadingQuery::new()
            .since(base + Duration::days(3))
            .until(base + Duration::days(5))
            .oldest_first();
        let readings = store.query_readings(&query).unwrap();

        assert_eq!(readings.len(), 3);
        assert_eq!(readings[0].timestamp, base + Duration::days(3));
    }

    #[test]
    fn test_timestamp_millisecond_roundtrip() {
        let store = Store::open_in_memory().unwrap();
        let ts = datetime!(2026-10-14 08:30:15.123 UTC);

        let inserted = store.insert_at(12.5, ts).unwrap();
        let latest = store.latest().unwrap().unwrap();

        assert_eq!(inserted, latest);
        assert_eq!(latest.timestamp, ts);
    }

    #[test]
    fn test_open_file_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("readings.db");

        {
            let store = Store::open(&path).unwrap();
            store.insert(77.0).unwrap();
        }

        let reopened = Store::open(&path).unwrap();
        assert_eq!(reopened.count().unwrap(), 1);
        assert_eq!(reopened.latest().unwrap().unwrap().level, 77.0);
    }
}
