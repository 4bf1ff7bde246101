//! Query builder for stored readings.
//!
//! [`ReadingQuery`] follows the builder pattern. The plain "most recent N"
//! listing used by the API is `ReadingQuery::new().limit(n)`.
//!
//! # Example
//!
//! ```
//! use gasoo_store::{ReadingQuery, Store};
//! use time::{Duration, OffsetDateTime};
//!
//! let store = Store::open_in_memory()?;
//! let yesterday = OffsetDateTime::now_utc() - Duration::hours(24);
//!
//! let query = ReadingQuery::new().since(yesterday).limit(50);
//! let readings = store.query_readings(&query)?;
//! # Ok::<(), gasoo_store::Error>(())
//! ```

use time::OffsetDateTime;

/// Fluent query builder for readings.
///
/// By default, results are ordered by `created_at` descending (newest first)
/// with no limit.
#[derive(Debug, Default, Clone)]
pub struct ReadingQuery {
    /// Only readings created at or after this time.
    pub since: Option<OffsetDateTime>,
    /// Only readings created at or before this time.
    pub until: Option<OffsetDateTime>,
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Order by `created_at` descending.
    pub newest_first: bool,
}

impl ReadingQuery {
    /// Create a new query: all readings, newest first.
    pub fn new() -> Self {
        Self {
            newest_first: true,
            ..Default::default()
        }
    }

    /// Filter to readings created at or after this time.
    pub fn since(mut self, time: OffsetDateTime) -> Self {
        self.since = Some(time);
        self
    }

    /// Filter to readings created at or before this time.
    pub fn until(mut self, time: OffsetDateTime) -> Self {
        self.until = Some(time);
        self
    }

    /// Limit the number of results returned.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Order results oldest first.
    pub fn oldest_first(mut self) -> Self {
        self.newest_first = false;
        self
    }

    /// Whether a reading created at `ts` passes the time filters.
    pub(crate) fn matches(&self, ts: OffsetDateTime) -> bool {
        self.since.is_none_or(|since| ts >= since) && self.until.is_none_or(|until| ts <= until)
    }

    /// Build the SQL WHERE clause and parameters.
    pub(crate) fn build_where(&self) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(since) = self.since {
            conditions.push("created_at >= ?");
            params.push(Box::new(crate::store::to_millis(since)));
        }

        if let Some(until) = self.until {
            conditions.push("created_at <= ?");
            params.push(Box::new(crate::store::to_millis(until)));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }

    /// Build the full SQL query.
    pub(crate) fn build_sql(&self) -> String {
        let (where_clause, _) = self.build_where();
        let order = if self.newest_first { "DESC" } else { "ASC" };

        let mut sql = format!(
            "SELECT id, level, created_at FROM readings {} ORDER BY created_at {}, id {}",
            where_clause, order, order
        );

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_reading_query_default() {
        let query = ReadingQuery::new();
        assert!(query.since.is_none());
        assert!(query.until.is_none());
        assert!(query.limit.is_none());
        assert!(query.newest_first);
    }

    #[test]
    fn test_build_sql_with_limit() {
        let sql = ReadingQuery::new().limit(30).build_sql();
        assert!(sql.contains("ORDER BY created_at DESC, id DESC"));
        assert!(sql.ends_with("LIMIT 30"));
        assert!(!sql.contains("WHERE"));
    }

    #[test]
    fn test_build_where_time_range() {
        let query = ReadingQuery::new()
            .since(datetime!(2026-10-01 00:00 UTC))
            .until(datetime!(2026-10-14 00:00 UTC));
        let (clause, params) = query.build_where();
        assert_eq!(clause, "WHERE created_at >= ? AND created_at <= ?");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_oldest_first_sql() {
        let sql = ReadingQuery::new().oldest_first().build_sql();
        assert!(sql.contains("ORDER BY created_at ASC, id ASC"));
    }

    #[test]
    fn test_matches() {
        let query = ReadingQuery::new().since(datetime!(2026-10-10 00:00 UTC));
        assert!(query.matches(datetime!(2026-10-12 00:00 UTC)));
        assert!(!query.matches(datetime!(2026-10-09 23:59 UTC)));
    }
}
