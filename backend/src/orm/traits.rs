//! Core traits for the ORM layer
//!
//! Entities describe their table, filters render themselves to parameterized
//! SQL fragments, and rows decode through [`FromSqlRow`].

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use sqlx::Sqlite;
use sqlx::sqlite::{SqliteArguments, SqliteRow};

use crate::db::sqlite_helpers::{bool_to_int, datetime_to_str};

/// Metadata about a database entity (table).
pub trait DatabaseEntity: Sized + Send + Sync {
    /// The SQL table name (e.g., "cookings")
    const TABLE_NAME: &'static str;

    /// The primary key column name (e.g., "id")
    const PRIMARY_KEY: &'static str;

    /// Default sort column for list queries
    const DEFAULT_SORT: &'static str;

    /// Default sort direction
    const DEFAULT_SORT_DIR: &'static str = "ASC";

    /// List of all column names in the table
    fn column_names() -> &'static [&'static str];

    /// Build a SELECT query for all columns
    fn select_sql() -> String {
        let columns = Self::column_names().join(", ");
        format!("SELECT {} FROM {}", columns, Self::TABLE_NAME)
    }
}

/// Trait for applying filters to a SQL query.
pub trait DatabaseFilter: Send + Sync {
    /// Render this filter as WHERE clause fragments (ANDed together) and the
    /// values to bind, in placeholder order.
    fn to_sql_conditions(&self) -> (Vec<String>, Vec<SqlValue>);

    /// Check if the filter has any conditions
    fn is_empty(&self) -> bool;
}

/// Trait for decoding a database row into an entity.
pub trait FromSqlRow: Sized {
    /// Decode a SQLite row into this entity type
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error>;
}

/// Represents a SQL value that can be bound to a query.
///
/// Used by filters to collect values for parameterized queries.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Null,
}

impl SqlValue {
    /// Bind this value to a sqlx query builder
    pub fn bind_to_query<'q>(
        &'q self,
        query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
        match self {
            SqlValue::String(s) => query.bind(s.as_str()),
            SqlValue::Int(i) => query.bind(*i),
            SqlValue::Float(f) => query.bind(*f),
            SqlValue::Bool(b) => query.bind(bool_to_int(*b)),
            SqlValue::Timestamp(ts) => query.bind(datetime_to_str(*ts)),
            SqlValue::Null => query.bind(None::<String>),
        }
    }

    /// Bind this value to a scalar query (COUNT and friends)
    pub fn bind_to_scalar<'q, O>(
        &'q self,
        query: sqlx::query::QueryScalar<'q, Sqlite, O, SqliteArguments<'q>>,
    ) -> sqlx::query::QueryScalar<'q, Sqlite, O, SqliteArguments<'q>> {
        match self {
            SqlValue::String(s) => query.bind(s.as_str()),
            SqlValue::Int(i) => query.bind(*i),
            SqlValue::Float(f) => query.bind(*f),
            SqlValue::Bool(b) => query.bind(bool_to_int(*b)),
            SqlValue::Timestamp(ts) => query.bind(datetime_to_str(*ts)),
            SqlValue::Null => query.bind(None::<String>),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Order two values the way SQLite would for the column types we store.
    /// Timestamps compare at the microsecond precision they are stored with.
    ///
    /// Returns `None` when either side is NULL or the types are not comparable,
    /// which callers treat as "unknown" (the row does not match).
    pub fn compare(&self, other: &SqlValue) -> Option<Ordering> {
        match (self, other) {
            (SqlValue::String(a), SqlValue::String(b)) => Some(a.cmp(b)),
            (SqlValue::Int(a), SqlValue::Int(b)) => Some(a.cmp(b)),
            (SqlValue::Float(a), SqlValue::Float(b)) => a.partial_cmp(b),
            (SqlValue::Int(a), SqlValue::Float(b)) => (*a as f64).partial_cmp(b),
            (SqlValue::Float(a), SqlValue::Int(b)) => a.partial_cmp(&(*b as f64)),
            (SqlValue::Bool(a), SqlValue::Bool(b)) => Some(a.cmp(b)),
            // Stored timestamps keep microseconds only
            (SqlValue::Timestamp(a), SqlValue::Timestamp(b)) => {
                Some(a.timestamp_micros().cmp(&b.timestamp_micros()))
            }
            _ => None,
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::String(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::String(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_compare_same_types() {
        assert_eq!(SqlValue::Int(1).compare(&SqlValue::Int(2)), Some(Ordering::Less));
        assert_eq!(
            SqlValue::from("b").compare(&SqlValue::from("a")),
            Some(Ordering::Greater)
        );
        assert_eq!(
            SqlValue::Bool(true).compare(&SqlValue::Bool(true)),
            Some(Ordering::Equal)
        );

        let a = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap();
        assert_eq!(SqlValue::from(a).compare(&SqlValue::from(b)), Some(Ordering::Less));
    }

    #[test]
    fn test_timestamps_compare_at_stored_precision() {
        let stored = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let same_micro = stored + chrono::Duration::nanoseconds(700);
        let next_micro = stored + chrono::Duration::microseconds(1);

        assert_eq!(
            SqlValue::from(stored).compare(&SqlValue::from(same_micro)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            SqlValue::from(stored).compare(&SqlValue::from(next_micro)),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn test_compare_with_null_is_unknown() {
        assert_eq!(SqlValue::Null.compare(&SqlValue::Null), None);
        assert_eq!(SqlValue::Int(1).compare(&SqlValue::Null), None);
        assert_eq!(SqlValue::Int(1).compare(&SqlValue::from("1")), None);
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(SqlValue::from(None::<i64>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(7i64)), SqlValue::Int(7));
    }
}
