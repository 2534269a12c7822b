//! SQLite helper utilities for type conversion
//!
//! SQLite has no native timestamp or boolean type. Timestamps are stored as
//! fixed-width RFC 3339 TEXT in UTC so that `<`/`>` on the column orders the
//! same way the instants do; booleans are stored as 0/1 integers.

use anyhow::{Result, anyhow};
use chrono::{DateTime, SecondsFormat, Utc};

// ============================================================================
// Timestamp Helpers (stored as RFC 3339 TEXT in SQLite)
// ============================================================================

/// Convert a chrono DateTime to its stored TEXT form.
///
/// Always `YYYY-MM-DDTHH:MM:SS.ffffffZ`, so every stored and bound value has
/// the same width and lexicographic order equals chronological order.
#[inline]
pub fn datetime_to_str(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp back into a DateTime
#[inline]
pub fn str_to_datetime(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Rows written by hand with SQLite's datetime(): "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| ndt.and_utc())
                .map_err(|e| anyhow!("Invalid datetime '{}': {}", s, e))
        })
}

/// Parse an optional stored timestamp
#[inline]
pub fn str_to_datetime_opt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(str_to_datetime(s)?)),
        _ => Ok(None),
    }
}

// ============================================================================
// Boolean Helpers (SQLite uses 0/1 integers)
// ============================================================================

/// Convert bool to SQLite integer (0 or 1)
#[inline]
pub fn bool_to_int(b: bool) -> i32 {
    if b { 1 } else { 0 }
}

/// Convert SQLite integer to bool
#[inline]
pub fn int_to_bool(i: i32) -> bool {
    i != 0
}

// ============================================================================
// Query Building Helpers
// ============================================================================

/// Build a `(?, ?, ...)` placeholder list for an IN clause.
///
/// An empty list yields `(NULL)`, which matches nothing.
pub fn in_placeholders(count: usize) -> String {
    if count == 0 {
        return "(NULL)".to_string();
    }
    let placeholders: Vec<&str> = (0..count).map(|_| "?").collect();
    format!("({})", placeholders.join(", "))
}
