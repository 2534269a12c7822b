//! Status classification
//!
//! Turns a status tag into a predicate over a cooking's dates and
//! cancellation flag. Every tag in one query must be classified against the
//! same `now`, otherwise the upcoming/on-trip boundary can shift between
//! branches of the resulting OR.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::db::cookings::columns;
use crate::orm::Predicate;

/// Status category a caller can filter cookings by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CookingStatus {
    Upcoming,
    OnTrip,
    PostTrip,
    Canceled,
    /// Accepted but matches no predicate yet
    Processing,
    /// Accepted but matches no predicate yet; distinct from `Canceled`
    Cancelled,
}

/// Cutoff between upcoming and in-progress cookings
pub fn active_window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(1)
}

/// Predicate selecting cookings in the given status at `now`.
///
/// `None` means the tag contributes nothing to a query. It must not be
/// treated as "match nothing".
pub fn classify(status: CookingStatus, now: DateTime<Utc>) -> Option<Predicate> {
    let boundary = active_window_start(now);
    let not_cancelled = || Predicate::eq(columns::IS_CANCELLED, false);

    let predicate = match status {
        CookingStatus::Upcoming => Predicate::and([
            Predicate::gt(columns::START_DATE, boundary),
            not_cancelled(),
        ]),
        CookingStatus::OnTrip => Predicate::and([
            Predicate::lte(columns::START_DATE, boundary),
            Predicate::gte(columns::END_DATE, now),
            not_cancelled(),
        ]),
        CookingStatus::PostTrip => {
            Predicate::and([Predicate::lt(columns::END_DATE, now), not_cancelled()])
        }
        CookingStatus::Canceled => Predicate::eq(columns::IS_CANCELLED, true),
        CookingStatus::Processing | CookingStatus::Cancelled => return None,
    };

    Some(predicate)
}

/// Statuses implied by the `active` flag of a count query.
///
/// `Some(true)` is upcoming or on trip, `Some(false)` is post trip, and an
/// absent flag applies no status filter.
pub fn statuses_for_activity(active: Option<bool>) -> Vec<CookingStatus> {
    match active {
        Some(true) => vec![CookingStatus::Upcoming, CookingStatus::OnTrip],
        Some(false) => vec![CookingStatus::PostTrip],
        None => Vec::new(),
    }
}
