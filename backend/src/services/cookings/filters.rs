//! Visibility predicate for a user's cookings

use chrono::{DateTime, Utc};

use super::status::{CookingStatus, classify};
use crate::db::cookings::columns;
use crate::orm::Predicate;

/// Neither stale nor invalidated
pub fn live() -> Predicate {
    Predicate::and([
        Predicate::is_null(columns::STALE_AT),
        Predicate::is_null(columns::INVALIDATED_AT),
    ])
}

/// Build the predicate for live cookings where the owner or secondary user
/// matches, narrowed to any of `statuses` and then to `extra`.
///
/// The status branch is left out when no status yields a predicate, so an
/// empty or all-unmapped status list never excludes rows.
pub fn compose(
    statuses: &[CookingStatus],
    owner_user_id: i64,
    secondary_user_id: i64,
    extra: Option<Predicate>,
    now: DateTime<Utc>,
) -> Predicate {
    let mut parts = vec![
        Predicate::or([
            Predicate::eq(columns::OWNER_USER_ID, owner_user_id),
            Predicate::eq(columns::SECONDARY_USER_ID, secondary_user_id),
        ]),
        live(),
    ];

    let branches: Vec<Predicate> = statuses
        .iter()
        .filter_map(|status| classify(*status, now))
        .collect();
    if !branches.is_empty() {
        parts.push(Predicate::Or(branches));
    }

    parts.extend(extra);
    Predicate::And(parts)
}
