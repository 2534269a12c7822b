//! Cooking queries
//!
//! Lookups, per-user counts and listings over a [`CookingStore`]. Every
//! operation except [`CookingService::get_by_pk`] only sees live cookings.
//! Time-dependent operations take `now` from the caller so one request uses
//! one clock reading throughout.

mod components;
mod filters;
mod status;
mod store;

pub use components::{CookingComponent, derive_components};
pub use filters::{compose, live};
pub use status::{CookingStatus, active_window_start, classify, statuses_for_activity};
pub use store::{CookingStore, StoreError};

use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use crate::db::CookingRecord;
use crate::db::cookings::columns;
use crate::orm::Predicate;

/// Query operations over cookings
#[derive(Clone)]
pub struct CookingService<S> {
    store: S,
}

impl<S: CookingStore> CookingService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Live cooking with the given external id
    #[instrument(skip(self))]
    pub async fn get_by_cooking_id(
        &self,
        cooking_id: &str,
    ) -> Result<Option<CookingRecord>, StoreError> {
        let predicate = Predicate::and([Predicate::eq(columns::COOKING_ID, cooking_id), live()]);
        let cooking = self.store.find_one(&predicate).await?;
        debug!(found = cooking.is_some(), "Looked up cooking");
        Ok(cooking)
    }

    /// Cooking by primary key, stale or invalidated included
    #[instrument(skip(self))]
    pub async fn get_by_pk(&self, id: i64) -> Result<Option<CookingRecord>, StoreError> {
        self.store.find_by_key(id).await
    }

    /// Number of live cookings the user owns or shares.
    ///
    /// `active` narrows to upcoming and on-trip cookings when true, or to
    /// finished ones when false.
    #[instrument(skip(self))]
    pub async fn count_by_user(
        &self,
        user_id: i64,
        active: Option<bool>,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let statuses = statuses_for_activity(active);
        let predicate = compose(&statuses, user_id, user_id, None, now);
        let count = self.store.count(&predicate).await?;
        debug!(count, "Counted cookings");
        Ok(count)
    }

    /// Live cookings the user owns or shares, in any of `statuses` (all of
    /// them when empty), ordered by start date.
    #[instrument(skip(self))]
    pub async fn list_by_user(
        &self,
        user_id: i64,
        statuses: &[CookingStatus],
        now: DateTime<Utc>,
    ) -> Result<Vec<CookingRecord>, StoreError> {
        let predicate = compose(statuses, user_id, user_id, None, now);
        let cookings = self.store.find_all(&predicate).await?;
        debug!(count = cookings.len(), "Listed cookings");
        Ok(cookings)
    }
}
