//! Persistence boundary for cooking queries

use async_trait::async_trait;
use thiserror::Error;

use crate::db::CookingRecord;
use crate::orm::Predicate;

/// Failure reported by a cooking store.
///
/// Absence is never an error: lookups return `Ok(None)` instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Record storage addressed by predicate or primary key.
///
/// Implementations must honor [`Predicate`] semantics exactly, including
/// NULL handling, and return `find_all` results ordered by start date then
/// primary key.
#[async_trait]
pub trait CookingStore: Send + Sync {
    /// First record matching the predicate in default order
    async fn find_one(&self, predicate: &Predicate) -> Result<Option<CookingRecord>, StoreError>;

    /// Record by primary key, without any other filtering
    async fn find_by_key(&self, id: i64) -> Result<Option<CookingRecord>, StoreError>;

    async fn count(&self, predicate: &Predicate) -> Result<u64, StoreError>;

    async fn find_all(&self, predicate: &Predicate) -> Result<Vec<CookingRecord>, StoreError>;
}
