//! SQL Query Builder for the ORM layer
//!
//! Provides a query builder that works with `DatabaseEntity` types and uses
//! parameterized queries via sqlx, so filter values never reach the SQL text.

use sqlx::SqlitePool;

use super::traits::{DatabaseEntity, DatabaseFilter, FromSqlRow, SqlValue};

/// A query builder for database entities.
///
/// Builds parameterized SQL queries for SELECT and COUNT operations with
/// filtering, sorting, and limit/offset support.
pub struct EntityQuery<E: DatabaseEntity> {
    _phantom: std::marker::PhantomData<E>,
    where_clauses: Vec<String>,
    values: Vec<SqlValue>,
    order_by: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl<E: DatabaseEntity + FromSqlRow> EntityQuery<E> {
    /// Create a new query builder for the entity type.
    pub fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
            where_clauses: Vec::new(),
            values: Vec::new(),
            order_by: None,
            limit: None,
            offset: None,
        }
    }

    /// Add a filter to the query. Multiple filters are ANDed.
    pub fn filter<F: DatabaseFilter>(mut self, filter: &F) -> Self {
        if !filter.is_empty() {
            let (conditions, values) = filter.to_sql_conditions();
            self.where_clauses.extend(conditions);
            self.values.extend(values);
        }
        self
    }

    /// Sort by the entity's default column, with the primary key as tie-breaker.
    pub fn default_order(mut self) -> Self {
        if self.order_by.is_none() {
            self.order_by = Some(format!(
                "{} {}, {} ASC",
                E::DEFAULT_SORT,
                E::DEFAULT_SORT_DIR,
                E::PRIMARY_KEY
            ));
        }
        self
    }

    /// Set limit directly.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set offset directly.
    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    fn push_where(&self, sql: &mut String) {
        if !self.where_clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.where_clauses.join(" AND "));
        }
    }

    /// Build the SQL query string.
    pub(crate) fn build_sql(&self) -> String {
        let mut sql = E::select_sql();
        self.push_where(&mut sql);

        if let Some(ref order) = self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        if let Some(offset) = self.offset {
            if offset > 0 {
                // SQLite only accepts OFFSET after a LIMIT
                if self.limit.is_none() {
                    sql.push_str(" LIMIT -1");
                }
                sql.push_str(&format!(" OFFSET {}", offset));
            }
        }

        sql
    }

    /// Build a COUNT query string.
    pub(crate) fn build_count_sql(&self) -> String {
        let mut sql = format!("SELECT COUNT(*) FROM {}", E::TABLE_NAME);
        self.push_where(&mut sql);
        sql
    }

    /// Bound values in placeholder order.
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Execute the query and return all matching entities.
    pub async fn fetch_all(self, pool: &SqlitePool) -> Result<Vec<E>, sqlx::Error> {
        let sql = self.build_sql();
        tracing::debug!(sql = %sql, "Executing entity query");

        let mut query = sqlx::query(&sql);
        for value in &self.values {
            query = value.bind_to_query(query);
        }

        let rows = query.fetch_all(pool).await?;
        rows.iter().map(E::from_row).collect()
    }

    /// Execute the query and return a single entity.
    pub async fn fetch_one(self, pool: &SqlitePool) -> Result<Option<E>, sqlx::Error> {
        let sql = self.build_sql();
        tracing::debug!(sql = %sql, "Executing entity query (one)");

        let mut query = sqlx::query(&sql);
        for value in &self.values {
            query = value.bind_to_query(query);
        }

        match query.fetch_optional(pool).await? {
            Some(row) => Ok(Some(E::from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Execute a COUNT query.
    pub async fn count(&self, pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let sql = self.build_count_sql();
        tracing::debug!(sql = %sql, "Executing count query");

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for value in &self.values {
            query = value.bind_to_scalar(query);
        }

        query.fetch_one(pool).await
    }
}

impl<E: DatabaseEntity + FromSqlRow> Default for EntityQuery<E> {
    fn default() -> Self {
        Self::new()
    }
}
