//! Cooking database repository
//!
//! A cooking is a trip owned by one user and optionally shared with a
//! secondary user. Flights and jumps hang off a cooking as its reservations
//! and are loaded in bulk alongside every cooking the repository returns.
//!
//! Rows are never deleted by this crate: other services soft-delete them by
//! setting `stale_at` or `invalidated_at`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::db::sqlite_helpers::{
    bool_to_int, datetime_to_str, in_placeholders, int_to_bool, str_to_datetime,
    str_to_datetime_opt,
};
use crate::orm::{DatabaseEntity, EntityQuery, FieldSource, FromSqlRow, Predicate, SqlValue};
use crate::services::cookings::{CookingStore, StoreError};

/// Parent ids bound per reservation query
const RESERVATION_BATCH_SIZE: usize = 500;

/// Column names of the `cookings` table, used as predicate field names.
pub mod columns {
    pub const ID: &str = "id";
    pub const COOKING_ID: &str = "cooking_id";
    pub const OWNER_USER_ID: &str = "owner_user_id";
    pub const SECONDARY_USER_ID: &str = "secondary_user_id";
    pub const START_DATE: &str = "start_date";
    pub const END_DATE: &str = "end_date";
    pub const IS_CANCELLED: &str = "is_cancelled";
    pub const STALE_AT: &str = "stale_at";
    pub const INVALIDATED_AT: &str = "invalidated_at";
    pub const CREATED_AT: &str = "created_at";
    pub const UPDATED_AT: &str = "updated_at";
}

/// Cooking record from database
#[derive(Debug, Clone, PartialEq)]
pub struct CookingRecord {
    pub id: i64,
    /// External identifier handed out to clients
    pub cooking_id: String,
    pub owner_user_id: i64,
    pub secondary_user_id: Option<i64>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_cancelled: bool,
    /// Soft-delete marker
    pub stale_at: Option<DateTime<Utc>>,
    pub invalidated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub reservations: Reservations,
}

impl CookingRecord {
    /// Neither stale nor invalidated
    pub fn is_live(&self) -> bool {
        self.stale_at.is_none() && self.invalidated_at.is_none()
    }
}

/// Reservations attached to a cooking
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reservations {
    pub flights: Vec<FlightRecord>,
    pub jumps: Vec<JumpRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlightRecord {
    pub id: i64,
    pub cooking_pk: i64,
    pub flight_number: String,
    pub departs_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JumpRecord {
    pub id: i64,
    pub cooking_pk: i64,
    pub location: String,
    pub jump_at: DateTime<Utc>,
}

fn decode_datetime(s: &str) -> sqlx::Result<DateTime<Utc>> {
    str_to_datetime(s).map_err(|e| sqlx::Error::Decode(e.into()))
}

fn decode_datetime_opt(s: Option<&str>) -> sqlx::Result<Option<DateTime<Utc>>> {
    str_to_datetime_opt(s).map_err(|e| sqlx::Error::Decode(e.into()))
}

impl DatabaseEntity for CookingRecord {
    const TABLE_NAME: &'static str = "cookings";
    const PRIMARY_KEY: &'static str = columns::ID;
    const DEFAULT_SORT: &'static str = columns::START_DATE;

    fn column_names() -> &'static [&'static str] {
        &[
            columns::ID,
            columns::COOKING_ID,
            columns::OWNER_USER_ID,
            columns::SECONDARY_USER_ID,
            columns::START_DATE,
            columns::END_DATE,
            columns::IS_CANCELLED,
            columns::STALE_AT,
            columns::INVALIDATED_AT,
            columns::CREATED_AT,
            columns::UPDATED_AT,
        ]
    }
}

impl FromSqlRow for CookingRecord {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let start_date: String = row.try_get(columns::START_DATE)?;
        let end_date: String = row.try_get(columns::END_DATE)?;
        let is_cancelled: i32 = row.try_get(columns::IS_CANCELLED)?;
        let stale_at: Option<String> = row.try_get(columns::STALE_AT)?;
        let invalidated_at: Option<String> = row.try_get(columns::INVALIDATED_AT)?;
        let created_at: String = row.try_get(columns::CREATED_AT)?;
        let updated_at: String = row.try_get(columns::UPDATED_AT)?;

        Ok(Self {
            id: row.try_get(columns::ID)?,
            cooking_id: row.try_get(columns::COOKING_ID)?,
            owner_user_id: row.try_get(columns::OWNER_USER_ID)?,
            secondary_user_id: row.try_get(columns::SECONDARY_USER_ID)?,
            start_date: decode_datetime(&start_date)?,
            end_date: decode_datetime(&end_date)?,
            is_cancelled: int_to_bool(is_cancelled),
            stale_at: decode_datetime_opt(stale_at.as_deref())?,
            invalidated_at: decode_datetime_opt(invalidated_at.as_deref())?,
            created_at: decode_datetime(&created_at)?,
            updated_at: decode_datetime(&updated_at)?,
            // Loaded separately
            reservations: Reservations::default(),
        })
    }
}

impl FieldSource for CookingRecord {
    fn field(&self, name: &str) -> Option<SqlValue> {
        let value = match name {
            columns::ID => SqlValue::Int(self.id),
            columns::COOKING_ID => SqlValue::from(self.cooking_id.as_str()),
            columns::OWNER_USER_ID => SqlValue::Int(self.owner_user_id),
            columns::SECONDARY_USER_ID => SqlValue::from(self.secondary_user_id),
            columns::START_DATE => SqlValue::Timestamp(self.start_date),
            columns::END_DATE => SqlValue::Timestamp(self.end_date),
            columns::IS_CANCELLED => SqlValue::Bool(self.is_cancelled),
            columns::STALE_AT => SqlValue::from(self.stale_at),
            columns::INVALIDATED_AT => SqlValue::from(self.invalidated_at),
            columns::CREATED_AT => SqlValue::Timestamp(self.created_at),
            columns::UPDATED_AT => SqlValue::Timestamp(self.updated_at),
            _ => return None,
        };
        Some(value)
    }
}

impl FromSqlRow for FlightRecord {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let departs_at: String = row.try_get("departs_at")?;
        Ok(Self {
            id: row.try_get("id")?,
            cooking_pk: row.try_get("cooking_pk")?,
            flight_number: row.try_get("flight_number")?,
            departs_at: decode_datetime(&departs_at)?,
        })
    }
}

impl FromSqlRow for JumpRecord {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let jump_at: String = row.try_get("jump_at")?;
        Ok(Self {
            id: row.try_get("id")?,
            cooking_pk: row.try_get("cooking_pk")?,
            location: row.try_get("location")?,
            jump_at: decode_datetime(&jump_at)?,
        })
    }
}

/// Input for creating a cooking
#[derive(Debug, Clone)]
pub struct CreateCooking {
    pub cooking_id: String,
    pub owner_user_id: i64,
    pub secondary_user_id: Option<i64>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_cancelled: bool,
}

/// Input for attaching a flight to a cooking
#[derive(Debug, Clone)]
pub struct CreateFlight {
    pub flight_number: String,
    pub departs_at: DateTime<Utc>,
}

/// Input for attaching a jump to a cooking
#[derive(Debug, Clone)]
pub struct CreateJump {
    pub location: String,
    pub jump_at: DateTime<Utc>,
}

/// Cooking repository for database operations
#[derive(Clone)]
pub struct CookingRepository {
    pool: SqlitePool,
}

impl CookingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new cooking and return it as stored
    pub async fn create(&self, input: CreateCooking) -> Result<CookingRecord, StoreError> {
        let now = datetime_to_str(Utc::now());
        let result = sqlx::query(
            r#"
            INSERT INTO cookings (
                cooking_id, owner_user_id, secondary_user_id, start_date, end_date,
                is_cancelled, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.cooking_id)
        .bind(input.owner_user_id)
        .bind(input.secondary_user_id)
        .bind(datetime_to_str(input.start_date))
        .bind(datetime_to_str(input.end_date))
        .bind(bool_to_int(input.is_cancelled))
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.find_by_key(result.last_insert_rowid())
            .await?
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))
    }

    /// Attach a flight reservation to a cooking
    pub async fn add_flight(
        &self,
        cooking_pk: i64,
        input: CreateFlight,
    ) -> Result<FlightRecord, StoreError> {
        let result = sqlx::query(
            "INSERT INTO cooking_flights (cooking_pk, flight_number, departs_at) VALUES (?, ?, ?)",
        )
        .bind(cooking_pk)
        .bind(&input.flight_number)
        .bind(datetime_to_str(input.departs_at))
        .execute(&self.pool)
        .await?;

        Ok(FlightRecord {
            id: result.last_insert_rowid(),
            cooking_pk,
            flight_number: input.flight_number,
            departs_at: input.departs_at,
        })
    }

    /// Attach a jump reservation to a cooking
    pub async fn add_jump(&self, cooking_pk: i64, input: CreateJump) -> Result<JumpRecord, StoreError> {
        let result = sqlx::query(
            "INSERT INTO cooking_jumps (cooking_pk, location, jump_at) VALUES (?, ?, ?)",
        )
        .bind(cooking_pk)
        .bind(&input.location)
        .bind(datetime_to_str(input.jump_at))
        .execute(&self.pool)
        .await?;

        Ok(JumpRecord {
            id: result.last_insert_rowid(),
            cooking_pk,
            location: input.location,
            jump_at: input.jump_at,
        })
    }

    /// Soft-delete a cooking. Returns false if no row has that id.
    pub async fn mark_stale(&self, id: i64, at: DateTime<Utc>) -> Result<bool, StoreError> {
        self.set_timestamp(columns::STALE_AT, id, at).await
    }

    /// Invalidate a cooking. Returns false if no row has that id.
    pub async fn invalidate(&self, id: i64, at: DateTime<Utc>) -> Result<bool, StoreError> {
        self.set_timestamp(columns::INVALIDATED_AT, id, at).await
    }

    async fn set_timestamp(
        &self,
        column: &'static str,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let sql = format!(
            "UPDATE cookings SET {} = ?, {} = ? WHERE {} = ?",
            column,
            columns::UPDATED_AT,
            columns::ID
        );
        let result = sqlx::query(&sql)
            .bind(datetime_to_str(at))
            .bind(datetime_to_str(Utc::now()))
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Load flights and jumps for all given cookings, one query per table and batch of ids.
    async fn load_reservations(&self, records: &mut [CookingRecord]) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }
        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();

        // Stay well below SQLite's bind variable limit
        let mut flights: Vec<FlightRecord> = Vec::new();
        let mut jumps: Vec<JumpRecord> = Vec::new();
        for batch in ids.chunks(RESERVATION_BATCH_SIZE) {
            flights.extend(
                self.fetch_children::<FlightRecord>(
                    &format!(
                        "SELECT id, cooking_pk, flight_number, departs_at FROM cooking_flights \
                         WHERE cooking_pk IN {} ORDER BY departs_at, id",
                        in_placeholders(batch.len())
                    ),
                    batch,
                )
                .await?,
            );
            jumps.extend(
                self.fetch_children::<JumpRecord>(
                    &format!(
                        "SELECT id, cooking_pk, location, jump_at FROM cooking_jumps \
                         WHERE cooking_pk IN {} ORDER BY jump_at, id",
                        in_placeholders(batch.len())
                    ),
                    batch,
                )
                .await?,
            );
        }

        let mut flights_by_cooking: HashMap<i64, Vec<FlightRecord>> = HashMap::new();
        for flight in flights {
            flights_by_cooking
                .entry(flight.cooking_pk)
                .or_default()
                .push(flight);
        }
        let mut jumps_by_cooking: HashMap<i64, Vec<JumpRecord>> = HashMap::new();
        for jump in jumps {
            jumps_by_cooking.entry(jump.cooking_pk).or_default().push(jump);
        }

        for record in records.iter_mut() {
            record.reservations = Reservations {
                flights: flights_by_cooking.remove(&record.id).unwrap_or_default(),
                jumps: jumps_by_cooking.remove(&record.id).unwrap_or_default(),
            };
        }

        Ok(())
    }

    async fn fetch_children<T: FromSqlRow>(
        &self,
        sql: &str,
        ids: &[i64],
    ) -> Result<Vec<T>, StoreError> {
        tracing::debug!(sql = %sql, parents = ids.len(), "Loading reservations");

        let mut query = sqlx::query(sql);
        for id in ids {
            query = query.bind(*id);
        }
        let rows = query.fetch_all(&self.pool).await?;
        let children = rows.iter().map(T::from_row).collect::<Result<Vec<_>, _>>()?;
        Ok(children)
    }
}

#[async_trait]
impl CookingStore for CookingRepository {
    async fn find_one(&self, predicate: &Predicate) -> Result<Option<CookingRecord>, StoreError> {
        let record = EntityQuery::<CookingRecord>::new()
            .filter(predicate)
            .default_order()
            .limit(1)
            .fetch_one(&self.pool)
            .await?;

        match record {
            Some(mut record) => {
                self.load_reservations(std::slice::from_mut(&mut record))
                    .await?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn find_by_key(&self, id: i64) -> Result<Option<CookingRecord>, StoreError> {
        self.find_one(&Predicate::eq(columns::ID, id)).await
    }

    async fn count(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        let count = EntityQuery::<CookingRecord>::new()
            .filter(predicate)
            .count(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn find_all(&self, predicate: &Predicate) -> Result<Vec<CookingRecord>, StoreError> {
        let mut records = EntityQuery::<CookingRecord>::new()
            .filter(predicate)
            .default_order()
            .fetch_all(&self.pool)
            .await?;

        self.load_reservations(&mut records).await?;
        Ok(records)
    }
}
