//! Database connection and repositories

pub mod cookings;
pub mod sqlite_helpers;

use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub use cookings::{
    CookingRecord, CookingRepository, CreateCooking, CreateFlight, CreateJump, FlightRecord,
    JumpRecord, Reservations,
};

/// Database wrapper providing connection pool access
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database wrapper from an existing pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Parse a `sqlite:` URL or a plain file path. Files are created on demand.
    fn connect_options(location: &str) -> Result<SqliteConnectOptions> {
        let options = if location.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(location)
                .with_context(|| format!("Invalid database URL: {}", location))?
        } else {
            SqliteConnectOptions::new().filename(location)
        };

        Ok(options.create_if_missing(true).foreign_keys(true))
    }

    /// Create the directory holding a file database, if there is one
    async fn ensure_parent_dir(options: &SqliteConnectOptions) -> Result<()> {
        let filename = options.get_filename();
        let name = filename.to_string_lossy();
        if name == ":memory:" || name.starts_with("file:") {
            return Ok(());
        }

        if let Some(parent) = filename.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create database directory {}", parent.display()))?;
        }
        Ok(())
    }

    /// Create a new database connection pool
    pub async fn connect(location: &str, max_connections: u32) -> Result<Self> {
        let options = Self::connect_options(location)?;
        Self::ensure_parent_dir(&options).await?;

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database at {}", location))?;

        Ok(Self { pool })
    }

    /// Connect, retrying every second until `timeout` elapses
    pub async fn connect_with_retry(
        location: &str,
        max_connections: u32,
        timeout: Duration,
    ) -> Result<Self> {
        let started = Instant::now();
        loop {
            match Self::connect(location, max_connections).await {
                Ok(db) => return Ok(db),
                Err(e) if started.elapsed() < timeout => {
                    tracing::warn!(error = %e, "Database connection failed, retrying");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get a cooking repository
    pub fn cookings(&self) -> CookingRepository {
        CookingRepository::new(self.pool.clone())
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}
