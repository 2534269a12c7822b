//! Application configuration management

use std::env;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Server host to bind, all interfaces when unset
    pub host: Option<String>,

    /// Server port
    pub port: u16,

    /// SQLite file path, or a URL with the sqlite: prefix
    pub database_url: String,

    /// Connection pool size
    pub database_max_connections: u32,

    /// Apply embedded migrations on startup
    pub run_migrations: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // Prefer DATABASE_PATH, fall back to DATABASE_URL
        let database_url = lookup("DATABASE_PATH")
            .or_else(|| lookup("DATABASE_URL"))
            .unwrap_or_else(|| "./data/cookings.db".to_string());

        Ok(Self {
            host: lookup("HOST").filter(|h| !h.is_empty()),

            port: lookup("PORT")
                .unwrap_or_else(|| "3001".to_string())
                .parse()
                .context("Invalid PORT")?,

            database_url,

            database_max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|| "10".to_string())
                .parse()
                .context("Invalid DATABASE_MAX_CONNECTIONS")?,

            run_migrations: lookup("RUN_MIGRATIONS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
        })
    }

    /// Address to bind the HTTP server to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host.as_deref().unwrap_or("0.0.0.0"), self.port)
    }
}
