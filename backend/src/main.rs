//! Cooking service backend
//!
//! Entry point: loads configuration, opens the database and serves the
//! GraphQL API at /graphql.

use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cooking_service::config::Config;
use cooking_service::db::Database;
use cooking_service::graphql::build_schema;
use cooking_service::{AppState, build_app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cooking_service=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!("Starting cooking service");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    let db = Database::connect_with_retry(
        &config.database_url,
        config.database_max_connections,
        Duration::from_secs(30),
    )
    .await?;
    tracing::info!(database = %config.database_url, "Database connected");

    if config.run_migrations {
        db.migrate().await.context("Failed to run migrations")?;
        tracing::info!("Migrations applied");
    }

    let schema = build_schema(db.clone());
    tracing::info!("GraphQL schema built");

    let app = build_app(AppState { db, schema });

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);
    tracing::info!("GraphQL playground: http://localhost:{}/graphql", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
