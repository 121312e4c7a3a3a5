use crate::core::config::DatabaseConfig;
use sqlx::{
    postgres::PgPoolOptions,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    PgPool, SqlitePool,
};
use std::str::FromStr;
use std::time::Duration;

/// Connection pool for whichever engine `DATABASE_URL` selects.
///
/// Opened once at startup, migrated, shared through the repositories and
/// closed after the server has shut down.
#[derive(Debug, Clone)]
pub enum Database {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let url = config.url.as_str();

        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .min_connections(config.min_connections)
                .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
                .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
                .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
                .connect(url)
                .await?;
            return Ok(Self::Postgres(pool));
        }

        if url.starts_with("sqlite:") {
            let options = SqliteConnectOptions::from_str(url)?;

            // Every in-memory connection is its own database, so keep exactly one alive
            let pool = if is_in_memory(url) {
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(options)
                    .await?
            } else {
                SqlitePoolOptions::new()
                    .max_connections(config.max_connections)
                    .min_connections(config.min_connections)
                    .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
                    .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
                    .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
                    .connect_with(options)
                    .await?
            };
            return Ok(Self::Sqlite(pool));
        }

        Err(sqlx::Error::Configuration(
            format!(
                "Unsupported DATABASE_URL scheme (expected postgres:// or sqlite:): {}",
                config.redacted_url()
            )
            .into(),
        ))
    }

    /// Apply the migrations for the active engine
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        match self {
            Self::Postgres(pool) => sqlx::migrate!("./migrations/postgres").run(pool).await,
            Self::Sqlite(pool) => sqlx::migrate!("./migrations/sqlite").run(pool).await,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Sqlite(_) => "sqlite",
        }
    }

    pub async fn close(&self) {
        match self {
            Self::Postgres(pool) => pool.close().await,
            Self::Sqlite(pool) => pool.close().await,
        }
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
