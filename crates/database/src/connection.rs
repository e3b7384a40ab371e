use crate::error::DbError;
use configuration::DatabaseSettings;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::env;
use std::time::Duration;

/// Establishes a connection pool to the PostgreSQL database.
///
/// The URL is read from `DATABASE_URL`, loading a `.env` file first when one
/// exists. Pool size and acquire timeout come from `settings`.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, DbError> {
    // A missing .env file is fine when the variable is set some other way.
    dotenvy::dotenv().ok();

    let database_url = env::var("DATABASE_URL")
        .map_err(|_e| DbError::ConnectionConfigError("DATABASE_URL must be set.".to_string()))?;

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .connect(&database_url)
        .await?;

    tracing::info!(max_connections = settings.max_connections, "Connected to the database");
    Ok(pool)
}

/// Applies the embedded migrations so the `trades` table is up to date.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
