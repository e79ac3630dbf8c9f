use crate::domain::error::{AppError, Result};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::str::FromStr;
use std::time::Duration;

const SCHEMA: &str = include_str!("../../../resources/schema.sql");

/// Open the pool, apply the schema and run a health check.
pub async fn init_db(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let mut options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| AppError::DatabaseError(format!("Failed to parse database URL: {e}")))?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let in_memory = database_url.contains(":memory:");
    // WAL has no effect on in-memory databases
    if !in_memory {
        options = options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);
    }

    let mut pool_options = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5));
    // An in-memory database dies with its last connection
    if in_memory {
        pool_options = pool_options
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to connect to database: {e}")))?;

    apply_schema(&pool).await?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Database health check failed: {e}")))?;

    tracing::info!(database_url = %database_url, max_connections, "Database ready");
    Ok(pool)
}

/// Single-connection in-memory database; every connection would otherwise get its own.
pub async fn init_memory_db() -> Result<SqlitePool> {
    init_db("sqlite::memory:", 1).await
}

async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA.split(';') {
        let stmt = statement.trim();
        if stmt.is_empty() {
            continue;
        }
        sqlx::query(stmt)
            .execute(pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to apply schema statement: {e}"))
            })?;
    }
    Ok(())
}
