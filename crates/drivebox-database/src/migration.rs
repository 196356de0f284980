//! Embedded schema migrations.

use sqlx::PgPool;

use drivebox_core::{AppError, AppResult};

/// Run all pending migrations against the given pool.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    tracing::info!("Running database migrations");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                drivebox_core::error::ErrorKind::Database,
                "failed to run migrations",
                e,
            )
        })?;

    tracing::info!("Database migrations complete");
    Ok(())
}
