use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Applies the versioned schema for attempt checkpoints.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: checkpoint table.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS attempt_checkpoints (
                    attempt_id TEXT PRIMARY KEY NOT NULL,
                    answers TEXT NOT NULL,
                    flags TEXT NOT NULL,
                    elapsed_secs INTEGER NOT NULL CHECK (elapsed_secs >= 0),
                    last_saved_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)")
            .bind(1_i64)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
    }

    Ok(())
}
