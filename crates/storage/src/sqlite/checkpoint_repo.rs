use async_trait::async_trait;
use quiz_core::model::{AttemptId, Checkpoint};

use super::SqliteRepository;
use super::mapping::{elapsed_to_i64, encode_answers, encode_flags, map_checkpoint_row};
use crate::repository::{CheckpointRepository, StorageError};

#[async_trait]
impl CheckpointRepository for SqliteRepository {
    async fn get_checkpoint(
        &self,
        attempt_id: &AttemptId,
    ) -> Result<Option<Checkpoint>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT answers, flags, elapsed_secs, last_saved_at
            FROM attempt_checkpoints
            WHERE attempt_id = ?1
            ",
        )
        .bind(attempt_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        row.as_ref().map(map_checkpoint_row).transpose()
    }

    async fn save_checkpoint(
        &self,
        attempt_id: &AttemptId,
        checkpoint: &Checkpoint,
    ) -> Result<(), StorageError> {
        let answers = encode_answers(&checkpoint.answers)?;
        let flags = encode_flags(&checkpoint.flags)?;

        sqlx::query(
            r"
            INSERT INTO attempt_checkpoints (
                attempt_id,
                answers,
                flags,
                elapsed_secs,
                last_saved_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(attempt_id) DO UPDATE SET
                answers = excluded.answers,
                flags = excluded.flags,
                elapsed_secs = excluded.elapsed_secs,
                last_saved_at = excluded.last_saved_at
            ",
        )
        .bind(attempt_id.as_str())
        .bind(answers)
        .bind(flags)
        .bind(elapsed_to_i64(checkpoint.elapsed_secs)?)
        .bind(checkpoint.last_saved_at)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }

    async fn delete_checkpoint(&self, attempt_id: &AttemptId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM attempt_checkpoints WHERE attempt_id = ?1")
            .bind(attempt_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}
