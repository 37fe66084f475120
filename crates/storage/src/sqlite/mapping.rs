use quiz_core::model::Checkpoint;
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn elapsed_to_i64(v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization("elapsed_secs overflow".into()))
}

fn elapsed_from_i64(v: i64) -> Result<u64, StorageError> {
    u64::try_from(v)
        .map_err(|_| StorageError::Serialization(format!("invalid elapsed_secs: {v}")))
}

pub(crate) fn encode_answers(answers: &[Option<usize>]) -> Result<String, StorageError> {
    serde_json::to_string(answers).map_err(ser)
}

pub(crate) fn encode_flags(flags: &[usize]) -> Result<String, StorageError> {
    serde_json::to_string(flags).map_err(ser)
}

pub(crate) fn map_checkpoint_row(row: &sqlx::sqlite::SqliteRow) -> Result<Checkpoint, StorageError> {
    let answers_json: String = row.try_get("answers").map_err(ser)?;
    let flags_json: String = row.try_get("flags").map_err(ser)?;
    let elapsed_secs = elapsed_from_i64(row.try_get::<i64, _>("elapsed_secs").map_err(ser)?)?;
    let last_saved_at: chrono::DateTime<chrono::Utc> =
        row.try_get("last_saved_at").map_err(ser)?;

    Ok(Checkpoint {
        answers: serde_json::from_str(&answers_json).map_err(ser)?,
        flags: serde_json::from_str(&flags_json).map_err(ser)?,
        elapsed_secs,
        last_saved_at,
    })
}
