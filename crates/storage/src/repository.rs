use async_trait::async_trait;
use quiz_core::model::{AttemptId, Checkpoint};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Key-value store for in-progress attempt checkpoints, keyed by attempt id.
///
/// Writes are best-effort full snapshots; there is no transactional guarantee
/// across keys and only one writer per attempt is expected.
#[async_trait]
pub trait CheckpointRepository: Send + Sync {
    /// Fetch the checkpoint for an attempt, if one was saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read or the stored
    /// snapshot cannot be decoded.
    async fn get_checkpoint(&self, attempt_id: &AttemptId)
    -> Result<Option<Checkpoint>, StorageError>;

    /// Insert or overwrite the checkpoint for an attempt.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save_checkpoint(
        &self,
        attempt_id: &AttemptId,
        checkpoint: &Checkpoint,
    ) -> Result<(), StorageError>;

    /// Remove the checkpoint for an attempt. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend rejects the delete.
    async fn delete_checkpoint(&self, attempt_id: &AttemptId) -> Result<(), StorageError>;
}

/// Simple in-memory repository for tests and ephemeral (guest) attempts.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    checkpoints: Arc<Mutex<HashMap<AttemptId, Checkpoint>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            checkpoints: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of stored checkpoints.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn len(&self) -> Result<usize, StorageError> {
        let guard = self
            .checkpoints
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.len())
    }

    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl CheckpointRepository for InMemoryRepository {
    async fn get_checkpoint(
        &self,
        attempt_id: &AttemptId,
    ) -> Result<Option<Checkpoint>, StorageError> {
        let guard = self
            .checkpoints
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(attempt_id).cloned())
    }

    async fn save_checkpoint(
        &self,
        attempt_id: &AttemptId,
        checkpoint: &Checkpoint,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .checkpoints
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(attempt_id.clone(), checkpoint.clone());
        Ok(())
    }

    async fn delete_checkpoint(&self, attempt_id: &AttemptId) -> Result<(), StorageError> {
        let mut guard = self
            .checkpoints
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(attempt_id);
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub checkpoints: Arc<dyn CheckpointRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let checkpoints: Arc<dyn CheckpointRepository> = Arc::new(InMemoryRepository::new());
        Self { checkpoints }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    fn checkpoint(elapsed_secs: u64) -> Checkpoint {
        Checkpoint {
            answers: vec![Some(1), None, None],
            flags: vec![2],
            elapsed_secs,
            last_saved_at: fixed_now(),
        }
    }

    #[tokio::test]
    async fn save_overwrites_previous_snapshot() {
        let repo = InMemoryRepository::new();
        let id = AttemptId::new("a-1").unwrap();

        repo.save_checkpoint(&id, &checkpoint(5)).await.unwrap();
        repo.save_checkpoint(&id, &checkpoint(9)).await.unwrap();

        let stored = repo.get_checkpoint(&id).await.unwrap().unwrap();
        assert_eq!(stored.elapsed_secs, 9);
        assert_eq!(repo.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn attempts_do_not_collide() {
        let repo = InMemoryRepository::new();
        let first = AttemptId::new("a-1").unwrap();
        let second = AttemptId::new("a-2").unwrap();

        repo.save_checkpoint(&first, &checkpoint(1)).await.unwrap();
        repo.save_checkpoint(&second, &checkpoint(2)).await.unwrap();
        repo.delete_checkpoint(&first).await.unwrap();

        assert!(repo.get_checkpoint(&first).await.unwrap().is_none());
        assert_eq!(
            repo.get_checkpoint(&second).await.unwrap().unwrap().elapsed_secs,
            2
        );
    }

    #[tokio::test]
    async fn deleting_missing_checkpoint_is_ok() {
        let repo = InMemoryRepository::new();
        let id = AttemptId::new("never-saved").unwrap();
        repo.delete_checkpoint(&id).await.unwrap();
        assert!(repo.is_empty().unwrap());
    }
}
