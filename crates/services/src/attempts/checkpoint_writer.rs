use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use quiz_core::model::{AttemptId, Checkpoint};
use storage::repository::{CheckpointRepository, StorageError};

enum WriteOp {
    Save {
        attempt_id: AttemptId,
        checkpoint: Checkpoint,
    },
    Delete {
        attempt_id: AttemptId,
        ack: oneshot::Sender<bool>,
    },
    Flush {
        ack: oneshot::Sender<()>,
    },
}

/// Fire-and-forget checkpoint persistence with strict FIFO ordering.
///
/// A single background task applies queued operations one at a time, so a
/// later snapshot is never overtaken by an earlier one. Write failures are
/// logged and counted, never returned: in-memory state stays authoritative.
#[derive(Clone)]
pub struct CheckpointWriter {
    repo: Arc<dyn CheckpointRepository>,
    tx: mpsc::UnboundedSender<WriteOp>,
    failures: Arc<AtomicU64>,
}

impl CheckpointWriter {
    /// Spawn the writer task. Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(repo: Arc<dyn CheckpointRepository>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let failures = Arc::new(AtomicU64::new(0));
        tokio::spawn(run(Arc::clone(&repo), rx, Arc::clone(&failures)));
        Self { repo, tx, failures }
    }

    /// Read the stored checkpoint directly from the repository.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the repository cannot be read.
    pub async fn load(&self, attempt_id: &AttemptId) -> Result<Option<Checkpoint>, StorageError> {
        self.repo.get_checkpoint(attempt_id).await
    }

    /// Queue a snapshot write and return immediately.
    pub fn save(&self, attempt_id: AttemptId, checkpoint: Checkpoint) {
        let op = WriteOp::Save {
            attempt_id,
            checkpoint,
        };
        if self.tx.send(op).is_err() {
            self.failures.fetch_add(1, Ordering::Relaxed);
            warn!("checkpoint writer stopped; snapshot dropped");
        }
    }

    /// Delete the checkpoint after every queued write has been applied.
    ///
    /// Returns whether the delete succeeded.
    pub async fn delete(&self, attempt_id: AttemptId) -> bool {
        let (ack, done) = oneshot::channel();
        if self.tx.send(WriteOp::Delete { attempt_id, ack }).is_err() {
            warn!("checkpoint writer stopped; delete dropped");
            return false;
        }
        done.await.unwrap_or(false)
    }

    /// Wait until every queued operation has been applied.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(WriteOp::Flush { ack }).is_ok() {
            let _ = done.await;
        }
    }

    /// Number of checkpoint operations that failed since the writer started.
    #[must_use]
    pub fn failed_writes(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

async fn run(
    repo: Arc<dyn CheckpointRepository>,
    mut rx: mpsc::UnboundedReceiver<WriteOp>,
    failures: Arc<AtomicU64>,
) {
    while let Some(op) = rx.recv().await {
        match op {
            WriteOp::Save {
                attempt_id,
                checkpoint,
            } => match repo.save_checkpoint(&attempt_id, &checkpoint).await {
                Ok(()) => debug!(%attempt_id, elapsed = checkpoint.elapsed_secs, "checkpoint saved"),
                Err(err) => {
                    failures.fetch_add(1, Ordering::Relaxed);
                    warn!(%attempt_id, error = %err, "checkpoint write failed");
                }
            },
            WriteOp::Delete { attempt_id, ack } => {
                let deleted = match repo.delete_checkpoint(&attempt_id).await {
                    Ok(()) => true,
                    Err(err) => {
                        failures.fetch_add(1, Ordering::Relaxed);
                        warn!(%attempt_id, error = %err, "checkpoint delete failed");
                        false
                    }
                };
                let _ = ack.send(deleted);
            }
            WriteOp::Flush { ack } => {
                let _ = ack.send(());
            }
        }
    }
}
