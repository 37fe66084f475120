use std::sync::Arc;

use storage::repository::{CheckpointRepository, Storage};

use crate::Clock;
use crate::attempts::QuizAttemptController;
use crate::backend::{BackendConfig, HttpQuizBackend, QuizBackend};
use crate::error::AppServicesError;

/// Assembles app-facing services and hands out attempt controllers.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    backend: Arc<dyn QuizBackend>,
    checkpoints: Arc<dyn CheckpointRepository>,
}

impl AppServices {
    /// Build services with `SQLite`-backed checkpoints and the HTTP backend.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the
    /// backend configuration is unusable.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        backend: BackendConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let backend: Arc<dyn QuizBackend> = Arc::new(HttpQuizBackend::new(backend)?);
        Ok(Self::from_parts(clock, backend, storage))
    }

    /// Build services whose checkpoints live only for this process.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Backend` if the backend configuration is unusable.
    pub fn in_memory(clock: Clock, backend: BackendConfig) -> Result<Self, AppServicesError> {
        let backend: Arc<dyn QuizBackend> = Arc::new(HttpQuizBackend::new(backend)?);
        Ok(Self::from_parts(clock, backend, Storage::in_memory()))
    }

    #[must_use]
    pub fn from_parts(clock: Clock, backend: Arc<dyn QuizBackend>, storage: Storage) -> Self {
        Self {
            clock,
            backend,
            checkpoints: storage.checkpoints,
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// A fresh controller for one attempt page. Call from within a tokio runtime.
    #[must_use]
    pub fn new_controller(&self) -> QuizAttemptController {
        QuizAttemptController::new(
            self.clock,
            Arc::clone(&self.backend),
            Arc::clone(&self.checkpoints),
        )
    }
}
