//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::AnswerError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

use crate::attempts::AttemptPhase;

/// Errors emitted by `QuizBackend` implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BackendError {
    #[error("quiz backend request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("quiz backend is misconfigured: {0}")]
    InvalidConfig(String),
    #[error("quiz backend returned an invalid response: {0}")]
    InvalidResponse(String),
    #[error("quiz backend unavailable: {0}")]
    Unavailable(String),
}

/// Errors emitted by `QuizAttemptController`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AttemptError {
    /// Loading the attempt failed; the session cannot continue.
    #[error("could not load the quiz attempt")]
    Initialization(#[source] BackendError),
    /// Submitting failed; local answers are intact and submission may be retried.
    #[error("could not submit the quiz attempt")]
    Submission(#[source] BackendError),
    #[error("attempt is not in progress (phase: {phase:?})")]
    NotInProgress { phase: AttemptPhase },
    #[error("attempt already submitted")]
    AlreadySubmitted,
    #[error(transparent)]
    Answer(#[from] AnswerError),
}

impl AttemptError {
    /// Whether the caller may retry the operation that produced this error.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Submission(_))
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}
