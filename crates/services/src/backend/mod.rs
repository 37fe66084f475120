//! Contract with the remote quiz API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quiz_core::model::{AttemptId, AttemptResult, ContentId, SubmittedAnswer};

use crate::error::BackendError;

mod http;

pub use http::{BackendConfig, HttpQuizBackend};

/// Whether the user already has an unfinished attempt on a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptStatus {
    pub incomplete_attempt: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPayload {
    pub prompt: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizContent {
    pub duration_seconds: u64,
    pub questions: Vec<QuestionPayload>,
}

/// Response shape shared by `start_attempt` and `resume_attempt`.
///
/// `started_at` is omitted by some servers on a fresh start, in which case
/// the attempt is anchored at the local clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptEnvelope {
    pub attempt_id: String,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    pub content: QuizContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    #[serde(skip)]
    pub attempt_id: AttemptId,
    pub answers: Vec<SubmittedAnswer>,
    pub elapsed_minutes: u64,
    pub started_at: DateTime<Utc>,
}

#[async_trait]
pub trait QuizBackend: Send + Sync {
    /// # Errors
    ///
    /// Returns `BackendError` on transport or server failures.
    async fn get_attempt_status(&self, content_id: &ContentId)
    -> Result<AttemptStatus, BackendError>;

    /// Start a new attempt; the server mints the attempt id.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` on transport or server failures.
    async fn start_attempt(&self, content_id: &ContentId) -> Result<AttemptEnvelope, BackendError>;

    /// Fetch the existing unfinished attempt with its original start time.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` on transport or server failures.
    async fn resume_attempt(&self, content_id: &ContentId)
    -> Result<AttemptEnvelope, BackendError>;

    /// Submit answers for scoring.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` on transport or server failures.
    async fn submit_attempt(&self, request: SubmitRequest) -> Result<AttemptResult, BackendError>;
}
