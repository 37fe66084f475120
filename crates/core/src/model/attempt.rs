use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{AttemptId, ContentId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptModelError {
    #[error("attempt has no questions")]
    NoQuestions,
}

/// One user's timed pass at a fixed question set.
///
/// `started_at` and `duration_secs` come from the server and never change
/// for the lifetime of the attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    attempt_id: AttemptId,
    content_id: ContentId,
    started_at: DateTime<Utc>,
    duration_secs: u64,
    total_questions: usize,
}

impl Attempt {
    /// # Errors
    ///
    /// Returns `AttemptModelError::NoQuestions` if `total_questions` is zero.
    pub fn new(
        attempt_id: AttemptId,
        content_id: ContentId,
        started_at: DateTime<Utc>,
        duration_secs: u64,
        total_questions: usize,
    ) -> Result<Self, AttemptModelError> {
        if total_questions == 0 {
            return Err(AttemptModelError::NoQuestions);
        }
        Ok(Self {
            attempt_id,
            content_id,
            started_at,
            duration_secs,
            total_questions,
        })
    }

    #[must_use]
    pub fn attempt_id(&self) -> &AttemptId {
        &self.attempt_id
    }

    #[must_use]
    pub fn content_id(&self) -> &ContentId {
        &self.content_id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.total_questions
    }
}
