#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{AttemptId, AttemptResult, Checkpoint, ContentId};
use quiz_core::time::fixed_now;
use services::backend::{
    AttemptEnvelope, AttemptStatus, QuestionPayload, QuizBackend, QuizContent, SubmitRequest,
};
use services::{BackendError, Clock, QuizAttemptController};
use storage::repository::{CheckpointRepository, InMemoryRepository, StorageError};

pub const ATTEMPT_ID: &str = "att-1";
/// Every question's correct option in the fake backend.
pub const CORRECT_OPTION: usize = 1;

/// Scriptable stand-in for the remote quiz API.
pub struct FakeBackend {
    duration_secs: u64,
    question_count: usize,
    started_at: DateTime<Utc>,
    incomplete: AtomicBool,
    fail_status: AtomicBool,
    submit_failures: AtomicUsize,
    calls: Mutex<Vec<&'static str>>,
    submissions: Mutex<Vec<SubmitRequest>>,
}

impl FakeBackend {
    pub fn new(duration_secs: u64, question_count: usize) -> Arc<Self> {
        Arc::new(Self {
            duration_secs,
            question_count,
            started_at: fixed_now(),
            incomplete: AtomicBool::new(false),
            fail_status: AtomicBool::new(false),
            submit_failures: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
        })
    }

    pub fn with_incomplete_attempt(self: Arc<Self>) -> Arc<Self> {
        self.incomplete.store(true, Ordering::SeqCst);
        self
    }

    pub fn fail_status(&self) {
        self.fail_status.store(true, Ordering::SeqCst);
    }

    /// Make the next `n` submissions fail.
    pub fn fail_next_submits(&self, n: usize) {
        self.submit_failures.store(n, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn submissions(&self) -> Vec<SubmitRequest> {
        self.submissions.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    fn envelope(&self) -> AttemptEnvelope {
        AttemptEnvelope {
            attempt_id: ATTEMPT_ID.to_string(),
            started_at: Some(self.started_at),
            content: QuizContent {
                duration_seconds: self.duration_secs,
                questions: (0..self.question_count)
                    .map(|i| QuestionPayload {
                        prompt: format!("Question {i}"),
                        options: vec!["A".into(), "B".into(), "C".into()],
                    })
                    .collect(),
            },
        }
    }
}

#[async_trait]
impl QuizBackend for FakeBackend {
    async fn get_attempt_status(
        &self,
        _content_id: &ContentId,
    ) -> Result<AttemptStatus, BackendError> {
        self.record("status");
        if self.fail_status.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("status offline".into()));
        }
        Ok(AttemptStatus {
            incomplete_attempt: self.incomplete.load(Ordering::SeqCst),
        })
    }

    async fn start_attempt(&self, _content_id: &ContentId) -> Result<AttemptEnvelope, BackendError> {
        self.record("start");
        self.incomplete.store(true, Ordering::SeqCst);
        Ok(self.envelope())
    }

    async fn resume_attempt(
        &self,
        _content_id: &ContentId,
    ) -> Result<AttemptEnvelope, BackendError> {
        self.record("resume");
        Ok(self.envelope())
    }

    async fn submit_attempt(&self, request: SubmitRequest) -> Result<AttemptResult, BackendError> {
        self.record("submit");
        let pending = self.submit_failures.load(Ordering::SeqCst);
        if pending > 0 {
            self.submit_failures.store(pending - 1, Ordering::SeqCst);
            return Err(BackendError::Unavailable("submit offline".into()));
        }

        let total = u32::try_from(request.answers.len()).unwrap();
        let correct = u32::try_from(
            request
                .answers
                .iter()
                .filter(|a| a.selected_answer == Some(CORRECT_OPTION))
                .count(),
        )
        .unwrap();
        self.submissions.lock().unwrap().push(request);
        self.incomplete.store(false, Ordering::SeqCst);

        Ok(AttemptResult {
            score: f64::from(correct) * 100.0 / f64::from(total),
            correct_answers: correct,
            total_questions: total,
            reveal_answers: true,
            result_id: "result-1".into(),
        })
    }
}

/// Repository that rejects every operation.
pub struct OfflineRepository;

#[async_trait]
impl CheckpointRepository for OfflineRepository {
    async fn get_checkpoint(
        &self,
        _attempt_id: &AttemptId,
    ) -> Result<Option<Checkpoint>, StorageError> {
        Err(StorageError::Connection("storage offline".into()))
    }

    async fn save_checkpoint(
        &self,
        _attempt_id: &AttemptId,
        _checkpoint: &Checkpoint,
    ) -> Result<(), StorageError> {
        Err(StorageError::Connection("storage offline".into()))
    }

    async fn delete_checkpoint(&self, _attempt_id: &AttemptId) -> Result<(), StorageError> {
        Err(StorageError::Connection("storage offline".into()))
    }
}

pub fn content_id() -> ContentId {
    ContentId::new("quiz-42").unwrap()
}

pub fn attempt_id() -> AttemptId {
    AttemptId::new(ATTEMPT_ID).unwrap()
}

pub fn controller(
    clock: Clock,
    backend: &Arc<FakeBackend>,
    repo: &InMemoryRepository,
) -> QuizAttemptController {
    QuizAttemptController::new(clock, backend.clone(), Arc::new(repo.clone()))
}
