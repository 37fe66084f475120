use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use quiz_core::model::{
    Attempt, AttemptId, AttemptResult, Checkpoint, ContentId, Question, TimerState,
};
use storage::repository::CheckpointRepository;

use super::checkpoint_writer::CheckpointWriter;
use super::progress::{AttemptPhase, AttemptProgress};
use super::session::AttemptSession;
use super::timer::AttemptTimer;
use crate::Clock;
use crate::backend::{AttemptEnvelope, QuizBackend, SubmitRequest};
use crate::error::{AttemptError, BackendError};

/// What started a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    /// User pressed submit; `confirmed` is the answer to the yes/no prompt.
    Manual { confirmed: bool },
    /// The countdown reached zero. Bypasses confirmation.
    Auto,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// A manual submit that still needs the user's explicit yes.
    NeedsConfirmation,
    Submitted(AttemptResult),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The attempt is not open; nothing was recomputed.
    Idle,
    Running(TimerState),
    /// Time is up and the single auto-submit was already used.
    Expired(TimerState),
    AutoSubmitted(AttemptResult),
}

/// Owns one timed quiz attempt from load to submission.
///
/// All mutation goes through `&mut self`, so the tick, user input and
/// submission never overlap. Every answer/flag change queues a checkpoint
/// write; a successful submission deletes it.
pub struct QuizAttemptController {
    clock: Clock,
    backend: Arc<dyn QuizBackend>,
    writer: CheckpointWriter,
    phase: AttemptPhase,
    session: Option<AttemptSession>,
    timer: Option<AttemptTimer>,
    result: Option<AttemptResult>,
    auto_submitted: bool,
    saved_elapsed: Option<u64>,
}

impl QuizAttemptController {
    /// Must be called from within a tokio runtime (spawns the checkpoint writer).
    #[must_use]
    pub fn new(
        clock: Clock,
        backend: Arc<dyn QuizBackend>,
        checkpoints: Arc<dyn CheckpointRepository>,
    ) -> Self {
        Self {
            clock,
            backend,
            writer: CheckpointWriter::spawn(checkpoints),
            phase: AttemptPhase::Uninitialized,
            session: None,
            timer: None,
            result: None,
            auto_submitted: false,
            saved_elapsed: None,
        }
    }

    /// Load or resume the attempt for `content_id`.
    ///
    /// Only the first call does anything; later calls return `Ok(())`
    /// without touching state, since page-load events may repeat.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::Initialization` if the backend cannot provide
    /// the attempt. The controller is then `Failed` for good.
    pub async fn begin(&mut self, content_id: &ContentId) -> Result<(), AttemptError> {
        if self.phase != AttemptPhase::Uninitialized {
            return Ok(());
        }
        self.phase = AttemptPhase::Loading;

        match self.load(content_id).await {
            Ok(session) => {
                info!(
                    attempt_id = %session.attempt().attempt_id(),
                    %content_id,
                    remaining_secs = session.timer().remaining_secs,
                    "attempt in progress"
                );
                self.session = Some(session);
                self.phase = AttemptPhase::InProgress;
                self.timer = Some(AttemptTimer::start());
                Ok(())
            }
            Err(err) => {
                warn!(%content_id, error = %err, "attempt failed to load");
                self.phase = AttemptPhase::Failed;
                Err(err)
            }
        }
    }

    async fn load(&self, content_id: &ContentId) -> Result<AttemptSession, AttemptError> {
        let status = self
            .backend
            .get_attempt_status(content_id)
            .await
            .map_err(AttemptError::Initialization)?;
        let envelope = if status.incomplete_attempt {
            self.backend.resume_attempt(content_id).await
        } else {
            self.backend.start_attempt(content_id).await
        };
        let envelope = envelope.map_err(AttemptError::Initialization)?;

        let now = self.clock.now();
        let (attempt, questions) = attempt_from_envelope(content_id, envelope, now)
            .map_err(AttemptError::Initialization)?;

        let checkpoint = match self.writer.load(attempt.attempt_id()).await {
            Ok(checkpoint) => checkpoint,
            Err(err) => {
                warn!(attempt_id = %attempt.attempt_id(), error = %err, "checkpoint read failed");
                None
            }
        };

        Ok(match checkpoint {
            Some(checkpoint) => AttemptSession::restored(attempt, questions, &checkpoint, now),
            None => AttemptSession::fresh(attempt, questions, now),
        })
    }

    /// # Errors
    ///
    /// Returns `AttemptError::NotInProgress` outside `InProgress`, or
    /// `AttemptError::Answer` for an unknown question/option.
    pub fn select_answer(&mut self, index: usize, option: usize) -> Result<(), AttemptError> {
        self.open_session_mut()?.select(index, option)?;
        self.persist();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AttemptError::NotInProgress` outside `InProgress`, or
    /// `AttemptError::Answer` for an unknown question.
    pub fn clear_answer(&mut self, index: usize) -> Result<(), AttemptError> {
        self.open_session_mut()?.clear(index)?;
        self.persist();
        Ok(())
    }

    /// Returns whether the question is flagged after the toggle.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::NotInProgress` outside `InProgress`, or
    /// `AttemptError::Answer` for an unknown question.
    pub fn toggle_flag(&mut self, index: usize) -> Result<bool, AttemptError> {
        let flagged = self.open_session_mut()?.toggle_flag(index)?;
        self.persist();
        Ok(flagged)
    }

    /// Recompute the countdown from the controller's clock.
    ///
    /// # Errors
    ///
    /// Propagates `AttemptError::Submission` if the auto-submit fails.
    pub async fn tick(&mut self) -> Result<TickOutcome, AttemptError> {
        let now = self.clock.now();
        self.tick_at(now).await
    }

    /// Recompute the countdown at `now`; auto-submits once when time runs out.
    ///
    /// # Errors
    ///
    /// Propagates `AttemptError::Submission` if the auto-submit fails. The
    /// attempt stays open so the user can retry manually.
    pub async fn tick_at(
        &mut self,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<TickOutcome, AttemptError> {
        if self.phase != AttemptPhase::InProgress {
            return Ok(TickOutcome::Idle);
        }
        let Some(session) = self.session.as_mut() else {
            return Ok(TickOutcome::Idle);
        };

        let timer = session.advance_to(now);
        if self.saved_elapsed != Some(timer.elapsed_secs) {
            self.persist();
        }
        if !timer.is_expired() {
            return Ok(TickOutcome::Running(timer));
        }

        self.timer = None;
        if self.auto_submitted {
            return Ok(TickOutcome::Expired(timer));
        }
        self.auto_submitted = true;
        info!("time is up, submitting automatically");
        let result = self.submit_now(SubmitTrigger::Auto).await?;
        Ok(TickOutcome::AutoSubmitted(result))
    }

    /// Wait for the next one-second tick and process it.
    ///
    /// Returns `None` once the timer is disarmed (submitted, expired, saved
    /// for later, closed, or not yet begun).
    pub async fn next_tick(&mut self) -> Option<Result<TickOutcome, AttemptError>> {
        self.timer.as_mut()?.tick().await;
        Some(self.tick().await)
    }

    /// Resolve when the next one-second tick is due; never resolves while
    /// the timer is disarmed. Cancel-safe, so it can sit in a `select!`
    /// next to user input. Follow up with [`Self::tick`].
    pub async fn tick_due(&mut self) {
        match self.timer.as_mut() {
            Some(timer) => timer.tick().await,
            None => std::future::pending().await,
        }
    }

    /// Submit the attempt.
    ///
    /// A manual submit without confirmation returns `NeedsConfirmation`
    /// and changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::AlreadySubmitted` after a successful submit,
    /// `AttemptError::NotInProgress` before the attempt is loaded, and
    /// `AttemptError::Submission` when the backend rejects the submission
    /// (answers and checkpoint are kept; retry is allowed).
    pub async fn submit(&mut self, trigger: SubmitTrigger) -> Result<SubmitOutcome, AttemptError> {
        match self.phase {
            AttemptPhase::InProgress => {}
            AttemptPhase::Submitted => return Err(AttemptError::AlreadySubmitted),
            phase => return Err(AttemptError::NotInProgress { phase }),
        }
        if trigger == (SubmitTrigger::Manual { confirmed: false }) {
            return Ok(SubmitOutcome::NeedsConfirmation);
        }
        let result = self.submit_now(trigger).await?;
        Ok(SubmitOutcome::Submitted(result))
    }

    async fn submit_now(&mut self, trigger: SubmitTrigger) -> Result<AttemptResult, AttemptError> {
        let now = self.clock.now();
        let phase = self.phase;
        let session = self
            .session
            .as_mut()
            .ok_or(AttemptError::NotInProgress { phase })?;
        let timer = session.advance_to(now);
        let attempt_id = session.attempt().attempt_id().clone();
        let request = SubmitRequest {
            attempt_id: attempt_id.clone(),
            answers: session.submission(),
            elapsed_minutes: timer.elapsed_minutes(),
            started_at: session.attempt().started_at(),
        };

        self.phase = AttemptPhase::Submitting;
        self.timer = None;

        match self.backend.submit_attempt(request).await {
            Ok(result) => {
                if !self.writer.delete(attempt_id.clone()).await {
                    warn!(%attempt_id, "submitted but checkpoint could not be removed");
                }
                info!(
                    %attempt_id,
                    ?trigger,
                    score = result.score,
                    correct = result.correct_answers,
                    total = result.total_questions,
                    "attempt submitted"
                );
                self.result = Some(result.clone());
                self.phase = AttemptPhase::Submitted;
                Ok(result)
            }
            Err(err) => {
                warn!(%attempt_id, ?trigger, error = %err, "attempt submission failed");
                self.phase = AttemptPhase::InProgress;
                if !timer.is_expired() {
                    self.timer = Some(AttemptTimer::start());
                }
                Err(AttemptError::Submission(err))
            }
        }
    }

    /// "Continue later": store a checkpoint now and suspend this controller.
    ///
    /// The attempt moves to `Suspended`: the countdown stops and answers,
    /// flags and submission are rejected. A new controller resumes it from the
    /// checkpoint. The server-side clock keeps running while the user is away.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::NotInProgress` outside `InProgress`.
    pub async fn save_for_later(&mut self) -> Result<(), AttemptError> {
        let now = self.clock.now();
        self.open_session_mut()?.advance_to(now);
        self.persist();
        self.timer = None;
        self.phase = AttemptPhase::Suspended;
        self.writer.flush().await;
        info!("attempt saved for later");
        Ok(())
    }

    /// Teardown on navigation away: checkpoint the elapsed time, stop the
    /// countdown and drain pending writes.
    pub async fn close(&mut self) {
        if self.phase == AttemptPhase::InProgress {
            self.persist();
        }
        self.timer = None;
        self.writer.flush().await;
    }

    fn open_session_mut(&mut self) -> Result<&mut AttemptSession, AttemptError> {
        match (self.phase, self.session.as_mut()) {
            (AttemptPhase::InProgress, Some(session)) => Ok(session),
            (AttemptPhase::Submitted, _) => Err(AttemptError::AlreadySubmitted),
            (phase, _) => Err(AttemptError::NotInProgress { phase }),
        }
    }

    fn persist(&mut self) {
        let now = self.clock.now();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let timer = session.advance_to(now);
        self.saved_elapsed = Some(timer.elapsed_secs);
        let checkpoint: Checkpoint = session.checkpoint(now);
        self.writer
            .save(session.attempt().attempt_id().clone(), checkpoint);
    }

    //
    // ─── QUERIES ──────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn phase(&self) -> AttemptPhase {
        self.phase
    }

    #[must_use]
    pub fn session(&self) -> Option<&AttemptSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn attempt_id(&self) -> Option<&AttemptId> {
        self.session.as_ref().map(|s| s.attempt().attempt_id())
    }

    #[must_use]
    pub fn result(&self) -> Option<&AttemptResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn timer(&self) -> Option<TimerState> {
        self.session.as_ref().map(AttemptSession::timer)
    }

    #[must_use]
    pub fn is_timer_running(&self) -> bool {
        self.timer.is_some()
    }

    #[must_use]
    pub fn progress(&self) -> Option<AttemptProgress> {
        self.session.as_ref().map(AttemptSession::progress)
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.session
            .as_ref()
            .map_or(0, AttemptSession::answered_count)
    }

    #[must_use]
    pub fn remaining_count(&self) -> usize {
        self.session
            .as_ref()
            .map_or(0, AttemptSession::remaining_count)
    }

    #[must_use]
    pub fn is_last_question(&self, index: usize) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.is_last_question(index))
    }

    #[must_use]
    pub fn filtered_question_indices(&self, show_only_flagged: bool) -> Vec<usize> {
        self.session
            .as_ref()
            .map(|s| s.filtered_question_indices(show_only_flagged))
            .unwrap_or_default()
    }

    /// Checkpoint operations that failed so far. Reload survival is degraded
    /// when non-zero; the attempt itself is unaffected.
    #[must_use]
    pub fn checkpoint_failures(&self) -> u64 {
        self.writer.failed_writes()
    }

    /// Wait for queued checkpoint writes to land.
    pub async fn flush_checkpoints(&self) {
        self.writer.flush().await;
    }
}

impl fmt::Debug for QuizAttemptController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizAttemptController")
            .field("phase", &self.phase)
            .field("session", &self.session)
            .field("timer_running", &self.timer.is_some())
            .field("auto_submitted", &self.auto_submitted)
            .finish_non_exhaustive()
    }
}

fn attempt_from_envelope(
    content_id: &ContentId,
    envelope: AttemptEnvelope,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<(Attempt, Vec<Question>), BackendError> {
    let invalid = |err: &dyn fmt::Display| BackendError::InvalidResponse(err.to_string());

    let attempt_id = AttemptId::new(envelope.attempt_id).map_err(|e| invalid(&e))?;
    let questions = envelope
        .content
        .questions
        .into_iter()
        .enumerate()
        .map(|(index, q)| Question::new(index, q.prompt, q.options))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| invalid(&e))?;
    let attempt = Attempt::new(
        attempt_id,
        content_id.clone(),
        envelope.started_at.unwrap_or(now),
        envelope.content.duration_seconds,
        questions.len(),
    )
    .map_err(|e| invalid(&e))?;
    Ok((attempt, questions))
}
