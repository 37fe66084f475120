use chrono::{DateTime, Duration, Utc};
use std::fmt;

use quiz_core::model::{
    AnswerError, AnswerSheet, Attempt, Checkpoint, FlagSet, Question, SubmittedAnswer, TimerState,
    elapsed_between,
};

use super::progress::AttemptProgress;

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory state of an open attempt: questions, answers, flags and countdown.
///
/// Time is always passed in explicitly so the services layer controls the clock.
pub struct AttemptSession {
    attempt: Attempt,
    questions: Vec<Question>,
    answers: AnswerSheet,
    flags: FlagSet,
    effective_start: DateTime<Utc>,
    timer: TimerState,
}

impl AttemptSession {
    /// Open a session with no local checkpoint.
    ///
    /// The countdown is anchored at the server's `started_at`, so a resumed
    /// attempt keeps losing time while the user was away.
    #[must_use]
    pub fn fresh(attempt: Attempt, questions: Vec<Question>, now: DateTime<Utc>) -> Self {
        let total = attempt.total_questions();
        let effective_start = attempt.started_at();
        let timer = TimerState::compute(
            attempt.duration_secs(),
            elapsed_between(effective_start, now),
        );
        Self {
            answers: AnswerSheet::blank(total),
            flags: FlagSet::empty(total),
            attempt,
            questions,
            effective_start,
            timer,
        }
    }

    /// Open a session from a saved checkpoint, continuing the countdown from
    /// the checkpoint's elapsed time.
    #[must_use]
    pub fn restored(
        attempt: Attempt,
        questions: Vec<Question>,
        checkpoint: &Checkpoint,
        now: DateTime<Utc>,
    ) -> Self {
        let total = attempt.total_questions();
        let (answers, flags) = checkpoint.restore(total);
        let timer = TimerState::compute(attempt.duration_secs(), checkpoint.elapsed_secs);
        let effective_start = rewind(now, timer.elapsed_secs);
        Self {
            attempt,
            questions,
            answers,
            flags,
            effective_start,
            timer,
        }
    }

    #[must_use]
    pub fn attempt(&self) -> &Attempt {
        &self.attempt
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    #[must_use]
    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    #[must_use]
    pub fn timer(&self) -> TimerState {
        self.timer
    }

    #[must_use]
    pub fn effective_start(&self) -> DateTime<Utc> {
        self.effective_start
    }

    /// Recompute the countdown at `now`.
    ///
    /// Remaining time never increases, even if `now` moves backwards.
    pub fn advance_to(&mut self, now: DateTime<Utc>) -> TimerState {
        let next = TimerState::compute(
            self.attempt.duration_secs(),
            elapsed_between(self.effective_start, now),
        );
        if next.elapsed_secs > self.timer.elapsed_secs {
            self.timer = next;
        }
        self.timer
    }

    /// # Errors
    ///
    /// Returns `AnswerError` for an unknown question or option index.
    pub fn select(&mut self, index: usize, option: usize) -> Result<(), AnswerError> {
        match self.questions.get(index) {
            Some(question) => self
                .answers
                .select_checked(index, option, question.option_count()),
            None => self.answers.select(index, option),
        }
    }

    /// # Errors
    ///
    /// Returns `AnswerError::QuestionOutOfRange` for an unknown question index.
    pub fn clear(&mut self, index: usize) -> Result<(), AnswerError> {
        self.answers.clear(index)
    }

    /// # Errors
    ///
    /// Returns `AnswerError::QuestionOutOfRange` for an unknown question index.
    pub fn toggle_flag(&mut self, index: usize) -> Result<bool, AnswerError> {
        self.flags.toggle(index)
    }

    #[must_use]
    pub fn checkpoint(&self, saved_at: DateTime<Utc>) -> Checkpoint {
        Checkpoint::capture(&self.answers, &self.flags, self.timer.elapsed_secs, saved_at)
    }

    #[must_use]
    pub fn submission(&self) -> Vec<SubmittedAnswer> {
        self.answers.snapshot()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.answered_count()
    }

    #[must_use]
    pub fn remaining_count(&self) -> usize {
        self.attempt
            .total_questions()
            .saturating_sub(self.answered_count())
    }

    #[must_use]
    pub fn is_last_question(&self, index: usize) -> bool {
        index + 1 == self.attempt.total_questions()
    }

    #[must_use]
    pub fn filtered_question_indices(&self, show_only_flagged: bool) -> Vec<usize> {
        self.flags.filter_indices(show_only_flagged)
    }

    #[must_use]
    pub fn progress(&self) -> AttemptProgress {
        AttemptProgress {
            total: self.attempt.total_questions(),
            answered: self.answered_count(),
            remaining: self.remaining_count(),
            flagged: self.flags.len(),
            timer: self.timer,
        }
    }
}

fn rewind(now: DateTime<Utc>, elapsed_secs: u64) -> DateTime<Utc> {
    i64::try_from(elapsed_secs)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|delta| now.checked_sub_signed(delta))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

impl fmt::Debug for AttemptSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttemptSession")
            .field("attempt_id", self.attempt.attempt_id())
            .field("questions_len", &self.questions.len())
            .field("answered", &self.answered_count())
            .field("flagged", &self.flags.len())
            .field("timer", &self.timer)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
