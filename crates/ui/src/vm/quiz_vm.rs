use quiz_core::model::{AttemptResult, TimerState};
use services::{
    AttemptError, AttemptPhase, QuizAttemptController, SubmitOutcome, SubmitTrigger, TickOutcome,
};

use super::time_fmt::format_countdown;
use crate::views::ViewError;

/// Remaining seconds at or below which the countdown is highlighted.
pub const LOW_TIME_SECS: u64 = 60;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub index: usize,
    pub prompt: String,
    pub options: Vec<String>,
    pub selected: Option<usize>,
    pub flagged: bool,
}

/// User intents that change the attempt itself. Navigation and filtering
/// stay inside [`QuizVm`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizCommand {
    Select { index: usize, option: usize },
    Clear { index: usize },
    ToggleFlag { index: usize },
    Submit { confirmed: bool },
    SaveForLater,
}

/// Apply a command to the controller.
///
/// # Errors
///
/// Propagates whatever the controller rejects.
pub async fn apply_command(
    controller: &mut QuizAttemptController,
    command: QuizCommand,
) -> Result<Option<SubmitOutcome>, AttemptError> {
    match command {
        QuizCommand::Select { index, option } => controller.select_answer(index, option)?,
        QuizCommand::Clear { index } => controller.clear_answer(index)?,
        QuizCommand::ToggleFlag { index } => {
            controller.toggle_flag(index)?;
        }
        QuizCommand::Submit { confirmed } => {
            let outcome = controller
                .submit(SubmitTrigger::Manual { confirmed })
                .await?;
            return Ok(Some(outcome));
        }
        QuizCommand::SaveForLater => controller.save_for_later().await?,
    }
    Ok(None)
}

/// Render-ready snapshot of the attempt plus page-local navigation state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuizVm {
    phase: AttemptPhase,
    questions: Vec<QuestionVm>,
    timer: Option<TimerState>,
    result: Option<AttemptResult>,
    current: usize,
    show_only_flagged: bool,
    confirm_open: bool,
    submitting: bool,
    error: Option<ViewError>,
}

impl QuizVm {
    /// Copy the controller's state; navigation is kept where possible.
    pub fn refresh(&mut self, controller: &QuizAttemptController) {
        self.phase = controller.phase();
        self.timer = controller.timer();
        self.result = controller.result().cloned();
        self.questions = controller.session().map_or_else(Vec::new, |session| {
            session
                .questions()
                .iter()
                .enumerate()
                .map(|(index, question)| QuestionVm {
                    index,
                    prompt: question.prompt().to_string(),
                    options: question.options().to_vec(),
                    selected: session.answers().get(index),
                    flagged: session.flags().contains(index),
                })
                .collect()
        });
        self.keep_current_visible();
    }

    /// Mark a command as handed to the attempt task. A confirmed submit
    /// shows as in flight until its result is recorded.
    pub fn note_sent(&mut self, command: QuizCommand) {
        if command == (QuizCommand::Submit { confirmed: true }) {
            self.confirm_open = false;
            self.submitting = true;
        }
    }

    /// Fold a command result into the view.
    pub fn record_command(
        &mut self,
        controller: &QuizAttemptController,
        result: &Result<Option<SubmitOutcome>, AttemptError>,
    ) {
        self.submitting = false;
        match result {
            Ok(Some(SubmitOutcome::NeedsConfirmation)) => {
                self.confirm_open = true;
                self.error = None;
            }
            Ok(_) => {
                self.confirm_open = false;
                self.error = None;
            }
            Err(err) => {
                self.confirm_open = false;
                self.error = Some(ViewError::from(err));
            }
        }
        self.refresh(controller);
    }

    /// Fold a countdown tick into the view.
    pub fn record_tick(
        &mut self,
        controller: &QuizAttemptController,
        result: &Result<TickOutcome, AttemptError>,
    ) {
        match result {
            Ok(TickOutcome::AutoSubmitted(_)) => {
                self.confirm_open = false;
                self.submitting = false;
                self.error = None;
            }
            Ok(_) => {}
            Err(err) => self.error = Some(ViewError::from(err)),
        }
        self.refresh(controller);
    }

    pub fn record_error(&mut self, err: &AttemptError) {
        self.error = Some(ViewError::from(err));
    }

    //
    // ─── NAVIGATION ─────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn visible_indices(&self) -> Vec<usize> {
        self.questions
            .iter()
            .filter(|q| !self.show_only_flagged || q.flagged)
            .map(|q| q.index)
            .collect()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuestionVm> {
        if self.show_only_flagged && !self.questions.get(self.current)?.flagged {
            return None;
        }
        self.questions.get(self.current)
    }

    /// 1-based position inside the visible list, and the visible count.
    #[must_use]
    pub fn position(&self) -> Option<(usize, usize)> {
        let visible = self.visible_indices();
        let at = visible.iter().position(|&i| i == self.current)?;
        Some((at + 1, visible.len()))
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.position().is_some_and(|(at, _)| at > 1)
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.position().is_some_and(|(at, len)| at < len)
    }

    pub fn next(&mut self) {
        let visible = self.visible_indices();
        if let Some(&index) = visible.iter().find(|&&i| i > self.current) {
            self.current = index;
        }
    }

    pub fn previous(&mut self) {
        let visible = self.visible_indices();
        if let Some(&index) = visible.iter().rev().find(|&&i| i < self.current) {
            self.current = index;
        }
    }

    #[must_use]
    pub fn show_only_flagged(&self) -> bool {
        self.show_only_flagged
    }

    pub fn set_show_only_flagged(&mut self, value: bool) {
        self.show_only_flagged = value;
        self.keep_current_visible();
    }

    fn keep_current_visible(&mut self) {
        let visible = self.visible_indices();
        if !visible.contains(&self.current) {
            if let Some(&first) = visible.first() {
                self.current = first;
            } else if self.current >= self.questions.len() {
                self.current = 0;
            }
        }
    }

    //
    // ─── ATTEMPT STATE ──────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn phase(&self) -> AttemptPhase {
        self.phase
    }

    /// Answers, flags and submit are live; off while a submission is in flight.
    #[must_use]
    pub fn can_edit(&self) -> bool {
        self.phase == AttemptPhase::InProgress && !self.submitting
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting || self.phase == AttemptPhase::Submitting
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.questions.iter().filter(|q| q.selected.is_some()).count()
    }

    #[must_use]
    pub fn flagged_count(&self) -> usize {
        self.questions.iter().filter(|q| q.flagged).count()
    }

    #[must_use]
    pub fn timer_label(&self) -> String {
        self.timer
            .map_or_else(|| "--:--".to_string(), |t| format_countdown(t.remaining_secs))
    }

    #[must_use]
    pub fn is_low_time(&self) -> bool {
        self.phase == AttemptPhase::InProgress
            && self
                .timer
                .is_some_and(|t| t.remaining_secs <= LOW_TIME_SECS)
    }

    #[must_use]
    pub fn confirm_open(&self) -> bool {
        self.confirm_open
    }

    pub fn cancel_submit(&mut self) {
        self.confirm_open = false;
    }

    #[must_use]
    pub fn error(&self) -> Option<ViewError> {
        self.error
    }

    #[must_use]
    pub fn result(&self) -> Option<&AttemptResult> {
        self.result.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(index: usize, flagged: bool) -> QuestionVm {
        QuestionVm {
            index,
            prompt: format!("Q{index}"),
            options: vec!["a".into(), "b".into()],
            selected: None,
            flagged,
        }
    }

    fn vm_with(flags: &[bool], remaining_secs: u64) -> QuizVm {
        QuizVm {
            phase: AttemptPhase::InProgress,
            questions: flags
                .iter()
                .enumerate()
                .map(|(i, &f)| question(i, f))
                .collect(),
            timer: Some(TimerState::compute(600, 600 - remaining_secs)),
            ..QuizVm::default()
        }
    }

    #[test]
    fn navigation_walks_every_question() {
        let mut vm = vm_with(&[false, false, false], 600);
        assert_eq!(vm.position(), Some((1, 3)));
        assert!(!vm.has_previous());

        vm.next();
        vm.next();
        assert_eq!(vm.current_index(), 2);
        assert!(!vm.has_next());

        vm.next();
        assert_eq!(vm.current_index(), 2);
        vm.previous();
        assert_eq!(vm.current_index(), 1);
    }

    #[test]
    fn flag_filter_limits_navigation() {
        let mut vm = vm_with(&[false, true, false, true, false], 600);
        vm.set_show_only_flagged(true);

        assert_eq!(vm.visible_indices(), vec![1, 3]);
        assert_eq!(vm.current_index(), 1);
        vm.next();
        assert_eq!(vm.current_index(), 3);
        assert_eq!(vm.position(), Some((2, 2)));

        vm.previous();
        assert_eq!(vm.current_index(), 1);
        vm.next();

        vm.set_show_only_flagged(false);
        assert_eq!(vm.visible_indices(), vec![0, 1, 2, 3, 4]);
        assert_eq!(vm.current_index(), 3);
    }

    #[test]
    fn filter_without_flags_shows_nothing() {
        let mut vm = vm_with(&[false, false], 600);
        vm.set_show_only_flagged(true);
        assert!(vm.visible_indices().is_empty());
        assert!(vm.current_question().is_none());
        assert_eq!(vm.position(), None);
    }

    #[test]
    fn low_time_warning_starts_at_one_minute() {
        assert!(!vm_with(&[false], 61).is_low_time());
        assert!(vm_with(&[false], 60).is_low_time());
        assert_eq!(vm_with(&[false], 59).timer_label(), "00:59");

        let mut done = vm_with(&[false], 10);
        done.phase = AttemptPhase::Submitted;
        assert!(!done.is_low_time());
    }

    #[test]
    fn timer_label_before_load() {
        assert_eq!(QuizVm::default().timer_label(), "--:--");
        assert!(!QuizVm::default().can_edit());
    }

    #[test]
    fn confirmation_dialog_opens_and_cancels() {
        let mut vm = vm_with(&[false], 600);
        vm.confirm_open = true;
        assert!(vm.confirm_open());
        vm.cancel_submit();
        assert!(!vm.confirm_open());
    }

    #[test]
    fn confirmed_submit_shows_in_flight_until_recorded() {
        let mut vm = vm_with(&[false, true], 300);
        vm.confirm_open = true;

        vm.note_sent(QuizCommand::Submit { confirmed: false });
        assert!(!vm.is_submitting());
        vm.note_sent(QuizCommand::Select { index: 0, option: 1 });
        assert!(!vm.is_submitting());

        vm.note_sent(QuizCommand::Submit { confirmed: true });
        assert!(vm.is_submitting());
        assert!(!vm.can_edit());
        assert!(!vm.confirm_open());
        assert_eq!(vm.flagged_count(), 1);
    }

    #[test]
    fn suspended_attempt_is_read_only() {
        let mut vm = vm_with(&[false], 300);
        vm.phase = AttemptPhase::Suspended;
        assert_eq!(vm.phase(), AttemptPhase::Suspended);
        assert!(!vm.can_edit());
        assert!(!vm.is_low_time());
    }
}
