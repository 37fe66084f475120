use quiz_core::model::TimerState;

/// Lifecycle of a single attempt.
///
/// `Uninitialized → Loading → InProgress → Submitting → Submitted`, with
/// `Submitting → InProgress` when a submission fails, `Loading → Failed`
/// when the attempt cannot be loaded, and `InProgress → Suspended` after
/// "continue later". `Submitted`, `Failed` and `Suspended` are terminal for
/// the controller; a suspended attempt resumes through a new `begin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttemptPhase {
    #[default]
    Uninitialized,
    Loading,
    InProgress,
    Submitting,
    Submitted,
    Failed,
    /// Checkpointed for "continue later"; this controller accepts no more changes.
    Suspended,
}

impl AttemptPhase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Submitted | Self::Failed | Self::Suspended)
    }
}

/// Aggregated view of attempt progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub flagged: usize,
    pub timer: TimerState,
}
