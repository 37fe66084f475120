use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Countdown snapshot derived from elapsed time.
///
/// Always satisfies `elapsed_secs + remaining_secs == duration` while the
/// attempt is within its window, and `remaining_secs` never exceeds the
/// duration nor drops below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimerState {
    pub elapsed_secs: u64,
    pub remaining_secs: u64,
}

impl TimerState {
    /// Clamp `elapsed_secs` into `[0, duration_secs]` and derive the remainder.
    #[must_use]
    pub fn compute(duration_secs: u64, elapsed_secs: u64) -> Self {
        let elapsed_secs = elapsed_secs.min(duration_secs);
        Self {
            elapsed_secs,
            remaining_secs: duration_secs - elapsed_secs,
        }
    }

    /// Fresh timer at the start of an attempt.
    #[must_use]
    pub fn full(duration_secs: u64) -> Self {
        Self::compute(duration_secs, 0)
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining_secs == 0
    }

    /// Whole minutes elapsed, as reported to the backend on submit.
    #[must_use]
    pub fn elapsed_minutes(&self) -> u64 {
        self.elapsed_secs / 60
    }
}

/// Whole seconds between `start` and `now`; zero if the clock went backwards.
#[must_use]
pub fn elapsed_between(start: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    u64::try_from((now - start).num_seconds()).unwrap_or(0)
}
