use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{AnswerSheet, FlagSet};

/// Locally persisted snapshot of an in-progress attempt.
///
/// Always a full snapshot, never a delta, so the last write wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub answers: Vec<Option<usize>>,
    pub flags: Vec<usize>,
    pub elapsed_secs: u64,
    pub last_saved_at: DateTime<Utc>,
}

impl Checkpoint {
    #[must_use]
    pub fn capture(
        answers: &AnswerSheet,
        flags: &FlagSet,
        elapsed_secs: u64,
        saved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            answers: answers.slots().to_vec(),
            flags: flags.indices(),
            elapsed_secs,
            last_saved_at: saved_at,
        }
    }

    /// Rebuild answer and flag state for an attempt with `total_questions`.
    #[must_use]
    pub fn restore(&self, total_questions: usize) -> (AnswerSheet, FlagSet) {
        (
            AnswerSheet::restore(total_questions, self.answers.clone()),
            FlagSet::restore(total_questions, self.flags.iter().copied()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn capture_then_restore_preserves_state() {
        let mut answers = AnswerSheet::blank(4);
        answers.select(2, 1).unwrap();
        let mut flags = FlagSet::empty(4);
        flags.toggle(3).unwrap();

        let checkpoint = Checkpoint::capture(&answers, &flags, 42, fixed_now());
        let (restored_answers, restored_flags) = checkpoint.restore(4);

        assert_eq!(restored_answers, answers);
        assert_eq!(restored_flags, flags);
        assert_eq!(checkpoint.elapsed_secs, 42);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let checkpoint = Checkpoint {
            answers: vec![Some(1), None],
            flags: vec![0],
            elapsed_secs: 10,
            last_saved_at: fixed_now(),
        };
        let json = serde_json::to_value(&checkpoint).unwrap();
        assert_eq!(json["elapsedSecs"], 10);
        assert_eq!(json["answers"], serde_json::json!([1, null]));
        assert!(json.get("lastSavedAt").is_some());
    }
}
