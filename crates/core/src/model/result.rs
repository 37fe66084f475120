use serde::{Deserialize, Serialize};

/// Scored outcome returned by the backend after a successful submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResult {
    /// Score as a percentage in `[0, 100]`.
    pub score: f64,
    pub correct_answers: u32,
    pub total_questions: u32,
    #[serde(default)]
    pub reveal_answers: bool,
    pub result_id: String,
}

impl AttemptResult {
    #[must_use]
    pub fn incorrect_answers(&self) -> u32 {
        self.total_questions.saturating_sub(self.correct_answers)
    }
}
