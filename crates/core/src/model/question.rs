use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question {index} has no options")]
    NoOptions { index: usize },
}

/// A single read-only question supplied by the backend at attempt start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    index: usize,
    prompt: String,
    options: Vec<String>,
}

impl Question {
    /// Build a question at `index` with its ordered options.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::NoOptions` if `options` is empty.
    pub fn new(
        index: usize,
        prompt: impl Into<String>,
        options: Vec<String>,
    ) -> Result<Self, QuestionError> {
        if options.is_empty() {
            return Err(QuestionError::NoOptions { index });
        }
        Ok(Self {
            index,
            prompt: prompt.into(),
            options,
        })
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_requires_options() {
        let err = Question::new(2, "Empty?", Vec::new()).unwrap_err();
        assert_eq!(err, QuestionError::NoOptions { index: 2 });
    }

    #[test]
    fn question_keeps_option_order() {
        let q = Question::new(0, "Pick", vec!["b".into(), "a".into(), "c".into()]).unwrap();
        assert_eq!(q.options(), ["b", "a", "c"]);
        assert_eq!(q.option_count(), 3);
    }
}
