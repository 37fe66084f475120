use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IdError {
    #[error("{kind} id cannot be empty")]
    Empty { kind: &'static str },
}

/// Server-minted identifier for a single quiz attempt.
///
/// Also used as the key of the attempt's local checkpoint.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttemptId(String);

impl AttemptId {
    /// Creates a new `AttemptId` from a trimmed, non-empty value.
    ///
    /// # Errors
    ///
    /// Returns `IdError::Empty` if the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        non_empty(value.into(), "attempt").map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier for the quiz content (course quiz or forum question set).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    /// Creates a new `ContentId` from a trimmed, non-empty value.
    ///
    /// # Errors
    ///
    /// Returns `IdError::Empty` if the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        non_empty(value.into(), "content").map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn non_empty(raw: String, kind: &'static str) -> Result<String, IdError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(IdError::Empty { kind });
    }
    if trimmed.len() == raw.len() {
        Ok(raw)
    } else {
        Ok(trimmed.to_string())
    }
}

impl fmt::Debug for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttemptId({})", self.0)
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
