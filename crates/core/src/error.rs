use thiserror::Error;

use crate::model::{AnswerError, AttemptModelError, IdError, QuestionError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Id(#[from] IdError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Attempt(#[from] AttemptModelError),
    #[error(transparent)]
    Answer(#[from] AnswerError),
}
