use services::AttemptError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    /// The attempt could not be fetched or resumed.
    LoadFailed,
    /// The backend rejected the submission; answers are still here.
    SubmitFailed,
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::LoadFailed => "Couldn't load this quiz. Please try again later.",
            Self::SubmitFailed => "Couldn't submit your answers. Please try again.",
            Self::Unknown => "Something went wrong. Please try again.",
        }
    }
}

impl From<&AttemptError> for ViewError {
    fn from(err: &AttemptError) -> Self {
        match err {
            AttemptError::Initialization(_) => Self::LoadFailed,
            AttemptError::Submission(_) => Self::SubmitFailed,
            _ => Self::Unknown,
        }
    }
}
