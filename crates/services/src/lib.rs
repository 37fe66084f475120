#![forbid(unsafe_code)]

pub mod app_services;
pub mod attempts;
pub mod backend;
pub mod error;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use attempts::{
    AttemptPhase, AttemptProgress, AttemptSession, CheckpointWriter, QuizAttemptController,
    SubmitOutcome, SubmitTrigger, TickOutcome,
};
pub use backend::{BackendConfig, HttpQuizBackend, QuizBackend};
pub use error::{AppServicesError, AttemptError, BackendError};
