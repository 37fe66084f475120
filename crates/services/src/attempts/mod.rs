mod checkpoint_writer;
mod controller;
mod progress;
mod session;
mod timer;

// Public API of the attempt subsystem.
pub use crate::error::AttemptError;
pub use checkpoint_writer::CheckpointWriter;
pub use controller::{QuizAttemptController, SubmitOutcome, SubmitTrigger, TickOutcome};
pub use progress::{AttemptPhase, AttemptProgress};
pub use session::AttemptSession;
pub use timer::AttemptTimer;
