mod answers;
mod attempt;
mod checkpoint;
mod ids;
mod question;
mod result;
mod timer;

pub use answers::{AnswerError, AnswerSheet, FlagSet, SubmittedAnswer};
pub use attempt::{Attempt, AttemptModelError};
pub use checkpoint::Checkpoint;
pub use ids::{AttemptId, ContentId, IdError};
pub use question::{Question, QuestionError};
pub use result::AttemptResult;
pub use timer::{TimerState, elapsed_between};
