mod quiz_vm;
mod time_fmt;

pub use quiz_vm::{LOW_TIME_SECS, QuestionVm, QuizCommand, QuizVm, apply_command};
pub use time_fmt::format_countdown;
