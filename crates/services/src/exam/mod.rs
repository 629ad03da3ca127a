//! Timed exam sessions: countdown, orchestration and teardown.

mod controller;
mod notice;
mod timer;

pub use controller::{ExamSessionController, SessionConfig};
pub use notice::{SessionNotice, SessionSnapshot, SubmitTrigger};
pub use timer::{ExamTimer, TimerEvent};
