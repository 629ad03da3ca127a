mod answers;
mod identity;
mod ids;
mod question;
mod score;
mod session;
mod time_limit;

pub use answers::{AnswerError, AnswerMap};
pub use identity::{AccessError, ParseRoleError, Role, SessionContext, authorize};
pub use ids::{ExamId, ParseIdError, QuestionId};
pub use question::{MAX_OPTIONS, Question, QuestionError};
pub use score::{ExamOutcome, ExamScore};
pub use session::{
    ExamRequest, ExamSession, ExamSheet, NO_QUESTIONS_MESSAGE, OptionPolicy, SessionError,
    SessionPhase, SessionState, SubmissionRequest,
};
pub use time_limit::{TimeLimit, TimeLimitError};
