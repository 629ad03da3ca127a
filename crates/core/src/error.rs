use thiserror::Error;

use crate::model::{AccessError, AnswerError, QuestionError, SessionError, TimeLimitError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Answer(#[from] AnswerError),
    #[error(transparent)]
    TimeLimit(#[from] TimeLimitError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Access(#[from] AccessError),
}
