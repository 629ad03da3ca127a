use services::SessionError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    InvalidTimeLimit,
    InvalidExamId,
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ViewError::InvalidTimeLimit => "Invalid exam time limit.",
            ViewError::InvalidExamId => "Invalid exam.",
            ViewError::Unknown => "Something went wrong. Please try again.",
        }
    }
}

impl From<&SessionError> for ViewError {
    fn from(err: &SessionError) -> Self {
        match err {
            SessionError::InvalidTimeLimit(_) => ViewError::InvalidTimeLimit,
            SessionError::InvalidExamId(_) => ViewError::InvalidExamId,
            _ => ViewError::Unknown,
        }
    }
}
