use exam_core::model::{ExamId, ExamScore, ExamSheet, SessionPhase, SessionState, TimeLimit};

/// Read-only view of a session published to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub exam_id: ExamId,
    pub time_limit: TimeLimit,
    pub state: SessionState,
}

impl SessionSnapshot {
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    #[must_use]
    pub fn sheet(&self) -> Option<&ExamSheet> {
        self.state.sheet()
    }

    #[must_use]
    pub fn score(&self) -> Option<ExamScore> {
        match self.state {
            SessionState::Submitted(score) => Some(score),
            _ => None,
        }
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            SessionState::Error { message } => Some(message),
            _ => None,
        }
    }
}

/// Who asked for the submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    User,
    TimerExpired,
}

/// Transient, toast-like message emitted by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionNotice {
    LoadFailed(String),
    TimeUp,
    Submitted(ExamScore),
    SubmitFailed(String),
}

impl SessionNotice {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::LoadFailed(message) => message.clone(),
            Self::TimeUp => "Time's up! Submitting...".to_string(),
            Self::Submitted(score) => format!(
                "Exam submitted! Score: {}/{}",
                score.score(),
                score.total_questions()
            ),
            Self::SubmitFailed(message) => format!("Submission Error: {message}"),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::LoadFailed(_) | Self::SubmitFailed(_))
    }
}
