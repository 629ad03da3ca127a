use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::model::answers::{AnswerError, AnswerMap};
use crate::model::ids::{ExamId, ParseIdError, QuestionId};
use crate::model::question::Question;
use crate::model::score::ExamScore;
use crate::model::time_limit::{TimeLimit, TimeLimitError};

/// Shown when the question source answers with an empty list.
pub const NO_QUESTIONS_MESSAGE: &str = "No questions found.";

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("invalid exam time limit: {0}")]
    InvalidTimeLimit(#[source] TimeLimitError),

    #[error("invalid exam id: {0}")]
    InvalidExamId(#[source] ParseIdError),

    #[error("session is {actual}, expected {expected}")]
    UnexpectedPhase {
        expected: SessionPhase,
        actual: SessionPhase,
    },

    #[error("a submission is already in flight")]
    Submitting,

    #[error("session already submitted")]
    Completed,

    #[error("session has been closed")]
    Closed,

    #[error(transparent)]
    Answer(#[from] AnswerError),
}

impl From<TimeLimitError> for SessionError {
    fn from(err: TimeLimitError) -> Self {
        Self::InvalidTimeLimit(err)
    }
}

impl From<ParseIdError> for SessionError {
    fn from(err: ParseIdError) -> Self {
        Self::InvalidExamId(err)
    }
}

impl SessionError {
    /// True for errors that must abort the session before it starts.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidTimeLimit(_) | Self::InvalidExamId(_))
    }
}

//
// ─── REQUEST ──────────────────────────────────────────────────────────────────
//

/// Validated parameters an exam session is opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamRequest {
    exam_id: ExamId,
    time_limit: TimeLimit,
}

impl ExamRequest {
    #[must_use]
    pub fn new(exam_id: ExamId, time_limit: TimeLimit) -> Self {
        Self {
            exam_id,
            time_limit,
        }
    }

    /// Parse the raw route parameters. The time limit is checked first so a
    /// missing limit is always reported as such.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTimeLimit` or `SessionError::InvalidExamId`.
    pub fn from_route(exam_id: &str, time_limit: Option<&str>) -> Result<Self, SessionError> {
        let time_limit = TimeLimit::parse(time_limit)?;
        let exam_id = exam_id.parse::<ExamId>()?;
        Ok(Self::new(exam_id, time_limit))
    }

    #[must_use]
    pub fn exam_id(&self) -> ExamId {
        self.exam_id
    }

    #[must_use]
    pub fn time_limit(&self) -> TimeLimit {
        self.time_limit
    }
}

/// Whether selected options must be one of the options shown for the question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OptionPolicy {
    #[default]
    Permissive,
    Strict,
}

/// Payload handed to the submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub exam_id: ExamId,
    pub answers: AnswerMap,
}

//
// ─── STATE ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    Error,
    Ready,
    Submitting,
    Submitted,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionPhase::Loading => "loading",
            SessionPhase::Error => "failed",
            SessionPhase::Ready => "ready",
            SessionPhase::Submitting => "submitting",
            SessionPhase::Submitted => "submitted",
        };
        f.write_str(label)
    }
}

/// Questions, position and answers of a loaded session.
///
/// `questions` is never empty and `current` always indexes into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamSheet {
    questions: Vec<Question>,
    current: usize,
    answers: AnswerMap,
    submitting: bool,
}

impl ExamSheet {
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 == self.questions.len()
    }

    /// Share of the exam reached, counting the current question as reached.
    #[must_use]
    pub fn progress_percent(&self) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let pct = (self.current + 1) as f32 / self.questions.len() as f32 * 100.0;
        pct
    }

    fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Error { message: String },
    Ready(ExamSheet),
    Submitted(ExamScore),
}

impl SessionState {
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match self {
            SessionState::Loading => SessionPhase::Loading,
            SessionState::Error { .. } => SessionPhase::Error,
            SessionState::Ready(sheet) if sheet.submitting => SessionPhase::Submitting,
            SessionState::Ready(_) => SessionPhase::Ready,
            SessionState::Submitted(_) => SessionPhase::Submitted,
        }
    }

    #[must_use]
    pub fn sheet(&self) -> Option<&ExamSheet> {
        match self {
            SessionState::Ready(sheet) => Some(sheet),
            _ => None,
        }
    }
}

//
// ─── SESSION ──────────────────────────────────────────────────────────────────
//

/// Synchronous exam session state machine.
///
/// Every transition is a method here; async orchestration (fetching, timers,
/// submission) lives in the services layer and only calls into these.
#[derive(Debug, Clone)]
pub struct ExamSession {
    request: ExamRequest,
    policy: OptionPolicy,
    state: SessionState,
}

impl ExamSession {
    #[must_use]
    pub fn new(request: ExamRequest) -> Self {
        Self {
            request,
            policy: OptionPolicy::default(),
            state: SessionState::Loading,
        }
    }

    #[must_use]
    pub fn with_option_policy(mut self, policy: OptionPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn request(&self) -> ExamRequest {
        self.request
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    /// Apply a successful fetch. Empty lists and duplicate ids land in Error.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnexpectedPhase` unless the session is Loading.
    pub fn apply_loaded(&mut self, questions: Vec<Question>) -> Result<SessionPhase, SessionError> {
        self.expect_phase(SessionPhase::Loading)?;

        if questions.is_empty() {
            self.state = SessionState::Error {
                message: NO_QUESTIONS_MESSAGE.to_string(),
            };
            return Ok(self.phase());
        }

        let mut seen = HashSet::with_capacity(questions.len());
        if let Some(dup) = questions.iter().find(|q| !seen.insert(q.id())) {
            self.state = SessionState::Error {
                message: format!("Question {} appears more than once.", dup.id()),
            };
            return Ok(self.phase());
        }

        let answers = AnswerMap::for_questions(&questions);
        self.state = SessionState::Ready(ExamSheet {
            questions,
            current: 0,
            answers,
            submitting: false,
        });
        Ok(self.phase())
    }

    /// # Errors
    ///
    /// Returns `SessionError::UnexpectedPhase` unless the session is Loading.
    pub fn apply_load_failure(&mut self, message: impl Into<String>) -> Result<(), SessionError> {
        self.expect_phase(SessionPhase::Loading)?;
        self.state = SessionState::Error {
            message: message.into(),
        };
        Ok(())
    }

    /// Record a selection for `id`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Submitting`/`Completed`/`UnexpectedPhase` outside
    /// Ready, and `SessionError::Answer` for unknown questions or, under
    /// [`OptionPolicy::Strict`], unknown options.
    pub fn change_answer(
        &mut self,
        id: QuestionId,
        option: impl Into<String>,
    ) -> Result<(), SessionError> {
        let policy = self.policy;
        let sheet = self.ready_sheet_mut()?;
        let option = option.into();

        if policy == OptionPolicy::Strict {
            let question = sheet
                .question(id)
                .ok_or(AnswerError::UnknownQuestion(id))?;
            if !question.has_option(&option) {
                return Err(AnswerError::UnknownOption { id, option }.into());
            }
        }

        sheet.answers.select(id, option)?;
        Ok(())
    }

    /// Move forward one question. Returns whether the index changed.
    pub fn next(&mut self) -> bool {
        let Ok(sheet) = self.ready_sheet_mut() else {
            return false;
        };
        if sheet.is_last() {
            return false;
        }
        sheet.current += 1;
        true
    }

    /// Move back one question. Returns whether the index changed.
    pub fn previous(&mut self) -> bool {
        let Ok(sheet) = self.ready_sheet_mut() else {
            return false;
        };
        if sheet.is_first() {
            return false;
        }
        sheet.current -= 1;
        true
    }

    /// Enter Submitting and capture the payload to send.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Submitting` while another submission is in
    /// flight, `SessionError::Completed` once submitted, and
    /// `SessionError::UnexpectedPhase` while Loading or failed.
    pub fn begin_submit(&mut self) -> Result<SubmissionRequest, SessionError> {
        let exam_id = self.request.exam_id();
        let sheet = self.ready_sheet_mut()?;
        sheet.submitting = true;
        Ok(SubmissionRequest {
            exam_id,
            answers: sheet.answers.clone(),
        })
    }

    /// # Errors
    ///
    /// Returns `SessionError::UnexpectedPhase` unless a submission is in flight.
    pub fn apply_submit_success(&mut self, score: ExamScore) -> Result<(), SessionError> {
        self.expect_phase(SessionPhase::Submitting)?;
        self.state = SessionState::Submitted(score);
        Ok(())
    }

    /// Return to Ready so the user can retry. Answers and position are kept.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnexpectedPhase` unless a submission is in flight.
    pub fn apply_submit_failure(&mut self) -> Result<(), SessionError> {
        self.expect_phase(SessionPhase::Submitting)?;
        if let SessionState::Ready(sheet) = &mut self.state {
            sheet.submitting = false;
        }
        Ok(())
    }

    fn expect_phase(&self, expected: SessionPhase) -> Result<(), SessionError> {
        let actual = self.phase();
        if actual != expected {
            return Err(SessionError::UnexpectedPhase { expected, actual });
        }
        Ok(())
    }

    fn ready_sheet_mut(&mut self) -> Result<&mut ExamSheet, SessionError> {
        let actual = self.phase();
        match &mut self.state {
            SessionState::Ready(sheet) if !sheet.submitting => Ok(sheet),
            SessionState::Ready(_) => Err(SessionError::Submitting),
            SessionState::Submitted(_) => Err(SessionError::Completed),
            SessionState::Loading | SessionState::Error { .. } => {
                Err(SessionError::UnexpectedPhase {
                    expected: SessionPhase::Ready,
                    actual,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ExamRequest {
        ExamRequest::from_route("7", Some("10")).unwrap()
    }

    fn question(id: u64) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Question {id}"),
            ["A", "B", "C", "D"].map(|o| Some(o.to_string())),
        )
        .unwrap()
    }

    fn ready_session(count: u64) -> ExamSession {
        let mut session = ExamSession::new(request());
        session
            .apply_loaded((1..=count).map(question).collect())
            .unwrap();
        session
    }

    #[test]
    fn route_parsing_rejects_bad_limits_before_ids() {
        for raw in [None, Some(""), Some("0"), Some("-5"), Some("soon")] {
            let err = ExamRequest::from_route("not-an-id", raw).unwrap_err();
            assert!(matches!(err, SessionError::InvalidTimeLimit(_)), "{raw:?}");
            assert!(err.is_configuration());
        }
        let err = ExamRequest::from_route("x1", Some("5")).unwrap_err();
        assert!(matches!(err, SessionError::InvalidExamId(_)));
    }

    #[test]
    fn load_builds_unanswered_map_for_every_question() {
        let session = ready_session(3);
        let sheet = session.state().sheet().unwrap();
        assert_eq!(session.phase(), SessionPhase::Ready);
        assert_eq!(sheet.current_index(), 0);
        assert_eq!(
            sheet.answers().ids().collect::<Vec<_>>(),
            sheet.questions().iter().map(Question::id).collect::<Vec<_>>()
        );
        assert_eq!(sheet.answers().answered_count(), 0);
    }

    #[test]
    fn empty_load_is_an_error() {
        let mut session = ExamSession::new(request());
        assert_eq!(session.apply_loaded(Vec::new()), Ok(SessionPhase::Error));
        assert_eq!(
            session.state(),
            &SessionState::Error {
                message: NO_QUESTIONS_MESSAGE.to_string()
            }
        );
    }

    #[test]
    fn duplicate_ids_are_an_error() {
        let mut session = ExamSession::new(request());
        let phase = session
            .apply_loaded(vec![question(1), question(2), question(1)])
            .unwrap();
        assert_eq!(phase, SessionPhase::Error);
    }

    #[test]
    fn second_load_is_rejected() {
        let mut session = ready_session(2);
        assert_eq!(
            session.apply_loaded(vec![question(9)]),
            Err(SessionError::UnexpectedPhase {
                expected: SessionPhase::Loading,
                actual: SessionPhase::Ready
            })
        );
    }

    #[test]
    fn navigation_is_clamped() {
        let mut session = ready_session(3);
        assert!(!session.previous());
        assert!(session.next());
        assert!(session.next());
        assert!(!session.next());
        let sheet = session.state().sheet().unwrap();
        assert_eq!(sheet.current_index(), 2);
        assert!(sheet.is_last());
    }

    #[test]
    fn permissive_policy_accepts_any_option() {
        let mut session = ready_session(1);
        session.change_answer(QuestionId::new(1), "Z").unwrap();
        let sheet = session.state().sheet().unwrap();
        assert_eq!(sheet.answers().selected(QuestionId::new(1)), Some("Z"));
    }

    #[test]
    fn strict_policy_rejects_unknown_option() {
        let mut session = ExamSession::new(request()).with_option_policy(OptionPolicy::Strict);
        session.apply_loaded(vec![question(1)]).unwrap();
        let err = session.change_answer(QuestionId::new(1), "Z").unwrap_err();
        assert!(matches!(
            err,
            SessionError::Answer(AnswerError::UnknownOption { .. })
        ));
        session.change_answer(QuestionId::new(1), "C").unwrap();
    }

    #[test]
    fn unknown_question_is_rejected() {
        let mut session = ready_session(1);
        let err = session.change_answer(QuestionId::new(5), "A").unwrap_err();
        assert_eq!(
            err,
            SessionError::Answer(AnswerError::UnknownQuestion(QuestionId::new(5)))
        );
    }

    #[test]
    fn submit_is_gated_while_in_flight() {
        let mut session = ready_session(2);
        let payload = session.begin_submit().unwrap();
        assert_eq!(payload.exam_id, ExamId::new(7));
        assert_eq!(session.phase(), SessionPhase::Submitting);
        assert_eq!(session.begin_submit(), Err(SessionError::Submitting));
        assert!(!session.next());
        assert_eq!(
            session.change_answer(QuestionId::new(1), "A"),
            Err(SessionError::Submitting)
        );
    }

    #[test]
    fn failed_submit_allows_retry_without_touching_answers() {
        let mut session = ready_session(3);
        session.change_answer(QuestionId::new(1), "B").unwrap();
        session.next();
        let first = session.begin_submit().unwrap();
        session.apply_submit_failure().unwrap();

        let sheet = session.state().sheet().unwrap();
        assert!(!sheet.is_submitting());
        assert_eq!(sheet.current_index(), 1);

        let second = session.begin_submit().unwrap();
        assert_eq!(first, second);
        session.apply_submit_success(ExamScore::new(1, 3)).unwrap();
        assert_eq!(session.state(), &SessionState::Submitted(ExamScore::new(1, 3)));
    }

    #[test]
    fn submitted_session_ignores_everything() {
        let mut session = ready_session(2);
        session.begin_submit().unwrap();
        session.apply_submit_success(ExamScore::new(2, 2)).unwrap();

        assert_eq!(session.begin_submit(), Err(SessionError::Completed));
        assert_eq!(
            session.change_answer(QuestionId::new(1), "A"),
            Err(SessionError::Completed)
        );
        assert!(!session.next());
        assert!(!session.previous());
        assert!(session.apply_submit_failure().is_err());
    }

    #[test]
    fn error_state_ignores_navigation_and_submit() {
        let mut session = ExamSession::new(request());
        session.apply_load_failure("No questions found").unwrap();
        assert!(!session.next());
        assert!(!session.previous());
        assert!(matches!(
            session.begin_submit(),
            Err(SessionError::UnexpectedPhase { .. })
        ));
    }

    #[test]
    fn submission_payload_serializes_for_the_wire() {
        let mut session = ready_session(2);
        session.change_answer(QuestionId::new(2), "D").unwrap();
        let payload = session.begin_submit().unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"examId": 7, "answers": {"1": null, "2": "D"}})
        );
    }

    #[test]
    fn progress_counts_current_question() {
        let mut session = ready_session(4);
        session.next();
        let sheet = session.state().sheet().unwrap();
        assert!((sheet.progress_percent() - 50.0).abs() < f32::EPSILON);
    }
}
