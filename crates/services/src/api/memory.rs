use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::watch;

use exam_core::model::{ExamScore, Question, QuestionId, SubmissionRequest};

use super::{QuestionSource, SubmissionSink};
use crate::error::ExamApiError;

/// In-memory exam backend for demo mode and tests.
///
/// Grades submissions against an answer key unless a failure is queued. Fetches
/// and submissions can be held open with the `pause_*` methods to simulate a
/// slow network.
pub struct InMemoryExamApi {
    questions: Mutex<Result<Vec<Question>, String>>,
    answer_key: Mutex<HashMap<QuestionId, String>>,
    submit_failures: Mutex<VecDeque<String>>,
    submissions: Mutex<Vec<SubmissionRequest>>,
    fetch_calls: AtomicUsize,
    fetch_gate: Gate,
    submit_gate: Gate,
}

impl Default for InMemoryExamApi {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryExamApi {
    #[must_use]
    pub fn new() -> Self {
        Self {
            questions: Mutex::new(Ok(Vec::new())),
            answer_key: Mutex::new(HashMap::new()),
            submit_failures: Mutex::new(VecDeque::new()),
            submissions: Mutex::new(Vec::new()),
            fetch_calls: AtomicUsize::new(0),
            fetch_gate: Gate::default(),
            submit_gate: Gate::default(),
        }
    }

    /// A short general-knowledge exam with its answer key.
    #[must_use]
    pub fn sample() -> Self {
        let items: [(u64, &str, [&str; 4], &str); 5] = [
            (1, "Which planet is known as the Red Planet?", ["Venus", "Mars", "Jupiter", "Mercury"], "Mars"),
            (2, "What is 7 × 8?", ["54", "56", "58", "64"], "56"),
            (3, "Which language is this client written in?", ["Go", "Kotlin", "Rust", "Swift"], "Rust"),
            (4, "How many minutes are in two hours?", ["60", "90", "120", "150"], "120"),
            (5, "What is the chemical symbol for gold?", ["Ag", "Au", "Gd", "Go"], "Au"),
        ];

        let questions = items
            .iter()
            .filter_map(|(id, text, options, _)| {
                Question::new(
                    QuestionId::new(*id),
                    *text,
                    options.map(|option| Some(option.to_string())),
                )
                .ok()
            })
            .collect();
        let key = items
            .iter()
            .map(|(id, _, _, answer)| (QuestionId::new(*id), (*answer).to_string()));

        Self::new().with_questions(questions).with_answer_key(key)
    }

    #[must_use]
    pub fn with_questions(self, questions: Vec<Question>) -> Self {
        *lock(&self.questions) = Ok(questions);
        self
    }

    /// Make every fetch fail with `message`.
    #[must_use]
    pub fn with_fetch_error(self, message: impl Into<String>) -> Self {
        *lock(&self.questions) = Err(message.into());
        self
    }

    #[must_use]
    pub fn with_answer_key(self, key: impl IntoIterator<Item = (QuestionId, String)>) -> Self {
        lock(&self.answer_key).extend(key);
        self
    }

    /// Queue a rejection for the next submission.
    pub fn fail_next_submit(&self, message: impl Into<String>) {
        lock(&self.submit_failures).push_back(message.into());
    }

    pub fn pause_fetches(&self) {
        self.fetch_gate.set(false);
    }

    pub fn resume_fetches(&self) {
        self.fetch_gate.set(true);
    }

    pub fn pause_submissions(&self) {
        self.submit_gate.set(false);
    }

    pub fn resume_submissions(&self) {
        self.submit_gate.set(true);
    }

    /// Every submission received, including rejected ones, in arrival order.
    #[must_use]
    pub fn submissions(&self) -> Vec<SubmissionRequest> {
        lock(&self.submissions).clone()
    }

    #[must_use]
    pub fn submission_count(&self) -> usize {
        lock(&self.submissions).len()
    }

    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    fn grade(&self, request: &SubmissionRequest) -> ExamScore {
        let key = lock(&self.answer_key);
        let correct = request
            .answers
            .iter()
            .filter(|(id, selected)| {
                selected.is_some_and(|value| key.get(id).is_some_and(|answer| answer == value))
            })
            .count();
        ExamScore::new(
            u32::try_from(correct).unwrap_or(u32::MAX),
            u32::try_from(request.answers.len()).unwrap_or(u32::MAX),
        )
    }
}

#[async_trait]
impl QuestionSource for InMemoryExamApi {
    async fn fetch_questions(&self) -> Result<Vec<Question>, ExamApiError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.fetch_gate.wait_open().await;
        lock(&self.questions)
            .clone()
            .map_err(ExamApiError::Rejected)
    }
}

#[async_trait]
impl SubmissionSink for InMemoryExamApi {
    async fn submit(&self, request: &SubmissionRequest) -> Result<ExamScore, ExamApiError> {
        lock(&self.submissions).push(request.clone());
        self.submit_gate.wait_open().await;

        if let Some(message) = lock(&self.submit_failures).pop_front() {
            return Err(ExamApiError::Rejected(message));
        }
        Ok(self.grade(request))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Open/closed latch that async callers can wait on.
struct Gate(watch::Sender<bool>);

impl Default for Gate {
    fn default() -> Self {
        Self(watch::channel(true).0)
    }
}

impl Gate {
    fn set(&self, open: bool) {
        self.0.send_replace(open);
    }

    async fn wait_open(&self) {
        let mut rx = self.0.subscribe();
        let _ = rx.wait_for(|open| *open).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{AnswerMap, ExamId};

    #[tokio::test]
    async fn sample_grades_against_key() {
        let api = InMemoryExamApi::sample();
        let questions = api.fetch_questions().await.unwrap();
        assert_eq!(questions.len(), 5);

        let mut answers = AnswerMap::for_questions(&questions);
        answers.select(QuestionId::new(1), "Mars").unwrap();
        answers.select(QuestionId::new(2), "54").unwrap();
        let request = SubmissionRequest {
            exam_id: ExamId::new(1),
            answers,
        };

        let score = api.submit(&request).await.unwrap();
        assert_eq!(score, ExamScore::new(1, 5));
        assert_eq!(api.submission_count(), 1);
    }

    #[tokio::test]
    async fn queued_failure_is_used_once() {
        let api = InMemoryExamApi::sample();
        api.fail_next_submit("Server busy");
        let request = SubmissionRequest {
            exam_id: ExamId::new(1),
            answers: AnswerMap::default(),
        };

        let err = api.submit(&request).await.unwrap_err();
        assert_eq!(err.user_message(), "Server busy");
        assert!(api.submit(&request).await.is_ok());
        assert_eq!(api.submission_count(), 2);
    }

    #[tokio::test]
    async fn fetch_error_is_rejected() {
        let api = InMemoryExamApi::new().with_fetch_error("No questions found");
        let err = api.fetch_questions().await.unwrap_err();
        assert_eq!(err.user_message(), "No questions found");
        assert_eq!(api.fetch_count(), 1);
    }
}
