//! Boundary to the exam backend.

mod http;
mod memory;

use async_trait::async_trait;

use exam_core::model::{ExamScore, Question, SubmissionRequest};

use crate::error::ExamApiError;

pub use http::{ExamApiClient, ExamApiConfig, DEFAULT_BASE_URL, QUESTIONS_PATH, SUBMIT_PATH};
pub use memory::InMemoryExamApi;

/// Supplies the ordered question list for an exam. Treated as idempotent.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// # Errors
    ///
    /// Returns `ExamApiError` when the questions cannot be retrieved or decoded.
    async fn fetch_questions(&self) -> Result<Vec<Question>, ExamApiError>;
}

/// Accepts a finished answer sheet and grades it.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    /// # Errors
    ///
    /// Returns `ExamApiError` when the submission is refused or cannot be sent;
    /// [`ExamApiError::user_message`] carries the text to surface.
    async fn submit(&self, request: &SubmissionRequest) -> Result<ExamScore, ExamApiError>;
}
