//! Shared error types for the services crate.

use thiserror::Error;

use exam_core::model::QuestionError;

pub use exam_core::model::SessionError;

/// Errors emitted by question sources and submission sinks.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExamApiError {
    #[error("invalid exam api url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("exam api request failed with status {status}")]
    HttpStatus {
        status: reqwest::StatusCode,
        message: Option<String>,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    InvalidQuestion(#[from] QuestionError),
    #[error("{0}")]
    Rejected(String),
}

impl ExamApiError {
    /// Text suitable for showing to the person taking the exam.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::HttpStatus {
                message: Some(message),
                ..
            } => message.clone(),
            Self::HttpStatus {
                status,
                message: None,
            } => format!("The exam server responded with {status}."),
            Self::Http(err) if err.is_timeout() => "The exam server took too long to respond.".into(),
            Self::Http(err) if err.is_connect() => "Could not reach the exam server.".into(),
            Self::Http(err) if err.is_decode() => "The exam server sent an unexpected response.".into(),
            Self::Rejected(message) => message.clone(),
            other => other.to_string(),
        }
    }
}
