use std::sync::Arc;

use exam_core::model::{ExamId, SessionError, TimeLimit};

use crate::Clock;
use crate::api::{ExamApiClient, ExamApiConfig, InMemoryExamApi, QuestionSource, SubmissionSink};
use crate::error::ExamApiError;
use crate::exam::{ExamSessionController, SessionConfig};
use crate::results::ResultsLedger;

/// An exam the home screen offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamListing {
    pub exam_id: ExamId,
    pub title: String,
    pub time_limit: TimeLimit,
}

impl ExamListing {
    #[must_use]
    pub fn new(exam_id: ExamId, title: impl Into<String>, time_limit: TimeLimit) -> Self {
        Self {
            exam_id,
            title: title.into(),
            time_limit,
        }
    }
}

/// Assembles the exam backend, the results ledger and session settings.
#[derive(Clone)]
pub struct AppServices {
    questions: Arc<dyn QuestionSource>,
    submissions: Arc<dyn SubmissionSink>,
    results: Arc<ResultsLedger>,
    config: SessionConfig,
}

impl AppServices {
    /// Build services that talk to the exam backend over HTTP.
    ///
    /// # Errors
    ///
    /// Returns `ExamApiError` if the base URL is invalid or the HTTP client
    /// cannot be built.
    pub fn http(config: ExamApiConfig, clock: Clock) -> Result<Self, ExamApiError> {
        let client = Arc::new(ExamApiClient::new(config)?);
        Ok(Self::from_parts(client.clone(), client, clock))
    }

    /// Build services backed by an in-memory exam backend.
    #[must_use]
    pub fn in_memory(api: Arc<InMemoryExamApi>, clock: Clock) -> Self {
        Self::from_parts(api.clone(), api, clock)
    }

    #[must_use]
    pub fn from_parts(
        questions: Arc<dyn QuestionSource>,
        submissions: Arc<dyn SubmissionSink>,
        clock: Clock,
    ) -> Self {
        let results = Arc::new(ResultsLedger::new());
        let config = SessionConfig {
            clock,
            results: Some(Arc::clone(&results)),
            ..SessionConfig::default()
        };
        Self {
            questions,
            submissions,
            results,
            config,
        }
    }

    #[must_use]
    pub fn with_session_config(mut self, config: SessionConfig) -> Self {
        self.config = SessionConfig {
            results: Some(Arc::clone(&self.results)),
            ..config
        };
        self
    }

    #[must_use]
    pub fn results(&self) -> Arc<ResultsLedger> {
        Arc::clone(&self.results)
    }

    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        self.config.clone()
    }

    /// Open a session from raw route parameters.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTimeLimit` or `SessionError::InvalidExamId`.
    pub fn open_session(
        &self,
        exam_id: &str,
        time_limit: Option<&str>,
    ) -> Result<ExamSessionController, SessionError> {
        ExamSessionController::open(
            exam_id,
            time_limit,
            Arc::clone(&self.questions),
            Arc::clone(&self.submissions),
            self.session_config(),
        )
    }
}
