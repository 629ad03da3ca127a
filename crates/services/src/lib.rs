#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod error;
pub mod exam;
pub mod results;

pub use exam_core::Clock;

pub use api::{
    DEFAULT_BASE_URL, ExamApiClient, ExamApiConfig, InMemoryExamApi, QuestionSource, SubmissionSink,
};
pub use app_services::{AppServices, ExamListing};
pub use error::{ExamApiError, SessionError};
pub use exam::{
    ExamSessionController, ExamTimer, SessionConfig, SessionNotice, SessionSnapshot,
    SubmitTrigger, TimerEvent,
};
pub use results::ResultsLedger;
