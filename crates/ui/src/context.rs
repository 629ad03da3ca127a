use std::sync::Arc;

use exam_core::model::SessionContext;
use services::{
    AppServices, ExamListing, ExamSessionController, ResultsLedger, SessionError,
};

pub trait UiApp: Send + Sync {
    fn services(&self) -> AppServices;

    /// Who is using the client; `None` when signed out.
    fn identity(&self) -> Option<SessionContext>;

    /// Exams offered on the home screen.
    fn exams(&self) -> Vec<ExamListing>;
}

#[derive(Clone)]
pub struct AppContext {
    services: AppServices,
    identity: Option<SessionContext>,
    exams: Arc<Vec<ExamListing>>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            services: app.services(),
            identity: app.identity(),
            exams: Arc::new(app.exams()),
        }
    }

    #[must_use]
    pub fn identity(&self) -> Option<&SessionContext> {
        self.identity.as_ref()
    }

    #[must_use]
    pub fn exams(&self) -> &[ExamListing] {
        &self.exams
    }

    #[must_use]
    pub fn results(&self) -> Arc<ResultsLedger> {
        self.services.results()
    }

    /// Open an exam session from raw route parameters.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when the exam id or time limit is invalid.
    pub fn open_session(
        &self,
        exam_id: &str,
        time_limit: Option<&str>,
    ) -> Result<ExamSessionController, SessionError> {
        self.services.open_session(exam_id, time_limit)
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
