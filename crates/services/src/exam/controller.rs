use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use exam_core::Clock;
use exam_core::model::{
    ExamOutcome, ExamRequest, ExamScore, ExamSession, OptionPolicy, Question, QuestionId,
    SessionError, SessionPhase, SessionState,
};

use super::notice::{SessionNotice, SessionSnapshot, SubmitTrigger};
use super::timer::{ExamTimer, TimerEvent};
use crate::api::{QuestionSource, SubmissionSink};
use crate::error::ExamApiError;
use crate::results::ResultsLedger;

const NOTICE_CAPACITY: usize = 16;

/// Knobs applied to every session a caller opens.
#[derive(Clone, Debug, Default)]
pub struct SessionConfig {
    pub option_policy: OptionPolicy,
    pub clock: Clock,
    pub results: Option<Arc<ResultsLedger>>,
}

/// Drives one exam session: fetches questions, runs the countdown and
/// submits the answers once.
///
/// Cheap to clone; all clones share the session. Every operation is
/// synchronous and never blocks on the network. Background work is tied to a
/// cancellation token that [`ExamSessionController::close`] (or dropping the
/// last clone) trips, after which late results are discarded.
#[derive(Clone)]
pub struct ExamSessionController {
    inner: Arc<Inner>,
}

struct Inner {
    session: Mutex<ExamSession>,
    snapshots: watch::Sender<SessionSnapshot>,
    notices: broadcast::Sender<SessionNotice>,
    remaining: watch::Sender<Option<u32>>,
    timer: Mutex<Option<ExamTimer>>,
    sink: Arc<dyn SubmissionSink>,
    cancel: CancellationToken,
    clock: Clock,
    results: Option<Arc<ResultsLedger>>,
}

impl ExamSessionController {
    /// Validate the raw route parameters and start loading.
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTimeLimit` or `SessionError::InvalidExamId`
    /// without touching the network.
    pub fn open(
        exam_id: &str,
        time_limit: Option<&str>,
        source: Arc<dyn QuestionSource>,
        sink: Arc<dyn SubmissionSink>,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let request = ExamRequest::from_route(exam_id, time_limit).inspect_err(|err| {
            warn!(exam_id, ?time_limit, error = %err, "refusing to open exam session");
        })?;
        Ok(Self::start(request, source, sink, config))
    }

    /// Start a session for an already validated request and spawn the fetch.
    ///
    /// Must be called inside a tokio runtime.
    #[must_use]
    pub fn start(
        request: ExamRequest,
        source: Arc<dyn QuestionSource>,
        sink: Arc<dyn SubmissionSink>,
        config: SessionConfig,
    ) -> Self {
        let session = ExamSession::new(request).with_option_policy(config.option_policy);
        let (snapshots, _) = watch::channel(capture(&session));
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        let (remaining, _) = watch::channel(None);

        let inner = Arc::new(Inner {
            session: Mutex::new(session),
            snapshots,
            notices,
            remaining,
            timer: Mutex::new(None),
            sink,
            cancel: CancellationToken::new(),
            clock: config.clock,
            results: config.results,
        });

        info!(
            exam_id = %request.exam_id(),
            time_limit = %request.time_limit(),
            "loading exam questions"
        );
        spawn_fetch(&inner, source);
        Self { inner }
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.snapshots.borrow().clone()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.inner.snapshots.borrow().phase()
    }

    /// Every state change, latest value first.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.snapshots.subscribe()
    }

    /// Transient notices emitted after the call.
    #[must_use]
    pub fn notices(&self) -> broadcast::Receiver<SessionNotice> {
        self.inner.notices.subscribe()
    }

    /// Remaining seconds; `None` until the questions are loaded.
    #[must_use]
    pub fn timer(&self) -> watch::Receiver<Option<u32>> {
        self.inner.remaining.subscribe()
    }

    #[must_use]
    pub fn remaining_secs(&self) -> Option<u32> {
        *self.inner.remaining.borrow()
    }

    /// Select `option` for question `id`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` after teardown and whatever the session
    /// rejects otherwise (wrong phase, unknown question, unknown option under
    /// a strict policy). A rejected change leaves the state untouched.
    pub fn change_answer(
        &self,
        id: QuestionId,
        option: impl Into<String>,
    ) -> Result<(), SessionError> {
        if self.is_closed() {
            return Err(SessionError::Closed);
        }
        let mut session = self.inner.lock_session();
        match session.change_answer(id, option) {
            Ok(()) => {
                self.inner.publish(&session);
                Ok(())
            }
            Err(err) => {
                debug!(question = %id, error = %err, "answer change rejected");
                Err(err)
            }
        }
    }

    /// Move to the next question. Returns whether the position changed.
    pub fn next(&self) -> bool {
        self.navigate(ExamSession::next)
    }

    /// Move to the previous question. Returns whether the position changed.
    pub fn previous(&self) -> bool {
        self.navigate(ExamSession::previous)
    }

    /// Submit the current answers. Returns `false` when the request is ignored
    /// because the session is not Ready, a submission is already in flight,
    /// or the controller is closed.
    pub fn submit(&self) -> bool {
        self.inner.submit_with(SubmitTrigger::User)
    }

    /// Tear the session down: stop the countdown and discard pending results.
    pub fn close(&self) {
        if self.inner.cancel.is_cancelled() {
            return;
        }
        self.inner.cancel.cancel();
        self.inner.stop_timer();
        info!(phase = %self.phase(), "exam session closed");
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    fn navigate(&self, step: fn(&mut ExamSession) -> bool) -> bool {
        if self.is_closed() {
            return false;
        }
        let mut session = self.inner.lock_session();
        let moved = step(&mut *session);
        if moved {
            self.inner.publish(&session);
        } else {
            debug!(phase = %session.phase(), "navigation ignored");
        }
        moved
    }
}

impl Inner {
    fn lock_session(&self) -> MutexGuard<'_, ExamSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, session: &ExamSession) {
        self.snapshots.send_replace(capture(session));
    }

    fn notify(&self, notice: SessionNotice) {
        // No subscribers is fine.
        let _ = self.notices.send(notice);
    }

    fn stop_timer(&self) {
        let timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner).take();
        drop(timer);
    }

    fn apply_fetch(self: &Arc<Self>, result: Result<Vec<Question>, ExamApiError>) {
        let mut session = self.lock_session();
        let outcome = match result {
            Ok(questions) => {
                let count = questions.len();
                session.apply_loaded(questions).map(|phase| (phase, count))
            }
            Err(err) => {
                warn!(error = %err, "failed to fetch exam questions");
                session
                    .apply_load_failure(err.user_message())
                    .map(|()| (SessionPhase::Error, 0))
            }
        };

        let (phase, count) = match outcome {
            Ok(applied) => applied,
            Err(err) => {
                debug!(error = %err, "ignoring question fetch result");
                return;
            }
        };
        self.publish(&session);
        let failure = match session.state() {
            SessionState::Error { message } => Some(message.clone()),
            _ => None,
        };
        let seconds = session.request().time_limit().total_seconds();
        drop(session);

        if let Some(message) = failure {
            warn!(%message, "exam session failed to load");
            self.notify(SessionNotice::LoadFailed(message));
            return;
        }
        if phase == SessionPhase::Ready {
            info!(questions = count, seconds, "exam ready, starting timer");
            self.start_timer(seconds);
        }
    }

    fn start_timer(self: &Arc<Self>, seconds: u32) {
        if self.cancel.is_cancelled() {
            return;
        }
        let mut timer = ExamTimer::start_with_token(seconds, &self.cancel);
        let remaining = timer.remaining();
        let events = timer.take_events();
        self.remaining.send_replace(Some(seconds));
        *self.timer.lock().unwrap_or_else(PoisonError::into_inner) = Some(timer);

        if let Some(events) = events {
            tokio::spawn(watch_timer(
                Arc::downgrade(self),
                self.cancel.clone(),
                remaining,
                events,
            ));
        }
    }

    fn on_expired(self: &Arc<Self>) {
        info!("exam time is up");
        if !self.submit_with(SubmitTrigger::TimerExpired) {
            debug!("expiry ignored, session is not accepting submissions");
        }
    }

    fn submit_with(self: &Arc<Self>, trigger: SubmitTrigger) -> bool {
        if self.cancel.is_cancelled() {
            debug!(?trigger, "submit ignored after teardown");
            return false;
        }

        let request = {
            let mut session = self.lock_session();
            match session.begin_submit() {
                Ok(request) => {
                    self.publish(&session);
                    request
                }
                Err(err) => {
                    debug!(?trigger, error = %err, "submit ignored");
                    return false;
                }
            }
        };

        info!(
            exam_id = %request.exam_id,
            answered = request.answers.answered_count(),
            total = request.answers.len(),
            ?trigger,
            "submitting exam"
        );
        if trigger == SubmitTrigger::TimerExpired {
            self.notify(SessionNotice::TimeUp);
        }

        let weak = Arc::downgrade(self);
        let cancel = self.cancel.clone();
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            let result = sink.submit(&request).await;
            if cancel.is_cancelled() {
                debug!("discarding submission result after teardown");
                return;
            }
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.apply_submit_result(result);
        });
        true
    }

    fn apply_submit_result(&self, result: Result<ExamScore, ExamApiError>) {
        match result {
            Ok(score) => {
                {
                    let mut session = self.lock_session();
                    if let Err(err) = session.apply_submit_success(score) {
                        debug!(error = %err, "ignoring submission result");
                        return;
                    }
                    if let Some(results) = &self.results {
                        results.record(ExamOutcome {
                            exam_id: session.request().exam_id(),
                            score,
                            submitted_at: self.clock.now(),
                        });
                    }
                    self.publish(&session);
                }
                self.stop_timer();
                info!(
                    score = score.score(),
                    total = score.total_questions(),
                    "exam submitted"
                );
                self.notify(SessionNotice::Submitted(score));
            }
            Err(err) => {
                let message = err.user_message();
                warn!(error = %err, "exam submission failed");
                {
                    let mut session = self.lock_session();
                    if let Err(err) = session.apply_submit_failure() {
                        debug!(error = %err, "ignoring submission failure");
                        return;
                    }
                    self.publish(&session);
                }
                self.notify(SessionNotice::SubmitFailed(message));
            }
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn capture(session: &ExamSession) -> SessionSnapshot {
    let request = session.request();
    SessionSnapshot {
        exam_id: request.exam_id(),
        time_limit: request.time_limit(),
        state: session.state().clone(),
    }
}

fn spawn_fetch(inner: &Arc<Inner>, source: Arc<dyn QuestionSource>) {
    let weak = Arc::downgrade(inner);
    let cancel = inner.cancel.clone();
    tokio::spawn(async move {
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("question fetch abandoned");
                return;
            }
            result = source.fetch_questions() => result,
        };
        if cancel.is_cancelled() {
            return;
        }
        let Some(inner) = weak.upgrade() else {
            return;
        };
        inner.apply_fetch(result);
    });
}

/// Mirror the countdown into the controller and submit on expiry.
async fn watch_timer(
    inner: Weak<Inner>,
    cancel: CancellationToken,
    mut remaining: watch::Receiver<u32>,
    mut events: mpsc::Receiver<TimerEvent>,
) {
    let mut ticking = true;
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            changed = remaining.changed(), if ticking => {
                if changed.is_err() {
                    ticking = false;
                    continue;
                }
                let secs = *remaining.borrow_and_update();
                let Some(inner) = inner.upgrade() else {
                    return;
                };
                inner.remaining.send_replace(Some(secs));
            }
            event = events.recv() => {
                if event != Some(TimerEvent::Expired) {
                    return;
                }
                if let Some(inner) = inner.upgrade() {
                    inner.remaining.send_replace(Some(0));
                    inner.on_expired();
                }
                return;
            }
        }
    }
}
