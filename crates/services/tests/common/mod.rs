//! Shared fixtures for the services integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use exam_core::model::{Question, QuestionId, SessionPhase};
use services::{
    ExamSessionController, InMemoryExamApi, QuestionSource, SessionConfig, SessionSnapshot,
    SubmissionSink,
};
use wiremock::MockServer;

pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Question `id` with options "A" through "D".
pub fn question(id: u64) -> Question {
    Question::new(
        QuestionId::new(id),
        format!("Question {id}"),
        ["A", "B", "C", "D"].map(|option| Some(option.to_string())),
    )
    .unwrap()
}

pub fn questions(count: u64) -> Vec<Question> {
    (1..=count).map(question).collect()
}

pub fn open(api: &Arc<InMemoryExamApi>, time_limit: Option<&str>) -> ExamSessionController {
    open_with(api, time_limit, SessionConfig::default())
}

pub fn open_with(
    api: &Arc<InMemoryExamApi>,
    time_limit: Option<&str>,
    config: SessionConfig,
) -> ExamSessionController {
    ExamSessionController::open(
        "7",
        time_limit,
        Arc::clone(api) as Arc<dyn QuestionSource>,
        Arc::clone(api) as Arc<dyn SubmissionSink>,
        config,
    )
    .expect("valid session parameters")
}

/// Wait until the controller reports `phase`, failing after a minute of
/// (possibly paused) tokio time.
pub async fn wait_for_phase(
    controller: &ExamSessionController,
    phase: SessionPhase,
) -> SessionSnapshot {
    let mut rx = controller.subscribe();
    let snapshot = tokio::time::timeout(
        Duration::from_secs(60),
        rx.wait_for(|snapshot| snapshot.phase() == phase),
    )
    .await
    .unwrap_or_else(|_| panic!("session never reached {phase}"))
    .expect("controller dropped")
    .clone();
    snapshot
}

/// Let spawned tasks run without advancing the clock.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
