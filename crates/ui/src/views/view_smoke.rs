use std::sync::Arc;

use exam_core::model::{ExamId, ExamOutcome, ExamScore, Role, SessionContext};
use exam_core::time::fixed_now;
use services::InMemoryExamApi;

use super::test_harness::{ViewKind, setup_view_harness, setup_view_harness_with_api};

fn exam(time_limit: &str) -> ViewKind {
    ViewKind::Exam {
        exam_id: "1".to_string(),
        time_limit: time_limit.to_string(),
    }
}

fn person(role: Role) -> Option<SessionContext> {
    SessionContext::new("sam@example.com", role)
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_lists_exams() {
    let mut harness = setup_view_harness(ViewKind::Home, person(Role::Student));
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("General Knowledge"), "missing exam in {html}");
    assert!(html.contains("15 minutes"), "missing limit in {html}");
    assert!(html.contains("Signed in as sam@example.com"), "missing identity in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_smoke_renders_first_question() {
    let mut harness = setup_view_harness(exam("10"), None);
    harness.rebuild();
    assert!(harness.render().contains("Loading questions"));

    let html = harness.drive_until("Red Planet").await;
    assert!(html.contains("Which planet is known as the Red Planet?"), "missing question in {html}");
    assert!(html.contains("Q 1/5"), "missing progress in {html}");
    assert!(html.contains("Mars"), "missing option in {html}");
    assert!(html.contains("Next"), "missing next button in {html}");
    assert!(!html.contains("Submit Exam"), "submit shown too early in {html}");

    let html = harness.drive_until("Time left").await;
    assert!(html.contains("Time left:"), "missing countdown in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_smoke_restarts_when_exam_changes() {
    let view = ViewKind::ExamSwitch {
        from: "1".to_string(),
        to: "2".to_string(),
        time_limit: "10".to_string(),
    };
    let mut harness = setup_view_harness(view, None);
    harness.rebuild();
    let html = harness.drive_until("Red Planet").await;
    assert!(html.contains("Exam #1"), "missing first exam in {html}");

    let html = harness.drive_until("Exam #2").await;
    assert!(html.contains("Exam #2"), "exam id not updated in {html}");
    let html = harness.drive_until("Red Planet").await;
    assert!(html.contains("Q 1/5"), "second session not ready in {html}");
    assert_eq!(harness.api.fetch_count(), 2);
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_smoke_rejects_bad_time_limit() {
    let mut harness = setup_view_harness(exam("0"), None);
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Invalid exam time limit."), "missing error in {html}");
    assert_eq!(harness.api.fetch_count(), 0);
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_smoke_shows_fetch_error() {
    let api = Arc::new(InMemoryExamApi::new().with_fetch_error("No questions found"));
    let mut harness = setup_view_harness_with_api(exam("10"), None, api);
    harness.rebuild();
    let html = harness.drive_until("No questions found").await;
    assert!(html.contains("No questions found"), "missing error in {html}");
    assert!(html.contains("Back to exams"), "missing back button in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn results_view_smoke_renders_outcomes() {
    let mut harness = setup_view_harness(ViewKind::Results, None);
    harness.rebuild();
    assert!(harness.render().contains("No results yet"));

    let mut harness = setup_view_harness(ViewKind::Results, None);
    harness.services.results().record(ExamOutcome {
        exam_id: ExamId::new(3),
        score: ExamScore::new(3, 5),
        submitted_at: fixed_now(),
    });
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Exam #3"), "missing exam label in {html}");
    assert!(html.contains("3 / 5"), "missing score in {html}");
    assert!(html.contains("60%"), "missing percent in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn moderator_view_smoke_checks_role() {
    let mut harness = setup_view_harness(ViewKind::Moderator, person(Role::Moderator));
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Reported Issues"), "missing card in {html}");

    let mut harness = setup_view_harness(ViewKind::Moderator, person(Role::Student));
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Access denied"), "missing denial in {html}");
    assert!(html.contains("MODERATOR"), "missing role in {html}");

    let mut harness = setup_view_harness(ViewKind::Moderator, None);
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Sign in to view this page."), "missing sign-in hint in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn manage_users_view_smoke_requires_admin() {
    let mut harness = setup_view_harness(ViewKind::ManageUsers, person(Role::Admin));
    harness.rebuild();
    assert!(harness.render().contains("User management tools"));

    let mut harness = setup_view_harness(ViewKind::ManageUsers, person(Role::Moderator));
    harness.rebuild();
    assert!(harness.render().contains("Access denied"));
}
