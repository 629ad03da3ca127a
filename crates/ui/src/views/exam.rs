use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use exam_core::model::SessionPhase;
use services::{ExamSessionController, SessionNotice};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::ViewError;
use crate::vm::{ExamIntent, ExamScreenVm, QuestionCardVm, map_countdown, map_exam_screen};

/// Keyed on the route parameters so a different exam always gets a fresh
/// controller and countdown.
#[component]
pub fn ExamView(exam_id: String, time_limit: String) -> Element {
    rsx! {
        ExamSessionScreen {
            key: "{exam_id}-{time_limit}",
            exam_id: exam_id.clone(),
            time_limit: time_limit.clone(),
        }
    }
}

#[component]
fn ExamSessionScreen(exam_id: String, time_limit: String) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();

    let opened = use_hook(|| {
        ctx.open_session(&exam_id, Some(time_limit.as_str()))
            .map_err(|err| {
                warn!(%exam_id, %time_limit, error = %err, "cannot start exam");
                ViewError::from(&err)
            })
    });
    let controller = opened.as_ref().ok().cloned();
    let config_error = opened.as_ref().err().copied();

    let mut snapshot = use_signal(|| controller.as_ref().map(ExamSessionController::snapshot));
    let mut remaining = use_signal(|| None::<u32>);
    let mut notice = use_signal(|| None::<SessionNotice>);

    use_effect(move || {
        if config_error.is_some() {
            navigator.replace(Route::Home {});
        }
    });

    let for_snapshots = controller.clone();
    use_future(move || {
        let controller = for_snapshots.clone();
        async move {
            let Some(controller) = controller else {
                return;
            };
            let mut rx = controller.subscribe();
            loop {
                let current = rx.borrow_and_update().clone();
                let submitted = current.phase() == SessionPhase::Submitted;
                snapshot.set(Some(current));
                if submitted {
                    navigator.push(Route::Results {});
                    return;
                }
                if rx.changed().await.is_err() {
                    return;
                }
            }
        }
    });

    let for_timer = controller.clone();
    use_future(move || {
        let controller = for_timer.clone();
        async move {
            let Some(controller) = controller else {
                return;
            };
            let mut rx = controller.timer();
            loop {
                remaining.set(*rx.borrow_and_update());
                if rx.changed().await.is_err() {
                    return;
                }
            }
        }
    });

    let for_notices = controller.clone();
    use_future(move || {
        let controller = for_notices.clone();
        async move {
            let Some(controller) = controller else {
                return;
            };
            let mut rx = controller.notices();
            loop {
                match rx.recv().await {
                    Ok(next) => notice.set(Some(next)),
                    Err(RecvError::Lagged(skipped)) => debug!(skipped, "exam notices lagged"),
                    Err(RecvError::Closed) => return,
                }
            }
        }
    });

    let for_drop = controller.clone();
    use_drop(move || {
        if let Some(controller) = &for_drop {
            controller.close();
        }
    });

    let dispatch = {
        let controller = controller.clone();
        use_callback(move |intent: ExamIntent| {
            let Some(controller) = controller.as_ref() else {
                return;
            };
            match intent {
                ExamIntent::Select { question_id, value } => {
                    if let Err(err) = controller.change_answer(question_id, value) {
                        debug!(question = %question_id, error = %err, "selection ignored");
                    }
                }
                ExamIntent::Next => {
                    controller.next();
                }
                ExamIntent::Previous => {
                    controller.previous();
                }
                ExamIntent::Submit => {
                    controller.submit();
                }
            }
            snapshot.set(Some(controller.snapshot()));
        })
    };

    let on_key = use_callback(move |evt: KeyboardEvent| match evt.data.key() {
        Key::ArrowRight => {
            evt.prevent_default();
            dispatch.call(ExamIntent::Next);
        }
        Key::ArrowLeft => {
            evt.prevent_default();
            dispatch.call(ExamIntent::Previous);
        }
        _ => {}
    });

    if let Some(err) = config_error {
        return rsx! {
            div { class: "page exam-page",
                p { class: "notice notice--error", "{err.message()}" }
                Link { class: "btn btn-secondary", to: Route::Home {}, "Back to exams" }
            }
        };
    }

    let screen = snapshot
        .read()
        .as_ref()
        .map_or(ExamScreenVm::Loading, map_exam_screen);
    let countdown = map_countdown(remaining());
    let notice_line = notice
        .read()
        .as_ref()
        .map(|notice| (notice.message(), notice.is_error()));

    rsx! {
        div { class: "page exam-page", id: "exam-root", tabindex: "0", onkeydown: on_key,
            header { class: "view-header exam-header",
                h2 { class: "view-title", "Exam #{exam_id}" }
                if let Some(countdown) = countdown {
                    span {
                        class: if countdown.low { "exam-timer exam-timer--low" } else { "exam-timer" },
                        "Time left: {countdown.label}"
                    }
                }
            }
            if let Some((message, is_error)) = notice_line {
                p {
                    class: if is_error { "notice notice--error" } else { "notice" },
                    role: "status",
                    "{message}"
                }
            }
            match screen {
                ExamScreenVm::Loading => rsx! {
                    p { "Loading questions..." }
                },
                ExamScreenVm::Failed { message } => rsx! {
                    p { class: "notice notice--error", "{message}" }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| {
                            navigator.push(Route::Home {});
                        },
                        "Back to exams"
                    }
                },
                ExamScreenVm::Question(card) => rsx! {
                    QuestionCard { card, dispatch }
                },
                ExamScreenVm::Submitted { score_label } => rsx! {
                    p { "Exam submitted. {score_label}" }
                },
            }
        }
    }
}

#[component]
fn QuestionCard(card: QuestionCardVm, dispatch: Callback<ExamIntent>) -> Element {
    let question_id = card.question_id;
    let group = format!("question-{question_id}");
    let options = card.options.iter().map(|option| {
        let value = option.value.clone();
        rsx! {
            label { class: if option.selected { "exam-option exam-option--selected" } else { "exam-option" },
                input {
                    r#type: "radio",
                    name: "{group}",
                    value: "{option.value}",
                    checked: option.selected,
                    disabled: card.submitting,
                    onchange: move |_| {
                        dispatch.call(ExamIntent::Select {
                            question_id,
                            value: value.clone(),
                        });
                    },
                }
                span { "{option.value}" }
            }
        }
    });

    rsx! {
        section { class: "exam-card",
            div { class: "exam-progress",
                span { class: "exam-progress__label", "{card.progress_label}" }
                span { class: "exam-progress__answered", "{card.answered_label}" }
                div { class: "exam-progress__track",
                    div {
                        class: "exam-progress__fill",
                        style: "width: {card.progress_percent}%",
                    }
                }
            }
            p { class: "exam-question__position", "{card.position_label}" }
            h3 { class: "exam-question__text", "{card.text}" }
            fieldset { class: "exam-options", {options} }
            footer { class: "exam-actions",
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    disabled: !card.can_previous,
                    onclick: move |_| dispatch.call(ExamIntent::Previous),
                    "Previous"
                }
                if card.show_submit {
                    button {
                        class: "btn btn-primary",
                        r#type: "button",
                        disabled: card.submitting,
                        onclick: move |_| dispatch.call(ExamIntent::Submit),
                        "{card.submit_label}"
                    }
                } else {
                    button {
                        class: "btn btn-primary",
                        r#type: "button",
                        disabled: !card.can_next,
                        onclick: move |_| dispatch.call(ExamIntent::Next),
                        "Next"
                    }
                }
            }
        }
    }
}
