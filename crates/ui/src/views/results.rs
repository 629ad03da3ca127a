use dioxus::prelude::*;
use dioxus_router::Link;

use crate::context::AppContext;
use crate::routes::Route;
use crate::vm::{ResultCardVm, map_result_cards};

#[component]
pub fn ResultsView() -> Element {
    let ctx = use_context::<AppContext>();
    let cards = map_result_cards(&ctx.results().list());

    rsx! {
        div { class: "page",
            header { class: "view-header",
                h2 { class: "view-title", "Exam Results" }
            }
            div { class: "view-divider" }
            if cards.is_empty() {
                p { "No results yet. Finished exams will show up here." }
                Link { class: "btn btn-secondary", to: Route::Home {}, "Browse exams" }
            } else {
                ul { class: "result-list",
                    for card in cards {
                        ResultCard { card }
                    }
                }
            }
        }
    }
}

#[component]
fn ResultCard(card: ResultCardVm) -> Element {
    let badge = if card.passed { "result-badge result-badge--pass" } else { "result-badge" };
    rsx! {
        li { class: "result-card",
            div { class: "result-card__head",
                span { class: "result-card__exam", "{card.exam_label}" }
                span { class: "{badge}", "{card.percent_label}" }
            }
            p { class: "result-card__score", "Score: {card.score_label}" }
            p { class: "result-card__date", "{card.submitted_at_str}" }
        }
    }
}
