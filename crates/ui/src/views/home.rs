use dioxus::prelude::*;
use dioxus_router::Link;

use crate::context::AppContext;
use crate::vm::{ExamListingVm, map_exam_listings};

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let listings = map_exam_listings(ctx.exams());
    let greeting = ctx
        .identity()
        .map(|who| format!("Signed in as {}", who.email()));

    rsx! {
        div { class: "page",
            header { class: "view-header",
                h2 { class: "view-title", "Available Exams" }
                if let Some(greeting) = greeting {
                    p { class: "view-subtitle", "{greeting}" }
                }
            }
            div { class: "view-divider" }
            if listings.is_empty() {
                p { "No exams are available right now." }
            } else {
                ul { class: "exam-list",
                    for listing in listings {
                        ExamListingCard { listing }
                    }
                }
            }
        }
    }
}

#[component]
fn ExamListingCard(listing: ExamListingVm) -> Element {
    rsx! {
        li { class: "exam-card",
            div { class: "exam-card__text",
                h4 { class: "exam-card__title", "{listing.title}" }
                span { class: "exam-card__limit", "{listing.time_limit_label}" }
            }
            Link { class: "btn btn-primary", to: listing.route.clone(), "Start Exam" }
        }
    }
}
