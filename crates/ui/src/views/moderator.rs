use dioxus::prelude::*;
use exam_core::model::{Role, authorize};

use crate::context::AppContext;
use crate::views::AccessDenied;

#[component]
pub fn ModeratorDashboardView() -> Element {
    let ctx = use_context::<AppContext>();
    let moderator = match authorize(ctx.identity(), Role::Moderator) {
        Ok(moderator) => moderator.clone(),
        Err(error) => return rsx! { AccessDenied { error } },
    };

    rsx! {
        div { class: "page",
            header { class: "view-header",
                h2 { class: "view-title", "Moderator Dashboard" }
                p { class: "view-subtitle", "Welcome, {moderator.email()}" }
            }
            div { class: "view-divider" }
            section { class: "dashboard-card",
                h3 { "Reported Issues" }
                p { "No reported issues at the moment." }
            }
        }
    }
}
