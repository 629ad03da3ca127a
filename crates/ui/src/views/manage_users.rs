use dioxus::prelude::*;
use exam_core::model::{Role, authorize};

use crate::context::AppContext;
use crate::views::AccessDenied;

#[component]
pub fn ManageUsersView() -> Element {
    let ctx = use_context::<AppContext>();
    if let Err(error) = authorize(ctx.identity(), Role::Admin) {
        return rsx! { AccessDenied { error } };
    }

    rsx! {
        div { class: "page",
            header { class: "view-header",
                h2 { class: "view-title", "Manage Users" }
            }
            div { class: "view-divider" }
            section { class: "dashboard-card",
                p { "User management tools will appear here." }
            }
        }
    }
}
