use dioxus::prelude::*;
use dioxus_router::Link;
use exam_core::model::AccessError;

use crate::routes::Route;

fn denial_message(error: &AccessError) -> String {
    match error {
        AccessError::SignedOut => "Sign in to view this page.".to_string(),
        AccessError::Forbidden { required, .. } => {
            format!("This page is only available to the {required} role.")
        }
        _ => "You do not have access to this page.".to_string(),
    }
}

#[component]
pub fn AccessDenied(error: AccessError) -> Element {
    let message = denial_message(&error);
    rsx! {
        div { class: "page access-denied",
            h2 { "Access denied" }
            p { "{message}" }
            Link { class: "btn btn-secondary", to: Route::Home {}, "Back to exams" }
        }
    }
}
