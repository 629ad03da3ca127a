use dioxus::prelude::*;
use dioxus_router::Router;
use tracing::error;

use crate::routes::Route;

const STYLESHEET: Asset = asset!("/assets/style.css");

#[component]
pub fn App() -> Element {
    rsx! {
        document::Stylesheet { href: STYLESHEET }
        document::Title { "Online Exam" }

        div { class: "app-root",
            ErrorBoundary {
                handle_error: |errors: ErrorContext| {
                    error!(?errors, "unhandled render error");
                    rsx! {
                        section { class: "page fatal",
                            h1 { "The exam client stopped unexpectedly" }
                            p { class: "notice notice--error",
                                "Restart the client to continue."
                            }
                            pre { "{errors:?}" }
                        }
                    }
                },
                Router::<Route> {}
            }
        }
    }
}
