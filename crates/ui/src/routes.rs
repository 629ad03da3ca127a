use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};
use exam_core::model::TimeLimit;

use crate::context::AppContext;
use crate::views::{ExamView, HomeView, ManageUsersView, ModeratorDashboardView, ResultsView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/exam/:exam_id?:time_limit", ExamView)] Exam { exam_id: String, time_limit: String },
        #[route("/results", ResultsView)] Results {},
        #[route("/moderator", ModeratorDashboardView)] ModeratorDashboard {},
        #[route("/admin/users", ManageUsersView)] ManageUsers {},
}

impl Route {
    /// Exam route with the time limit, in minutes, as query parameter.
    #[must_use]
    pub fn exam(exam_id: impl ToString, time_limit: TimeLimit) -> Self {
        Self::Exam {
            exam_id: exam_id.to_string(),
            time_limit: time_limit.minutes().to_string(),
        }
    }
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Sidebar() -> Element {
    let ctx = use_context::<AppContext>();
    let identity_label = ctx.identity().map_or_else(
        || "Signed out".to_string(),
        |who| format!("{} ({})", who.email(), who.role()),
    );

    rsx! {
        nav { class: "sidebar",
            h1 { "Exams" }
            ul {
                li { Link { to: Route::Home {}, "Available Exams" } }
                li { Link { to: Route::Results {}, "Results" } }
                li { Link { to: Route::ModeratorDashboard {}, "Moderator" } }
                li { Link { to: Route::ManageUsers {}, "Manage Users" } }
            }
            p { class: "sidebar-identity", "{identity_label}" }
        }
    }
}
