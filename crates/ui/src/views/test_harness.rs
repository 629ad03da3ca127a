use std::sync::Arc;
use std::time::Duration;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use exam_core::model::{ExamId, SessionContext, TimeLimit};
use exam_core::time::fixed_now;
use services::{AppServices, Clock, ExamListing, InMemoryExamApi};

use crate::context::{UiApp, build_app_context};
use crate::views::{ExamView, HomeView, ManageUsersView, ModeratorDashboardView, ResultsView};

#[derive(Clone)]
struct TestApp {
    services: AppServices,
    identity: Option<SessionContext>,
}

impl UiApp for TestApp {
    fn services(&self) -> AppServices {
        self.services.clone()
    }

    fn identity(&self) -> Option<SessionContext> {
        self.identity.clone()
    }

    fn exams(&self) -> Vec<ExamListing> {
        vec![ExamListing::new(
            ExamId::new(1),
            "General Knowledge",
            TimeLimit::from_minutes(15).expect("valid limit"),
        )]
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Exam { exam_id: String, time_limit: String },
    /// Exam view whose `exam_id` prop changes from `from` to `to` after mount.
    ExamSwitch { from: String, to: String, time_limit: String },
    Results,
    Moderator,
    ManageUsers,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ViewHarnessProps {}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view.clone());
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Home => rsx! { HomeView {} },
        ViewKind::Exam { exam_id, time_limit } => rsx! { ExamView { exam_id, time_limit } },
        ViewKind::ExamSwitch { from, to, time_limit } => rsx! { ExamSwitch { from, to, time_limit } },
        ViewKind::Results => rsx! { ResultsView {} },
        ViewKind::Moderator => rsx! { ModeratorDashboardView {} },
        ViewKind::ManageUsers => rsx! { ManageUsersView {} },
    }
}

#[component]
fn ExamSwitch(from: String, to: String, time_limit: String) -> Element {
    let mut exam_id = use_signal(|| from.clone());
    use_future(move || {
        let to = to.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            exam_id.set(to);
        }
    });
    rsx! { ExamView { exam_id: exam_id(), time_limit: time_limit.clone() } }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub api: Arc<InMemoryExamApi>,
    pub services: AppServices,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(Duration::from_millis(50), self.dom.wait_for_work()).await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Drive until `needle` shows up in the rendered HTML or attempts run out.
    pub async fn drive_until(&mut self, needle: &str) -> String {
        for _ in 0..20 {
            let html = self.render();
            if html.contains(needle) {
                return html;
            }
            self.drive_async().await;
        }
        self.render()
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn setup_view_harness(view: ViewKind, identity: Option<SessionContext>) -> ViewHarness {
    setup_view_harness_with_api(view, identity, Arc::new(InMemoryExamApi::sample()))
}

pub fn setup_view_harness_with_api(
    view: ViewKind,
    identity: Option<SessionContext>,
    api: Arc<InMemoryExamApi>,
) -> ViewHarness {
    let services = AppServices::in_memory(Arc::clone(&api), Clock::fixed(fixed_now()));
    let app = Arc::new(TestApp {
        services: services.clone(),
        identity,
    });
    let dom = VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { app, view });

    ViewHarness { dom, api, services }
}
