use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use quiz_core::model::{AttemptResult, ContentId};
use quiz_core::time::fixed_now;
use services::backend::{
    AttemptEnvelope, AttemptStatus, QuestionPayload, QuizBackend, QuizContent, SubmitRequest,
};
use services::{AppServices, BackendError, Clock};
use storage::repository::Storage;

use crate::context::{UiApp, build_app_context};
use crate::views::QuizView;

/// In-process backend with a fixed three-question quiz.
pub struct StubBackend {
    pub duration_secs: u64,
    pub fail_status: AtomicBool,
}

impl StubBackend {
    pub fn new(duration_secs: u64) -> Self {
        Self {
            duration_secs,
            fail_status: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl QuizBackend for StubBackend {
    async fn get_attempt_status(
        &self,
        _content_id: &ContentId,
    ) -> Result<AttemptStatus, BackendError> {
        if self.fail_status.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("offline".to_string()));
        }
        Ok(AttemptStatus {
            incomplete_attempt: false,
        })
    }

    async fn start_attempt(&self, _content_id: &ContentId) -> Result<AttemptEnvelope, BackendError> {
        Ok(AttemptEnvelope {
            attempt_id: "att-ui".to_string(),
            started_at: Some(fixed_now()),
            content: QuizContent {
                duration_seconds: self.duration_secs,
                questions: ["Capital of France?", "2 + 2?", "Largest planet?"]
                    .iter()
                    .map(|prompt| QuestionPayload {
                        prompt: (*prompt).to_string(),
                        options: vec!["Alpha".into(), "Beta".into(), "Gamma".into()],
                    })
                    .collect(),
            },
        })
    }

    async fn resume_attempt(
        &self,
        content_id: &ContentId,
    ) -> Result<AttemptEnvelope, BackendError> {
        self.start_attempt(content_id).await
    }

    async fn submit_attempt(&self, request: SubmitRequest) -> Result<AttemptResult, BackendError> {
        let total = u32::try_from(request.answers.len()).unwrap_or(u32::MAX);
        Ok(AttemptResult {
            score: 0.0,
            correct_answers: 0,
            total_questions: total,
            reveal_answers: false,
            result_id: "result-ui".to_string(),
        })
    }
}

#[derive(Clone)]
struct TestApp {
    services: AppServices,
}

impl UiApp for TestApp {
    fn content_id(&self) -> ContentId {
        ContentId::new("quiz-ui").unwrap()
    }

    fn services(&self) -> AppServices {
        self.services.clone()
    }
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
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
    rsx! { QuizView {} }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        for _ in 0..5 {
            let _ = tokio::time::timeout(
                std::time::Duration::from_millis(50),
                self.dom.wait_for_work(),
            )
            .await;
            self.dom.render_immediate(&mut NoOpMutations);
            self.dom.process_events();
        }
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

pub fn setup_view_harness(backend: StubBackend) -> ViewHarness {
    let services = AppServices::from_parts(
        Clock::fixed(fixed_now()),
        Arc::new(backend),
        Storage::in_memory(),
    );
    let app = Arc::new(TestApp { services });
    let dom = VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { app });
    ViewHarness { dom }
}
