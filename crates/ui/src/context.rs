use std::sync::Arc;

use quiz_core::model::ContentId;
use services::{AppServices, QuizAttemptController};

pub trait UiApp: Send + Sync {
    fn content_id(&self) -> ContentId;
    fn services(&self) -> AppServices;
}

#[derive(Clone)]
pub struct AppContext {
    content_id: ContentId,
    services: AppServices,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            content_id: app.content_id(),
            services: app.services(),
        }
    }

    #[must_use]
    pub fn content_id(&self) -> ContentId {
        self.content_id.clone()
    }

    /// A new controller for one visit to the quiz page.
    #[must_use]
    pub fn new_controller(&self) -> QuizAttemptController {
        self.services.new_controller()
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
