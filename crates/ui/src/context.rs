use std::sync::Arc;

use services::CourseController;

pub trait UiApp: Send + Sync {
    fn course_title(&self) -> String;
    fn course_tagline(&self) -> String;

    fn controller(&self) -> CourseController;
}

#[derive(Clone)]
pub struct AppContext {
    course_title: String,
    course_tagline: String,
    controller: CourseController,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            course_title: app.course_title(),
            course_tagline: app.course_tagline(),
            controller: app.controller(),
        }
    }

    #[must_use]
    pub fn course_title(&self) -> &str {
        &self.course_title
    }

    #[must_use]
    pub fn course_tagline(&self) -> &str {
        &self.course_tagline
    }

    /// Handle to the controller; clones share the same state.
    #[must_use]
    pub fn controller(&self) -> CourseController {
        self.controller.clone()
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
