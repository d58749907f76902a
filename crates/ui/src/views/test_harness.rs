use std::sync::Arc;

use course_core::model::{Lesson, LessonId, Module, ModuleId, Quiz, QuizId};
use course_core::time::{fixed_clock, fixed_now};
use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use services::{ControllerConfig, CourseController, CourseServices};
use storage::repository::{CourseRepository, InMemoryRepository, Storage};
use tokio::runtime::Handle;

use crate::context::{UiApp, build_app_context};
use crate::views::{AuthModal, CourseView};

#[derive(Clone)]
struct TestApp {
    controller: CourseController,
}

impl UiApp for TestApp {
    fn course_title(&self) -> String {
        "Prompting from scratch".to_owned()
    }

    fn course_tagline(&self) -> String {
        "Learn by doing.".to_owned()
    }

    fn controller(&self) -> CourseController {
        self.controller.clone()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Course,
    AuthForm,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    screen: Screen,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewHarnessRoot(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    match props.screen {
        Screen::Course => rsx! { CourseView {} },
        Screen::AuthForm => rsx! { AuthModal { on_close: move |()| {} } },
    }
}

/// One module ("Prompting basics") with a plain lesson and a lesson
/// carrying one quiz.
pub struct SampleCourse {
    pub module: Module,
    pub plain: Lesson,
    pub quizzed: Lesson,
}

pub async fn seed_sample_course(repo: &InMemoryRepository) -> SampleCourse {
    let module = Module::new(
        ModuleId::generate(),
        "Prompting basics",
        "What a prompt is made of",
        1,
        fixed_now(),
    )
    .expect("module");
    let plain = Lesson::new(
        LessonId::generate(),
        module.id(),
        "Anatomy of a prompt",
        "Role\n\nTask and context",
        1,
        fixed_now(),
    )
    .expect("lesson");
    let quizzed = Lesson::new(
        LessonId::generate(),
        module.id(),
        "Giving context",
        "Say who the answer is for.",
        2,
        fixed_now(),
    )
    .expect("lesson");
    let quiz = Quiz::new(
        QuizId::generate(),
        quizzed.id(),
        "What makes a prompt better?",
        vec!["Being vague".into(), "Being specific".into()],
        1,
        "Specific prompts leave less to chance.",
        1,
        fixed_now(),
    )
    .expect("quiz");

    repo.upsert_module(&module).await.expect("module");
    repo.upsert_lesson(&plain).await.expect("lesson");
    repo.upsert_lesson(&quizzed).await.expect("lesson");
    repo.upsert_quiz(&quiz).await.expect("quiz");

    SampleCourse {
        module,
        plain,
        quizzed,
    }
}

pub async fn started_controller(storage: &Storage) -> CourseController {
    let controller = CourseController::new(
        CourseServices::local(fixed_clock(), storage),
        ControllerConfig::default(),
        Handle::current(),
    );
    controller.start().await;
    controller
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub controller: CourseController,
}

impl ViewHarness {
    pub fn new(controller: CourseController, screen: Screen) -> Self {
        let app = Arc::new(TestApp {
            controller: controller.clone(),
        });
        let dom = VirtualDom::new_with_props(ViewHarnessRoot, ViewHarnessProps { app, screen });
        Self { dom, controller }
    }

    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
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
