//! Drives the course viewer: navigation, the open lesson's quizzes, progress
//! writes and identity switches.
//!
//! Operations that touch the network schedule their work on the runtime and
//! hand back the `JoinHandle`, so callers (and tests) can await completion.
//! Every state change bumps a revision counter published on a `watch`
//! channel; the UI re-renders from [`CourseController::snapshot`] when it
//! moves.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use course_core::model::{Account, Lesson, LessonId, Module, ModuleId, UserId};
use course_core::navigation::{NavEffect, Navigation, ViewKind};
use course_core::progress::ProgressSummary;
use course_core::quiz::{CompletionPlan, QuizSequence};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::auth::Session;
use crate::course_services::CourseServices;
use crate::error::ControllerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Pause between revealing the last quiz answer and recording completion.
    pub completion_delay: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            completion_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleOverview {
    pub module: Module,
    pub progress: ProgressSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LessonEntry {
    pub lesson: Lesson,
    /// A progress record exists for the active identity.
    pub started: bool,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenLesson {
    pub lesson: Lesson,
    pub completed: bool,
    /// `None` until the lesson's quizzes have loaded.
    pub quizzes: Option<QuizSequence>,
}

/// Everything the presentation layer renders, copied out of the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerSnapshot {
    pub view: ViewKind,
    pub modules: Vec<ModuleOverview>,
    pub selected_module: Option<Module>,
    pub lessons: Vec<LessonEntry>,
    pub open_lesson: Option<OpenLesson>,
    pub overall: ProgressSummary,
    pub account: Option<Account>,
    pub revision: u64,
}

struct LessonQuizzes {
    lesson_id: LessonId,
    sequence: QuizSequence,
}

#[derive(Default)]
struct ViewerState {
    navigation: Navigation,
    modules: Vec<Module>,
    all_lessons: Vec<Lesson>,
    quizzes: Option<LessonQuizzes>,
    account: Option<Account>,
}

impl ViewerState {
    fn open_lesson_id(&self) -> Result<LessonId, ControllerError> {
        self.navigation
            .selected_lesson()
            .map(Lesson::id)
            .ok_or(ControllerError::NoLessonOpen)
    }

    fn open_quizzes(&mut self) -> Result<&mut LessonQuizzes, ControllerError> {
        let lesson_id = self.open_lesson_id()?;
        self.quizzes
            .as_mut()
            .filter(|quizzes| quizzes.lesson_id == lesson_id)
            .ok_or(ControllerError::QuizzesLoading)
    }
}

struct Inner {
    services: CourseServices,
    config: ControllerConfig,
    runtime: Handle,
    state: Mutex<ViewerState>,
    revision: watch::Sender<u64>,
}

#[derive(Clone)]
pub struct CourseController {
    inner: Arc<Inner>,
}

impl CourseController {
    #[must_use]
    pub fn new(services: CourseServices, config: ControllerConfig, runtime: Handle) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                services,
                config,
                runtime,
                state: Mutex::new(ViewerState::default()),
                revision,
            }),
        }
    }

    #[must_use]
    pub fn services(&self) -> &CourseServices {
        &self.inner.services
    }

    /// Revision counter, bumped on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Resolves the identity, loads the catalog and the identity's progress.
    /// Read failures leave the corresponding state empty.
    pub async fn start(&self) {
        let services = self.services();
        let identity = services.identity().startup().await;
        self.with_state(|state| state.account = identity.account().cloned());
        self.bump();

        match services.catalog().list_modules().await {
            Ok(modules) => self.with_state(|state| state.modules = modules),
            Err(err) => tracing::warn!(error = %err, "loading modules failed"),
        }
        match services.catalog().list_all_lessons().await {
            Ok(lessons) => self.with_state(|state| state.all_lessons = lessons),
            Err(err) => tracing::warn!(error = %err, "loading lessons failed"),
        }
        self.bump();

        services.progress().activate(identity.user_id());
        self.refresh_progress(identity.user_id()).await;
    }

    /// Follows the auth provider's session notifications for as long as the
    /// provider lives.
    #[must_use]
    pub fn watch_auth(&self) -> JoinHandle<()> {
        let mut sessions = self.services().identity().auth().subscribe();
        let this = self.clone();
        self.inner.runtime.spawn(async move {
            while sessions.changed().await.is_ok() {
                let session = sessions.borrow_and_update().clone();
                this.apply_session(session.as_ref()).await;
            }
        })
    }

    /// `Modules → Lessons`; the returned task fetches the module's lessons.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::UnknownModule` for a module not in the
    /// catalog and `ControllerError::Navigation` outside the module list.
    pub fn select_module(&self, module_id: ModuleId) -> Result<JoinHandle<()>, ControllerError> {
        let effect = self.with_state(|state| -> Result<NavEffect, ControllerError> {
            let module = state
                .modules
                .iter()
                .find(|module| module.id() == module_id)
                .cloned()
                .ok_or(ControllerError::UnknownModule)?;
            let effect = state.navigation.select_module(module)?;
            state.quizzes = None;
            Ok(effect)
        })?;
        self.bump();
        Ok(self.schedule(effect))
    }

    /// `Lessons → Lesson`; the returned task records the lesson as started
    /// (first visit only) and loads its quizzes.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::UnknownLesson` for a lesson not in the
    /// current list and `ControllerError::Navigation` outside the lesson list.
    pub fn select_lesson(&self, lesson_id: LessonId) -> Result<JoinHandle<()>, ControllerError> {
        let effect = self.with_state(|state| -> Result<NavEffect, ControllerError> {
            let lesson = state
                .navigation
                .lessons()
                .iter()
                .find(|lesson| lesson.id() == lesson_id)
                .cloned()
                .ok_or(ControllerError::UnknownLesson)?;
            let effect = state.navigation.select_lesson(lesson)?;
            state.quizzes = None;
            Ok(effect)
        })?;
        self.bump();
        Ok(self.schedule(effect))
    }

    /// # Errors
    ///
    /// Returns `ControllerError::Navigation` in the module list.
    pub fn back(&self) -> Result<ViewKind, ControllerError> {
        let view = self.with_state(|state| -> Result<ViewKind, ControllerError> {
            let view = state.navigation.back()?;
            state.quizzes = None;
            Ok(view)
        })?;
        self.bump();
        Ok(view)
    }

    /// Without quizzes the lesson is completed right away and the write task
    /// is returned. With quizzes they are revealed instead; completion then
    /// follows the last answer.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NoLessonOpen` outside the lesson view and
    /// `ControllerError::QuizzesLoading` before the quizzes are known.
    pub fn mark_complete(&self) -> Result<Option<JoinHandle<()>>, ControllerError> {
        let immediate = self.with_state(|state| -> Result<Option<LessonId>, ControllerError> {
            let lesson_id = state.open_lesson_id()?;
            let quizzes = state.open_quizzes()?;
            match quizzes.sequence.completion_plan() {
                CompletionPlan::MarkNow => Ok(Some(lesson_id)),
                CompletionPlan::RevealQuizzes => {
                    quizzes.sequence.reveal();
                    Ok(None)
                }
            }
        })?;
        self.bump();
        Ok(immediate.map(|lesson_id| self.schedule_completion(lesson_id, Duration::ZERO)))
    }

    /// Picks an option on the quiz card at `position`. Returns whether the
    /// card changed.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NoLessonOpen` or
    /// `ControllerError::QuizzesLoading`.
    pub fn select_answer(&self, position: usize, option: usize) -> Result<bool, ControllerError> {
        let changed = self.with_state(|state| -> Result<bool, ControllerError> {
            let quizzes = state.open_quizzes()?;
            Ok(quizzes.sequence.select(position, option))
        })?;
        if changed {
            self.bump();
        }
        Ok(changed)
    }

    /// Reveals the quiz card at `position`. Submitting the last card returns
    /// the task that records completion after the configured delay.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NoLessonOpen` or
    /// `ControllerError::QuizzesLoading`.
    pub fn submit_answer(&self, position: usize) -> Result<Option<JoinHandle<()>>, ControllerError> {
        let outcome = self.with_state(|state| -> Result<_, ControllerError> {
            let lesson_id = state.open_lesson_id()?;
            let quizzes = state.open_quizzes()?;
            Ok(quizzes
                .sequence
                .submit(position)
                .map(|outcome| (lesson_id, outcome)))
        })?;
        let Some((lesson_id, outcome)) = outcome else {
            return Ok(None);
        };
        tracing::debug!(%lesson_id, position, correct = outcome.correct, "quiz answered");
        self.bump();

        if !outcome.completes_lesson {
            return Ok(None);
        }
        let delay = self.inner.config.completion_delay;
        Ok(Some(self.schedule_completion(lesson_id, delay)))
    }

    /// # Errors
    ///
    /// Returns `ControllerError::Auth` with the provider's rejection.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), ControllerError> {
        let session = self
            .services()
            .identity()
            .auth()
            .sign_in(email, password)
            .await?;
        self.apply_session(Some(&session)).await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ControllerError::Auth` with the provider's rejection.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<(), ControllerError> {
        self.services()
            .identity()
            .auth()
            .sign_up(email, password)
            .await?;
        Ok(())
    }

    /// Signs out and falls back to the anonymous identity. Progress of the
    /// account is dropped from memory, not merged.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Auth` if the provider cannot sign out.
    pub async fn logout(&self) -> Result<(), ControllerError> {
        self.services().identity().auth().sign_out().await?;
        self.with_state(|state| state.account = None);
        self.apply_session(None).await;
        Ok(())
    }

    #[must_use]
    pub fn snapshot(&self) -> ViewerSnapshot {
        let progress = self.services().progress().snapshot();
        let revision = *self.inner.revision.borrow();
        self.with_state(|state| {
            let modules = state
                .modules
                .iter()
                .map(|module| ModuleOverview {
                    module: module.clone(),
                    progress: progress.for_module(module.id(), &state.all_lessons),
                })
                .collect();
            let lessons = state
                .navigation
                .lessons()
                .iter()
                .map(|lesson| LessonEntry {
                    lesson: lesson.clone(),
                    started: progress.contains(lesson.id()),
                    completed: progress.is_completed(lesson.id()),
                })
                .collect();
            let open_lesson = state.navigation.selected_lesson().map(|lesson| OpenLesson {
                lesson: lesson.clone(),
                completed: progress.is_completed(lesson.id()),
                quizzes: state
                    .quizzes
                    .as_ref()
                    .filter(|quizzes| quizzes.lesson_id == lesson.id())
                    .map(|quizzes| quizzes.sequence.clone()),
            });

            ViewerSnapshot {
                view: state.navigation.kind(),
                modules,
                selected_module: state.navigation.selected_module().cloned(),
                lessons,
                open_lesson,
                overall: progress.overall(&state.all_lessons),
                account: state.account.clone(),
                revision,
            }
        })
    }

    async fn apply_session(&self, session: Option<&Session>) {
        let identity_service = self.services().identity();
        let before = identity_service.current().map(|identity| identity.user_id());
        let identity = identity_service.resolve(session).await;
        self.with_state(|state| state.account = identity.account().cloned());

        if before == Some(identity.user_id()) {
            self.bump();
            return;
        }
        self.services().progress().activate(identity.user_id());
        self.bump();
        self.refresh_progress(identity.user_id()).await;
    }

    async fn refresh_progress(&self, user_id: UserId) {
        // Failures are logged by the store and leave the map as it was.
        let _ = self.services().progress().refresh(user_id).await;
        self.bump();
    }

    fn schedule(&self, effect: NavEffect) -> JoinHandle<()> {
        let this = self.clone();
        match effect {
            NavEffect::LoadLessons(module_id) => self
                .inner
                .runtime
                .spawn(async move { this.load_lessons(module_id).await }),
            NavEffect::OpenLesson(lesson_id) => self
                .inner
                .runtime
                .spawn(async move { this.open_lesson(lesson_id).await }),
        }
    }

    async fn load_lessons(&self, module_id: ModuleId) {
        let lessons = match self.services().catalog().list_lessons_for_module(module_id).await {
            Ok(lessons) => lessons,
            Err(err) => {
                tracing::warn!(%module_id, error = %err, "loading lessons failed");
                return;
            }
        };
        if self.with_state(|state| state.navigation.apply_lessons(module_id, lessons)) {
            self.bump();
        } else {
            tracing::debug!(%module_id, "discarded lessons of a module no longer selected");
        }
    }

    async fn open_lesson(&self, lesson_id: LessonId) {
        let services = self.services();
        // An unreadable quiz list counts as an empty one so the lesson can
        // still be marked complete.
        let quizzes = match services.catalog().list_quizzes_for_lesson(lesson_id).await {
            Ok(quizzes) => quizzes,
            Err(err) => {
                tracing::warn!(%lesson_id, error = %err, "loading quizzes failed");
                Vec::new()
            }
        };
        let applied = self.with_state(|state| {
            if state.navigation.selected_lesson().map(Lesson::id) != Some(lesson_id) {
                return false;
            }
            state.quizzes = Some(LessonQuizzes {
                lesson_id,
                sequence: QuizSequence::new(quizzes),
            });
            true
        });
        if applied {
            self.bump();
        } else {
            tracing::debug!(%lesson_id, "discarded quizzes of a lesson no longer open");
        }

        let Some(user_id) = self.current_user() else {
            return;
        };
        if services.progress().contains(lesson_id) {
            return;
        }
        if let Ok(true) = services.progress().ensure_started(lesson_id, user_id).await {
            self.bump();
        }
    }

    /// Records completion for the identity active now, after `delay`. Dropped
    /// if the identity changes before the write; a write still in flight
    /// during a switch lands for its own identity only.
    fn schedule_completion(&self, lesson_id: LessonId, delay: Duration) -> JoinHandle<()> {
        let this = self.clone();
        let user_id = self.current_user();
        self.inner.runtime.spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let Some(user_id) = user_id else {
                return;
            };
            if this.current_user() != Some(user_id) {
                tracing::info!(%lesson_id, "identity changed before completion, skipping");
                return;
            }
            let at = this.services().clock().now();
            // A failed write is logged by the store; progress stays as it was.
            // The store also drops the follow-up read if the identity moved on
            // while the write was in flight.
            let _ = this
                .services()
                .progress()
                .mark_completed(lesson_id, user_id, at)
                .await;
            if this.current_user() != Some(user_id) {
                tracing::info!(%lesson_id, "identity changed during completion write");
                return;
            }
            this.bump();
        })
    }

    fn current_user(&self) -> Option<UserId> {
        self.services()
            .identity()
            .current()
            .map(|identity| identity.user_id())
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut ViewerState) -> T) -> T {
        let mut guard = self.lock_state();
        f(&mut guard)
    }

    fn lock_state(&self) -> MutexGuard<'_, ViewerState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn bump(&self) {
        self.inner.revision.send_modify(|revision| *revision += 1);
    }
}
