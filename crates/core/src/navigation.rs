//! Which of the three course views is shown and what is selected in it.

use thiserror::Error;

use crate::model::{Lesson, LessonId, Module, ModuleId};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum NavigationError {
    #[error("cannot {action} from the {from} view")]
    InvalidTransition {
        from: ViewKind,
        action: &'static str,
    },

    #[error("lesson belongs to a different module")]
    ForeignLesson,
}

/// Tag of the current view, without the selection data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Modules,
    Lessons,
    Lesson,
}

impl std::fmt::Display for ViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ViewKind::Modules => "modules",
            ViewKind::Lessons => "lessons",
            ViewKind::Lesson => "lesson",
        };
        f.write_str(name)
    }
}

/// Side effect the caller has to schedule after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEffect {
    /// Fetch the lessons of the newly selected module.
    LoadLessons(ModuleId),
    /// The lesson was opened; record that it was started and load its quizzes.
    OpenLesson(LessonId),
}

/// Navigation state.
///
/// Selection data lives inside the variant, so a selected lesson without a
/// selected module cannot be represented. `lessons` is the fetched lesson
/// list of the selected module; it starts empty and is filled in by
/// `apply_lessons` once the fetch resolves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Navigation {
    #[default]
    Modules,
    Lessons {
        module: Module,
        lessons: Vec<Lesson>,
    },
    Lesson {
        module: Module,
        lessons: Vec<Lesson>,
        lesson: Lesson,
    },
}

impl Navigation {
    #[must_use]
    pub fn kind(&self) -> ViewKind {
        match self {
            Navigation::Modules => ViewKind::Modules,
            Navigation::Lessons { .. } => ViewKind::Lessons,
            Navigation::Lesson { .. } => ViewKind::Lesson,
        }
    }

    #[must_use]
    pub fn selected_module(&self) -> Option<&Module> {
        match self {
            Navigation::Modules => None,
            Navigation::Lessons { module, .. } | Navigation::Lesson { module, .. } => Some(module),
        }
    }

    #[must_use]
    pub fn selected_lesson(&self) -> Option<&Lesson> {
        match self {
            Navigation::Lesson { lesson, .. } => Some(lesson),
            _ => None,
        }
    }

    /// Lessons fetched for the selected module; empty in the module list.
    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        match self {
            Navigation::Modules => &[],
            Navigation::Lessons { lessons, .. } | Navigation::Lesson { lessons, .. } => lessons,
        }
    }

    /// `Modules → Lessons`. The transition does not wait for the lesson fetch.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::InvalidTransition` outside the module list.
    pub fn select_module(&mut self, module: Module) -> Result<NavEffect, NavigationError> {
        if !matches!(self, Navigation::Modules) {
            return Err(self.invalid("select a module"));
        }
        let effect = NavEffect::LoadLessons(module.id());
        *self = Navigation::Lessons {
            module,
            lessons: Vec::new(),
        };
        Ok(effect)
    }

    /// `Lessons → Lesson`.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::InvalidTransition` outside the lesson list and
    /// `NavigationError::ForeignLesson` if the lesson belongs to another module.
    pub fn select_lesson(&mut self, lesson: Lesson) -> Result<NavEffect, NavigationError> {
        let Navigation::Lessons { module, lessons } = self else {
            return Err(self.invalid("select a lesson"));
        };
        if lesson.module_id() != module.id() {
            return Err(NavigationError::ForeignLesson);
        }
        let effect = NavEffect::OpenLesson(lesson.id());
        let module = module.clone();
        let lessons = std::mem::take(lessons);
        *self = Navigation::Lesson {
            module,
            lessons,
            lesson,
        };
        Ok(effect)
    }

    /// `Lessons → Modules` drops the module and its lessons;
    /// `Lesson → Lessons` drops only the lesson.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::InvalidTransition` in the module list.
    pub fn back(&mut self) -> Result<ViewKind, NavigationError> {
        match std::mem::take(self) {
            Navigation::Modules => Err(self.invalid("go back")),
            Navigation::Lessons { .. } => Ok(ViewKind::Modules),
            Navigation::Lesson {
                module, lessons, ..
            } => {
                *self = Navigation::Lessons { module, lessons };
                Ok(ViewKind::Lessons)
            }
        }
    }

    /// Installs a fetched lesson list. Ignored unless `module_id` is still
    /// the selected module, so a slow fetch for a module the user already
    /// left cannot overwrite the current list. Returns whether it applied.
    pub fn apply_lessons(&mut self, module_id: ModuleId, fetched: Vec<Lesson>) -> bool {
        match self {
            Navigation::Lessons { module, lessons } | Navigation::Lesson { module, lessons, .. }
                if module.id() == module_id =>
            {
                *lessons = fetched;
                true
            }
            _ => false,
        }
    }

    fn invalid(&self, action: &'static str) -> NavigationError {
        NavigationError::InvalidTransition {
            from: self.kind(),
            action,
        }
    }
}
