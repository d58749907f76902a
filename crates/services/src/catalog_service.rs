use std::sync::Arc;

use course_core::model::{Lesson, LessonId, Module, ModuleId, Quiz};
use storage::repository::CourseRepository;

use crate::error::CatalogError;

/// Read access to modules, lessons and quizzes.
#[derive(Clone)]
pub struct CatalogService {
    courses: Arc<dyn CourseRepository>,
}

impl CatalogService {
    #[must_use]
    pub fn new(courses: Arc<dyn CourseRepository>) -> Self {
        Self { courses }
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if the repository read fails.
    pub async fn list_modules(&self) -> Result<Vec<Module>, CatalogError> {
        let modules = self.courses.list_modules().await?;
        tracing::debug!(count = modules.len(), "loaded modules");
        Ok(modules)
    }

    /// Every lesson of every module, for the overall progress counters.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if the repository read fails.
    pub async fn list_all_lessons(&self) -> Result<Vec<Lesson>, CatalogError> {
        let lessons = self.courses.list_all_lessons().await?;
        tracing::debug!(count = lessons.len(), "loaded all lessons");
        Ok(lessons)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if the repository read fails.
    pub async fn list_lessons_for_module(
        &self,
        module_id: ModuleId,
    ) -> Result<Vec<Lesson>, CatalogError> {
        let lessons = self.courses.list_lessons_for_module(module_id).await?;
        tracing::debug!(%module_id, count = lessons.len(), "loaded module lessons");
        Ok(lessons)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if the repository read fails.
    pub async fn list_quizzes_for_lesson(
        &self,
        lesson_id: LessonId,
    ) -> Result<Vec<Quiz>, CatalogError> {
        let quizzes = self.courses.list_quizzes_for_lesson(lesson_id).await?;
        tracing::debug!(%lesson_id, count = quizzes.len(), "loaded quizzes");
        Ok(quizzes)
    }
}
