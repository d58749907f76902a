//! Wire shapes of the backend tables, and their conversion into domain types.

use chrono::{DateTime, Utc};
use course_core::model::{
    Lesson, LessonId, Module, ModuleId, ProgressId, ProgressRecord, Quiz, QuizId, UserId,
};
use serde::{Deserialize, Serialize};

use crate::repository::{ProgressUpsert, StorageError};

fn invalid<E: std::fmt::Display>(table: &'static str) -> impl Fn(E) -> StorageError {
    move |e| StorageError::Serialization(format!("{table}: {e}"))
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ModuleRow {
    pub id: ModuleId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

impl ModuleRow {
    pub(crate) fn from_module(module: &Module) -> Self {
        Self {
            id: module.id(),
            title: module.title().to_owned(),
            description: module.description().to_owned(),
            order_index: module.order_index(),
            created_at: module.created_at(),
        }
    }

    pub(crate) fn into_module(self) -> Result<Module, StorageError> {
        Module::new(
            self.id,
            self.title,
            self.description,
            self.order_index,
            self.created_at,
        )
        .map_err(invalid("modules"))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct LessonRow {
    pub id: LessonId,
    pub module_id: ModuleId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

impl LessonRow {
    pub(crate) fn from_lesson(lesson: &Lesson) -> Self {
        Self {
            id: lesson.id(),
            module_id: lesson.module_id(),
            title: lesson.title().to_owned(),
            content: lesson.content().to_owned(),
            order_index: lesson.order_index(),
            created_at: lesson.created_at(),
        }
    }

    pub(crate) fn into_lesson(self) -> Result<Lesson, StorageError> {
        Lesson::new(
            self.id,
            self.module_id,
            self.title,
            self.content,
            self.order_index,
            self.created_at,
        )
        .map_err(invalid("lessons"))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct QuizRow {
    pub id: QuizId,
    pub lesson_id: LessonId,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: i64,
    #[serde(default)]
    pub explanation: String,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

impl QuizRow {
    pub(crate) fn from_quiz(quiz: &Quiz) -> Result<Self, StorageError> {
        Ok(Self {
            id: quiz.id(),
            lesson_id: quiz.lesson_id(),
            question: quiz.question().to_owned(),
            options: quiz.options().to_vec(),
            correct_answer: i64::try_from(quiz.correct_answer())
                .map_err(invalid("quizzes"))?,
            explanation: quiz.explanation().to_owned(),
            order_index: quiz.order_index(),
            created_at: quiz.created_at(),
        })
    }

    pub(crate) fn into_quiz(self) -> Result<Quiz, StorageError> {
        let correct = usize::try_from(self.correct_answer).map_err(invalid("quizzes"))?;
        Quiz::new(
            self.id,
            self.lesson_id,
            self.question,
            self.options,
            correct,
            self.explanation,
            self.order_index,
            self.created_at,
        )
        .map_err(invalid("quizzes"))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProgressRow {
    pub id: ProgressId,
    pub user_id: UserId,
    pub lesson_id: LessonId,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<ProgressRow> for ProgressRecord {
    fn from(row: ProgressRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            lesson_id: row.lesson_id,
            completed: row.completed,
            completed_at: row.completed_at,
            created_at: row.created_at,
        }
    }
}

/// Body of a `user_progress` upsert. `completed_at` is left out when unset so
/// a merge does not touch the stored value.
#[derive(Debug, Serialize)]
pub(crate) struct ProgressUpsertBody {
    pub user_id: UserId,
    pub lesson_id: LessonId,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&ProgressUpsert> for ProgressUpsertBody {
    fn from(upsert: &ProgressUpsert) -> Self {
        Self {
            user_id: upsert.user_id,
            lesson_id: upsert.lesson_id,
            completed: upsert.completed,
            completed_at: upsert.completed_at,
        }
    }
}
