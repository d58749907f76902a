use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{LessonId, ModuleId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson title cannot be empty")]
    EmptyTitle,
}

/// A single lesson inside a module.
///
/// `order_index` is expected to be unique within the owning module; the
/// store does not enforce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    module_id: ModuleId,
    title: String,
    content: String,
    order_index: i32,
    created_at: DateTime<Utc>,
}

impl Lesson {
    /// Creates a lesson.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::EmptyTitle` if the title is blank.
    pub fn new(
        id: LessonId,
        module_id: ModuleId,
        title: impl Into<String>,
        content: impl Into<String>,
        order_index: i32,
        created_at: DateTime<Utc>,
    ) -> Result<Self, LessonError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(LessonError::EmptyTitle);
        }

        Ok(Self {
            id,
            module_id,
            title,
            content: content.into(),
            order_index,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> LessonId {
        self.id
    }

    #[must_use]
    pub fn module_id(&self) -> ModuleId {
        self.module_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Raw lesson text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Content split on line breaks, keeping blank lines so paragraphs survive.
    pub fn content_lines(&self) -> impl Iterator<Item = &str> {
        self.content.lines()
    }

    #[must_use]
    pub fn order_index(&self) -> i32 {
        self.order_index
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn rejects_blank_title() {
        let err = Lesson::new(
            LessonId::generate(),
            ModuleId::generate(),
            "",
            "body",
            0,
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, LessonError::EmptyTitle);
    }

    #[test]
    fn content_lines_preserve_blank_lines() {
        let lesson = Lesson::new(
            LessonId::generate(),
            ModuleId::generate(),
            "Intro",
            "first\n\nsecond\r\nthird",
            0,
            fixed_now(),
        )
        .unwrap();
        let lines: Vec<_> = lesson.content_lines().collect();
        assert_eq!(lines, vec!["first", "", "second", "third"]);
    }
}
