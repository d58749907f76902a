use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{LessonId, QuizId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz question cannot be empty")]
    EmptyQuestion,

    #[error("quiz must have at least one option")]
    NoOptions,

    #[error("correct answer index {index} is out of range for {options} options")]
    CorrectAnswerOutOfRange { index: usize, options: usize },
}

/// Multiple-choice question attached to a lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    id: QuizId,
    lesson_id: LessonId,
    question: String,
    options: Vec<String>,
    correct_answer: usize,
    explanation: String,
    order_index: i32,
    created_at: DateTime<Utc>,
}

impl Quiz {
    /// Creates a quiz question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if the question is blank, there are no options,
    /// or `correct_answer` does not index into `options`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: QuizId,
        lesson_id: LessonId,
        question: impl Into<String>,
        options: Vec<String>,
        correct_answer: usize,
        explanation: impl Into<String>,
        order_index: i32,
        created_at: DateTime<Utc>,
    ) -> Result<Self, QuizError> {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(QuizError::EmptyQuestion);
        }
        if options.is_empty() {
            return Err(QuizError::NoOptions);
        }
        if correct_answer >= options.len() {
            return Err(QuizError::CorrectAnswerOutOfRange {
                index: correct_answer,
                options: options.len(),
            });
        }

        Ok(Self {
            id,
            lesson_id,
            question,
            options,
            correct_answer,
            explanation: explanation.into(),
            order_index,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuizId {
        self.id
    }

    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.lesson_id
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> usize {
        self.correct_answer
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn order_index(&self) -> i32 {
        self.order_index
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn is_correct(&self, selected: usize) -> bool {
        selected == self.correct_answer
    }

    #[must_use]
    pub fn has_option(&self, index: usize) -> bool {
        index < self.options.len()
    }
}
