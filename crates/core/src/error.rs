use thiserror::Error;

use crate::model::{LessonError, ModuleError, QuizError};
use crate::navigation::NavigationError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Module(#[from] ModuleError),
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
}
