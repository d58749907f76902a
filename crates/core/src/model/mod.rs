mod identity;
mod ids;
mod lesson;
mod module;
mod progress;
mod quiz;

pub use identity::{Account, Identity};
pub use ids::{LessonId, ModuleId, ParseIdError, ProgressId, QuizId, UserId};
pub use lesson::{Lesson, LessonError};
pub use module::{Module, ModuleError};
pub use progress::ProgressRecord;
pub use quiz::{Quiz, QuizError};
