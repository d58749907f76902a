use chrono::{DateTime, Utc};

use crate::model::ids::{LessonId, ProgressId, UserId};

/// Completion status of one lesson for one identity.
///
/// The backend keeps at most one record per `(user_id, lesson_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    pub id: ProgressId,
    pub user_id: UserId,
    pub lesson_id: LessonId,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ProgressRecord {
    /// A fresh, not yet completed record.
    #[must_use]
    pub fn started(user_id: UserId, lesson_id: LessonId, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ProgressId::generate(),
            user_id,
            lesson_id,
            completed: false,
            completed_at: None,
            created_at,
        }
    }
}
