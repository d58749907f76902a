use async_trait::async_trait;
use course_core::model::{ProgressId, ProgressRecord, UserId};

use super::SqliteRepository;
use super::mapping::{conn, map_progress_row};
use crate::repository::{ProgressRepository, ProgressUpsert, StorageError};

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn list_progress_for_identity(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ProgressRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, lesson_id, completed, completed_at, created_at
            FROM user_progress
            WHERE user_id = ?1
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_progress_row).collect()
    }

    async fn upsert_progress(&self, upsert: &ProgressUpsert) -> Result<(), StorageError> {
        // id and created_at are only written on first insert; a missing
        // completed_at keeps the stored one.
        sqlx::query(
            r"
            INSERT INTO user_progress (id, user_id, lesson_id, completed, completed_at, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(user_id, lesson_id) DO UPDATE SET
                completed = excluded.completed,
                completed_at = COALESCE(excluded.completed_at, user_progress.completed_at)
            ",
        )
        .bind(ProgressId::generate().to_string())
        .bind(upsert.user_id.to_string())
        .bind(upsert.lesson_id.to_string())
        .bind(i64::from(upsert.completed))
        .bind(upsert.completed_at)
        .bind(self.clock.now())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        tracing::debug!(
            user_id = %upsert.user_id,
            lesson_id = %upsert.lesson_id,
            completed = upsert.completed,
            "upserted progress"
        );
        Ok(())
    }
}
