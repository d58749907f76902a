use async_trait::async_trait;
use course_core::model::{Lesson, LessonId, Module, ModuleId, Quiz};

use super::SqliteRepository;
use super::mapping::{conn, map_lesson_row, map_module_row, map_quiz_row, options_to_json};
use crate::repository::{CourseRepository, StorageError};

const LESSON_COLUMNS: &str = "id, module_id, title, content, order_index, created_at";

#[async_trait]
impl CourseRepository for SqliteRepository {
    async fn list_modules(&self) -> Result<Vec<Module>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, title, description, order_index, created_at
            FROM modules
            ORDER BY order_index ASC, created_at ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_module_row).collect()
    }

    async fn list_all_lessons(&self) -> Result<Vec<Lesson>, StorageError> {
        let sql = format!(
            "SELECT {LESSON_COLUMNS} FROM lessons ORDER BY order_index ASC, created_at ASC, id ASC"
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter().map(map_lesson_row).collect()
    }

    async fn list_lessons_for_module(
        &self,
        module_id: ModuleId,
    ) -> Result<Vec<Lesson>, StorageError> {
        let sql = format!(
            "SELECT {LESSON_COLUMNS} FROM lessons WHERE module_id = ?1 \
             ORDER BY order_index ASC, created_at ASC, id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(module_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter().map(map_lesson_row).collect()
    }

    async fn list_quizzes_for_lesson(&self, lesson_id: LessonId) -> Result<Vec<Quiz>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, lesson_id, question, options, correct_answer, explanation, order_index, created_at
            FROM quizzes
            WHERE lesson_id = ?1
            ORDER BY order_index ASC, created_at ASC, id ASC
            ",
        )
        .bind(lesson_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_quiz_row).collect()
    }

    async fn upsert_module(&self, module: &Module) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO modules (id, title, description, order_index, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                order_index = excluded.order_index
            ",
        )
        .bind(module.id().to_string())
        .bind(module.title())
        .bind(module.description())
        .bind(i64::from(module.order_index()))
        .bind(module.created_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO lessons (id, module_id, title, content, order_index, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                module_id = excluded.module_id,
                title = excluded.title,
                content = excluded.content,
                order_index = excluded.order_index
            ",
        )
        .bind(lesson.id().to_string())
        .bind(lesson.module_id().to_string())
        .bind(lesson.title())
        .bind(lesson.content())
        .bind(i64::from(lesson.order_index()))
        .bind(lesson.created_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn upsert_quiz(&self, quiz: &Quiz) -> Result<(), StorageError> {
        let correct = i64::try_from(quiz.correct_answer())
            .map_err(|_| StorageError::Serialization("correct_answer overflow".into()))?;
        sqlx::query(
            r"
            INSERT INTO quizzes (id, lesson_id, question, options, correct_answer, explanation, order_index, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                lesson_id = excluded.lesson_id,
                question = excluded.question,
                options = excluded.options,
                correct_answer = excluded.correct_answer,
                explanation = excluded.explanation,
                order_index = excluded.order_index
            ",
        )
        .bind(quiz.id().to_string())
        .bind(quiz.lesson_id().to_string())
        .bind(quiz.question())
        .bind(options_to_json(quiz.options())?)
        .bind(correct)
        .bind(quiz.explanation())
        .bind(i64::from(quiz.order_index()))
        .bind(quiz.created_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }
}
