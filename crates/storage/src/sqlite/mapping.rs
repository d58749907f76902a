use std::str::FromStr;

use chrono::{DateTime, Utc};
use course_core::model::{
    Lesson, LessonId, Module, ModuleId, ProgressId, ProgressRecord, Quiz, QuizId, UserId,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::{AccountRecord, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn parse_id<T>(row: &SqliteRow, column: &'static str) -> Result<T, StorageError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    let raw: String = row.try_get(column).map_err(ser)?;
    raw.parse::<T>()
        .map_err(|e| StorageError::Serialization(format!("{column}: {e}")))
}

fn i64_to_i32(field: &'static str, v: i64) -> Result<i32, StorageError> {
    i32::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn map_module_row(row: &SqliteRow) -> Result<Module, StorageError> {
    Module::new(
        parse_id::<ModuleId>(row, "id")?,
        row.try_get::<String, _>("title").map_err(ser)?,
        row.try_get::<String, _>("description").map_err(ser)?,
        i64_to_i32("order_index", row.try_get("order_index").map_err(ser)?)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_lesson_row(row: &SqliteRow) -> Result<Lesson, StorageError> {
    Lesson::new(
        parse_id::<LessonId>(row, "id")?,
        parse_id::<ModuleId>(row, "module_id")?,
        row.try_get::<String, _>("title").map_err(ser)?,
        row.try_get::<String, _>("content").map_err(ser)?,
        i64_to_i32("order_index", row.try_get("order_index").map_err(ser)?)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

/// Quiz options are stored as a JSON array of strings.
pub(crate) fn options_to_json(options: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(options).map_err(ser)
}

pub(crate) fn map_quiz_row(row: &SqliteRow) -> Result<Quiz, StorageError> {
    let options_json: String = row.try_get("options").map_err(ser)?;
    let options: Vec<String> = serde_json::from_str(&options_json).map_err(ser)?;
    let correct: i64 = row.try_get("correct_answer").map_err(ser)?;
    let correct = usize::try_from(correct)
        .map_err(|_| StorageError::Serialization(format!("invalid correct_answer: {correct}")))?;

    Quiz::new(
        parse_id::<QuizId>(row, "id")?,
        parse_id::<LessonId>(row, "lesson_id")?,
        row.try_get::<String, _>("question").map_err(ser)?,
        options,
        correct,
        row.try_get::<String, _>("explanation").map_err(ser)?,
        i64_to_i32("order_index", row.try_get("order_index").map_err(ser)?)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_progress_row(row: &SqliteRow) -> Result<ProgressRecord, StorageError> {
    let completed: i64 = row.try_get("completed").map_err(ser)?;
    Ok(ProgressRecord {
        id: parse_id::<ProgressId>(row, "id")?,
        user_id: parse_id::<UserId>(row, "user_id")?,
        lesson_id: parse_id::<LessonId>(row, "lesson_id")?,
        completed: completed != 0,
        completed_at: row
            .try_get::<Option<DateTime<Utc>>, _>("completed_at")
            .map_err(ser)?,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}

pub(crate) fn map_account_row(row: &SqliteRow) -> Result<AccountRecord, StorageError> {
    Ok(AccountRecord {
        id: parse_id::<UserId>(row, "id")?,
        email: row.try_get("email").map_err(ser)?,
        password_hash: row.try_get("password_hash").map_err(ser)?,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}
