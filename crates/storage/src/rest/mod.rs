//! Adapter for a hosted Postgres backend exposed through a PostgREST-style
//! HTTP API (`/rest/v1/<table>`), authenticated with an anon key and, once
//! signed in, the user's access token.

use std::env;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use course_core::model::{Lesson, LessonId, Module, ModuleId, ProgressRecord, Quiz, UserId};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::repository::{CourseRepository, ProgressRepository, ProgressUpsert, StorageError};

mod rows;

use rows::{LessonRow, ModuleRow, ProgressRow, ProgressUpsertBody, QuizRow};

#[derive(Clone, Debug)]
pub struct RestConfig {
    pub base_url: String,
    pub anon_key: String,
}

impl RestConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            anon_key: anon_key.into(),
        }
    }

    /// Reads `COURSE_BACKEND_URL` and `COURSE_BACKEND_KEY`. Returns `None`
    /// unless both are set and non-empty.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("COURSE_BACKEND_URL").ok()?;
        let anon_key = env::var("COURSE_BACKEND_KEY").ok()?;
        if base_url.trim().is_empty() || anon_key.trim().is_empty() {
            return None;
        }
        Some(Self::new(base_url, anon_key))
    }

    /// Absolute URL for a path under the backend root.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Access token of the signed-in user, shared between the auth provider
/// (writer) and the data adapter (reader).
#[derive(Clone, Default)]
pub struct AccessToken(Arc<RwLock<Option<String>>>);

impl AccessToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, token: Option<String>) {
        if let Ok(mut guard) = self.0.write() {
            *guard = token;
        }
    }

    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.0.read().ok().and_then(|guard| guard.clone())
    }
}

/// Sends a request and turns non-2xx responses into `StorageError::Http`.
///
/// # Errors
///
/// Returns `StorageError::Connection` if the request cannot be sent and
/// `StorageError::Http` for error statuses.
pub async fn send_checked(request: RequestBuilder) -> Result<Response, StorageError> {
    let response = request
        .send()
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(StorageError::Http {
        status: status.as_u16(),
        message,
    })
}

#[derive(Clone)]
pub struct RestRepository {
    client: Client,
    config: RestConfig,
    token: AccessToken,
}

impl RestRepository {
    #[must_use]
    pub fn new(config: RestConfig, token: AccessToken) -> Self {
        Self {
            client: Client::new(),
            config,
            token,
        }
    }

    #[must_use]
    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    /// Bearer credential: the user's token when signed in, else the anon key.
    fn bearer(&self) -> String {
        self.token
            .get()
            .unwrap_or_else(|| self.config.anon_key.clone())
    }

    fn table(&self, method: reqwest::Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, self.config.endpoint(&format!("rest/v1/{table}")))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(self.bearer())
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
        ordered: bool,
    ) -> Result<Vec<T>, StorageError> {
        let mut query: Vec<(&str, String)> = vec![("select", "*".to_owned())];
        query.extend(filters.iter().cloned());
        if ordered {
            query.push(("order", "order_index.asc".to_owned()));
        }

        tracing::debug!(table, "fetching rows");
        let response = send_checked(self.table(reqwest::Method::GET, table).query(&query)).await?;
        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    async fn upsert<B: Serialize + ?Sized>(
        &self,
        table: &str,
        on_conflict: &str,
        body: &B,
    ) -> Result<(), StorageError> {
        let request = self
            .table(reqwest::Method::POST, table)
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(body);
        send_checked(request).await?;
        Ok(())
    }
}

fn eq(id: impl std::fmt::Display) -> String {
    format!("eq.{id}")
}

#[async_trait]
impl CourseRepository for RestRepository {
    async fn list_modules(&self) -> Result<Vec<Module>, StorageError> {
        self.select::<ModuleRow>("modules", &[], true)
            .await?
            .into_iter()
            .map(ModuleRow::into_module)
            .collect()
    }

    async fn list_all_lessons(&self) -> Result<Vec<Lesson>, StorageError> {
        self.select::<LessonRow>("lessons", &[], true)
            .await?
            .into_iter()
            .map(LessonRow::into_lesson)
            .collect()
    }

    async fn list_lessons_for_module(
        &self,
        module_id: ModuleId,
    ) -> Result<Vec<Lesson>, StorageError> {
        self.select::<LessonRow>("lessons", &[("module_id", eq(module_id))], true)
            .await?
            .into_iter()
            .map(LessonRow::into_lesson)
            .collect()
    }

    async fn list_quizzes_for_lesson(&self, lesson_id: LessonId) -> Result<Vec<Quiz>, StorageError> {
        self.select::<QuizRow>("quizzes", &[("lesson_id", eq(lesson_id))], true)
            .await?
            .into_iter()
            .map(QuizRow::into_quiz)
            .collect()
    }

    async fn upsert_module(&self, module: &Module) -> Result<(), StorageError> {
        self.upsert("modules", "id", &[ModuleRow::from_module(module)])
            .await
    }

    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        self.upsert("lessons", "id", &[LessonRow::from_lesson(lesson)])
            .await
    }

    async fn upsert_quiz(&self, quiz: &Quiz) -> Result<(), StorageError> {
        self.upsert("quizzes", "id", &[QuizRow::from_quiz(quiz)?])
            .await
    }
}

#[async_trait]
impl ProgressRepository for RestRepository {
    async fn list_progress_for_identity(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ProgressRecord>, StorageError> {
        let rows = self
            .select::<ProgressRow>("user_progress", &[("user_id", eq(user_id))], false)
            .await?;
        Ok(rows.into_iter().map(ProgressRecord::from).collect())
    }

    async fn upsert_progress(&self, upsert: &ProgressUpsert) -> Result<(), StorageError> {
        self.upsert(
            "user_progress",
            "user_id,lesson_id",
            &ProgressUpsertBody::from(upsert),
        )
        .await
    }
}
