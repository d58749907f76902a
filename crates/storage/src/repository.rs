use async_trait::async_trait;
use chrono::{DateTime, Utc};
use course_core::Clock;
use course_core::model::{
    Lesson, LessonId, Module, ModuleId, ProgressId, ProgressRecord, Quiz, UserId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("backend responded with {status}: {message}")]
    Http { status: u16, message: String },
}

/// Write shape for `user_progress`, keyed by `(user_id, lesson_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpsert {
    pub user_id: UserId,
    pub lesson_id: LessonId,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProgressUpsert {
    /// Marks a lesson as opened but not finished.
    #[must_use]
    pub fn started(user_id: UserId, lesson_id: LessonId) -> Self {
        Self {
            user_id,
            lesson_id,
            completed: false,
            completed_at: None,
        }
    }

    #[must_use]
    pub fn completed(user_id: UserId, lesson_id: LessonId, at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            lesson_id,
            completed: true,
            completed_at: Some(at),
        }
    }
}

/// Persisted shape of a local account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Read side of the course catalog, plus the writes used for seeding.
///
/// Every list is ordered by `order_index` ascending.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn list_modules(&self) -> Result<Vec<Module>, StorageError>;

    /// Every lesson of every module, used for course-wide progress.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn list_all_lessons(&self) -> Result<Vec<Lesson>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn list_lessons_for_module(&self, module_id: ModuleId)
    -> Result<Vec<Lesson>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn list_quizzes_for_lesson(&self, lesson_id: LessonId) -> Result<Vec<Quiz>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the module cannot be stored.
    async fn upsert_module(&self, module: &Module) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the lesson cannot be stored.
    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the quiz cannot be stored.
    async fn upsert_quiz(&self, quiz: &Quiz) -> Result<(), StorageError>;
}

#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// All progress records of one identity, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn list_progress_for_identity(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ProgressRecord>, StorageError>;

    /// Inserts or updates the single record for `(user_id, lesson_id)`.
    /// Applying the same upsert twice leaves the same stored record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn upsert_progress(&self, upsert: &ProgressUpsert) -> Result<(), StorageError>;
}

/// Small string key/value store that survives restarts (anonymous id,
/// persisted auth session).
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be removed.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the email is already registered.
    async fn insert_account(&self, account: &AccountRecord) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn find_account_by_email(&self, email: &str)
    -> Result<Option<AccountRecord>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_account(&self, id: UserId) -> Result<Option<AccountRecord>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    clock: Clock,
    modules: Arc<Mutex<HashMap<ModuleId, Module>>>,
    lessons: Arc<Mutex<HashMap<LessonId, Lesson>>>,
    quizzes: Arc<Mutex<Vec<Quiz>>>,
    progress: Arc<Mutex<HashMap<(UserId, LessonId), ProgressRecord>>>,
    local: Arc<Mutex<HashMap<String, String>>>,
    accounts: Arc<Mutex<HashMap<UserId, AccountRecord>>>,
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `clock` for the `created_at` of new progress records.
    #[must_use]
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            clock,
            ..Self::default()
        }
    }
}

fn sorted_lessons(mut lessons: Vec<Lesson>) -> Vec<Lesson> {
    lessons.sort_by_key(|l| (l.order_index(), l.created_at(), l.id()));
    lessons
}

#[async_trait]
impl CourseRepository for InMemoryRepository {
    async fn list_modules(&self) -> Result<Vec<Module>, StorageError> {
        let guard = self.modules.lock().map_err(poisoned)?;
        let mut modules: Vec<Module> = guard.values().cloned().collect();
        modules.sort_by_key(|m| (m.order_index(), m.created_at(), m.id()));
        Ok(modules)
    }

    async fn list_all_lessons(&self) -> Result<Vec<Lesson>, StorageError> {
        let guard = self.lessons.lock().map_err(poisoned)?;
        Ok(sorted_lessons(guard.values().cloned().collect()))
    }

    async fn list_lessons_for_module(
        &self,
        module_id: ModuleId,
    ) -> Result<Vec<Lesson>, StorageError> {
        let guard = self.lessons.lock().map_err(poisoned)?;
        Ok(sorted_lessons(
            guard
                .values()
                .filter(|l| l.module_id() == module_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_quizzes_for_lesson(&self, lesson_id: LessonId) -> Result<Vec<Quiz>, StorageError> {
        let guard = self.quizzes.lock().map_err(poisoned)?;
        let mut quizzes: Vec<Quiz> = guard
            .iter()
            .filter(|q| q.lesson_id() == lesson_id)
            .cloned()
            .collect();
        quizzes.sort_by_key(|q| (q.order_index(), q.created_at(), q.id()));
        Ok(quizzes)
    }

    async fn upsert_module(&self, module: &Module) -> Result<(), StorageError> {
        let mut guard = self.modules.lock().map_err(poisoned)?;
        guard.insert(module.id(), module.clone());
        Ok(())
    }

    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        let mut guard = self.lessons.lock().map_err(poisoned)?;
        guard.insert(lesson.id(), lesson.clone());
        Ok(())
    }

    async fn upsert_quiz(&self, quiz: &Quiz) -> Result<(), StorageError> {
        let mut guard = self.quizzes.lock().map_err(poisoned)?;
        match guard.iter_mut().find(|q| q.id() == quiz.id()) {
            Some(existing) => *existing = quiz.clone(),
            None => guard.push(quiz.clone()),
        }
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn list_progress_for_identity(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ProgressRecord>, StorageError> {
        let guard = self.progress.lock().map_err(poisoned)?;
        Ok(guard
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn upsert_progress(&self, upsert: &ProgressUpsert) -> Result<(), StorageError> {
        let mut guard = self.progress.lock().map_err(poisoned)?;
        let now = self.clock.now();
        let record = guard
            .entry((upsert.user_id, upsert.lesson_id))
            .or_insert_with(|| ProgressRecord {
                id: ProgressId::generate(),
                user_id: upsert.user_id,
                lesson_id: upsert.lesson_id,
                completed: false,
                completed_at: None,
                created_at: now,
            });
        record.completed = upsert.completed;
        if upsert.completed_at.is_some() {
            record.completed_at = upsert.completed_at;
        }
        Ok(())
    }
}

#[async_trait]
impl LocalStore for InMemoryRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self.local.lock().map_err(poisoned)?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self.local.lock().map_err(poisoned)?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self.local.lock().map_err(poisoned)?;
        guard.remove(key);
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for InMemoryRepository {
    async fn insert_account(&self, account: &AccountRecord) -> Result<(), StorageError> {
        let mut guard = self.accounts.lock().map_err(poisoned)?;
        if guard.values().any(|a| a.email == account.email) || guard.contains_key(&account.id) {
            return Err(StorageError::Conflict);
        }
        guard.insert(account.id, account.clone());
        Ok(())
    }

    async fn find_account_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AccountRecord>, StorageError> {
        let guard = self.accounts.lock().map_err(poisoned)?;
        Ok(guard.values().find(|a| a.email == email).cloned())
    }

    async fn get_account(&self, id: UserId) -> Result<Option<AccountRecord>, StorageError> {
        let guard = self.accounts.lock().map_err(poisoned)?;
        Ok(guard.get(&id).cloned())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub courses: Arc<dyn CourseRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub local: Arc<dyn LocalStore>,
    pub accounts: Arc<dyn AccountRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_in_memory(InMemoryRepository::new())
    }

    #[must_use]
    pub fn from_in_memory(repo: InMemoryRepository) -> Self {
        let courses: Arc<dyn CourseRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let local: Arc<dyn LocalStore> = Arc::new(repo.clone());
        let accounts: Arc<dyn AccountRepository> = Arc::new(repo);
        Self {
            courses,
            progress,
            local,
            accounts,
        }
    }

    /// Serves the catalog and progress from a remote backend while keeping
    /// local state (anonymous id, session, accounts) where it was.
    #[must_use]
    pub fn with_remote(mut self, remote: crate::rest::RestRepository) -> Self {
        let courses: Arc<dyn CourseRepository> = Arc::new(remote.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(remote);
        self.courses = courses;
        self.progress = progress;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::time::{fixed_clock, fixed_now};

    fn lesson(module_id: ModuleId, order: i32) -> Lesson {
        Lesson::new(
            LessonId::generate(),
            module_id,
            format!("Lesson {order}"),
            "text",
            order,
            fixed_now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn lists_lessons_by_sort_order() {
        let repo = InMemoryRepository::new();
        let module_id = ModuleId::generate();
        for order in [3, 1, 2] {
            repo.upsert_lesson(&lesson(module_id, order)).await.unwrap();
        }
        repo.upsert_lesson(&lesson(ModuleId::generate(), 0))
            .await
            .unwrap();

        let lessons = repo.list_lessons_for_module(module_id).await.unwrap();
        let orders: Vec<_> = lessons.iter().map(Lesson::order_index).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert_eq!(repo.list_all_lessons().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn upsert_progress_is_idempotent() {
        let repo = InMemoryRepository::with_clock(fixed_clock());
        let user = UserId::generate();
        let lesson_id = LessonId::generate();
        let upsert = ProgressUpsert::completed(user, lesson_id, fixed_now());

        repo.upsert_progress(&upsert).await.unwrap();
        let once = repo.list_progress_for_identity(user).await.unwrap();
        repo.upsert_progress(&upsert).await.unwrap();
        let twice = repo.list_progress_for_identity(user).await.unwrap();

        assert_eq!(once.len(), 1);
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn upsert_progress_updates_existing_pair() {
        let repo = InMemoryRepository::new();
        let user = UserId::generate();
        let lesson_id = LessonId::generate();

        repo.upsert_progress(&ProgressUpsert::started(user, lesson_id))
            .await
            .unwrap();
        let started = repo.list_progress_for_identity(user).await.unwrap();
        repo.upsert_progress(&ProgressUpsert::completed(user, lesson_id, fixed_now()))
            .await
            .unwrap();
        let done = repo.list_progress_for_identity(user).await.unwrap();

        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, started[0].id);
        assert!(done[0].completed);
        assert_eq!(done[0].completed_at, Some(fixed_now()));
    }

    #[tokio::test]
    async fn started_upsert_keeps_completion_time() {
        let repo = InMemoryRepository::with_clock(fixed_clock());
        let user = UserId::generate();
        let lesson_id = LessonId::generate();

        repo.upsert_progress(&ProgressUpsert::completed(user, lesson_id, fixed_now()))
            .await
            .unwrap();
        repo.upsert_progress(&ProgressUpsert::started(user, lesson_id))
            .await
            .unwrap();

        let records = repo.list_progress_for_identity(user).await.unwrap();
        assert!(!records[0].completed);
        assert_eq!(records[0].completed_at, Some(fixed_now()));
        assert_eq!(records[0].created_at, fixed_now());
    }

    #[tokio::test]
    async fn progress_is_scoped_to_identity() {
        let repo = InMemoryRepository::new();
        let lesson_id = LessonId::generate();
        let a = UserId::generate();
        let b = UserId::generate();
        repo.upsert_progress(&ProgressUpsert::completed(a, lesson_id, fixed_now()))
            .await
            .unwrap();

        assert_eq!(repo.list_progress_for_identity(a).await.unwrap().len(), 1);
        assert!(repo.list_progress_for_identity(b).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let repo = InMemoryRepository::new();
        let account = AccountRecord {
            id: UserId::generate(),
            email: "ana@example.com".into(),
            password_hash: "hash".into(),
            created_at: fixed_now(),
        };
        repo.insert_account(&account).await.unwrap();
        let again = AccountRecord {
            id: UserId::generate(),
            ..account.clone()
        };
        assert!(matches!(
            repo.insert_account(&again).await,
            Err(StorageError::Conflict)
        ));
        assert_eq!(
            repo.find_account_by_email("ana@example.com").await.unwrap(),
            Some(account)
        );
    }

    #[tokio::test]
    async fn local_store_round_trip() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.get("k").await.unwrap(), None);
        repo.set("k", "v").await.unwrap();
        assert_eq!(repo.get("k").await.unwrap().as_deref(), Some("v"));
        repo.remove("k").await.unwrap();
        assert_eq!(repo.get("k").await.unwrap(), None);
    }
}
