//! In-memory projection of the active identity's progress records.
//!
//! The map is only ever replaced wholesale from a fresh repository read;
//! nothing patches it in place. A failed read leaves the previous map
//! untouched and a failed write skips the refresh, so the projection always
//! reflects the last successful round trip.
//!
//! The store belongs to one identity at a time. Reads that finish after
//! [`ProgressStore::activate`] moved it to another identity are dropped.

use std::sync::{Arc, RwLock, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use course_core::model::{Lesson, LessonId, ModuleId, UserId};
use course_core::progress::{ProgressMap, ProgressSummary};
use storage::repository::{ProgressRepository, ProgressUpsert};

use crate::error::ProgressError;

#[derive(Default)]
struct Projection {
    owner: Option<UserId>,
    map: ProgressMap,
}

pub struct ProgressStore {
    progress: Arc<dyn ProgressRepository>,
    projection: RwLock<Projection>,
}

impl ProgressStore {
    #[must_use]
    pub fn new(progress: Arc<dyn ProgressRepository>) -> Self {
        Self {
            progress,
            projection: RwLock::new(Projection::default()),
        }
    }

    /// Replaces the map with the identity's records. The first refresh binds
    /// an unowned store to `user_id`; records read for any other identity
    /// than the owner are discarded.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the read fails; the map is kept.
    pub async fn refresh(&self, user_id: UserId) -> Result<(), ProgressError> {
        let records = match self.progress.list_progress_for_identity(user_id).await {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(%user_id, error = %err, "progress refresh failed");
                return Err(err.into());
            }
        };
        let map = ProgressMap::from_records(records);
        let mut guard = self.lock_projection();
        match guard.owner {
            Some(owner) if owner != user_id => {
                tracing::debug!(%user_id, %owner, "discarded progress of an inactive identity");
            }
            _ => {
                tracing::debug!(%user_id, records = map.len(), "progress refreshed");
                guard.owner = Some(user_id);
                guard.map = map;
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn is_completed(&self, lesson_id: LessonId) -> bool {
        self.read(|map| map.is_completed(lesson_id))
    }

    /// Whether any record, complete or not, exists for the lesson.
    #[must_use]
    pub fn contains(&self, lesson_id: LessonId) -> bool {
        self.read(|map| map.contains(lesson_id))
    }

    /// Writes an incomplete record if the lesson has none yet, then
    /// refreshes. Returns whether a write happened.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the write or the refresh fails.
    pub async fn ensure_started(
        &self,
        lesson_id: LessonId,
        user_id: UserId,
    ) -> Result<bool, ProgressError> {
        if self.contains(lesson_id) {
            return Ok(false);
        }
        self.write(&ProgressUpsert::started(user_id, lesson_id))
            .await?;
        self.refresh(user_id).await?;
        Ok(true)
    }

    /// Upserts a completed record, then refreshes.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the write or the refresh fails.
    pub async fn mark_completed(
        &self,
        lesson_id: LessonId,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> Result<(), ProgressError> {
        self.write(&ProgressUpsert::completed(user_id, lesson_id, at))
            .await?;
        tracing::info!(%user_id, %lesson_id, "lesson completed");
        self.refresh(user_id).await
    }

    /// Hands the store to `user_id` and drops every record of the previous
    /// identity. Used when the identity changes.
    pub fn activate(&self, user_id: UserId) {
        let mut guard = self.lock_projection();
        guard.owner = Some(user_id);
        guard.map = ProgressMap::empty();
    }

    /// The identity whose records the map holds, once bound.
    #[must_use]
    pub fn owner(&self) -> Option<UserId> {
        self.read_projection(|projection| projection.owner)
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressMap {
        self.read(ProgressMap::clone)
    }

    #[must_use]
    pub fn summary_for(&self, lessons: &[Lesson]) -> ProgressSummary {
        self.read(|map| map.overall(lessons))
    }

    #[must_use]
    pub fn module_summary(&self, module_id: ModuleId, lessons: &[Lesson]) -> ProgressSummary {
        self.read(|map| map.for_module(module_id, lessons))
    }

    async fn write(&self, upsert: &ProgressUpsert) -> Result<(), ProgressError> {
        if let Err(err) = self.progress.upsert_progress(upsert).await {
            tracing::warn!(
                user_id = %upsert.user_id,
                lesson_id = %upsert.lesson_id,
                error = %err,
                "progress write dropped"
            );
            return Err(err.into());
        }
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&ProgressMap) -> T) -> T {
        self.read_projection(|projection| f(&projection.map))
    }

    fn read_projection<T>(&self, f: impl FnOnce(&Projection) -> T) -> T {
        match self.projection.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    fn lock_projection(&self) -> RwLockWriteGuard<'_, Projection> {
        self.projection
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use course_core::model::ProgressRecord;
    use course_core::time::fixed_now;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use storage::repository::{InMemoryRepository, StorageError};

    fn lesson(module_id: ModuleId, title: &str) -> Lesson {
        Lesson::new(LessonId::generate(), module_id, title, "", 0, fixed_now()).unwrap()
    }

    #[tokio::test]
    async fn mark_completed_is_visible_after_refresh() {
        let store = ProgressStore::new(Arc::new(InMemoryRepository::new()));
        let user = UserId::generate();
        let lesson_id = LessonId::generate();

        assert!(!store.is_completed(lesson_id));
        store
            .mark_completed(lesson_id, user, fixed_now())
            .await
            .unwrap();
        assert!(store.is_completed(lesson_id));
        assert_eq!(
            store.snapshot().get(lesson_id).unwrap().completed_at,
            Some(fixed_now())
        );
    }

    #[tokio::test]
    async fn ensure_started_writes_only_when_absent() {
        let store = ProgressStore::new(Arc::new(InMemoryRepository::new()));
        let user = UserId::generate();
        let lesson_id = LessonId::generate();

        assert!(store.ensure_started(lesson_id, user).await.unwrap());
        assert!(store.contains(lesson_id));
        assert!(!store.is_completed(lesson_id));
        assert!(!store.ensure_started(lesson_id, user).await.unwrap());

        store
            .mark_completed(lesson_id, user, fixed_now())
            .await
            .unwrap();
        assert!(!store.ensure_started(lesson_id, user).await.unwrap());
        assert!(store.is_completed(lesson_id));
    }

    #[tokio::test]
    async fn refresh_replaces_rather_than_merges() {
        let repo = InMemoryRepository::new();
        let store = ProgressStore::new(Arc::new(repo));
        let alice = UserId::generate();
        let bob = UserId::generate();
        let lesson_id = LessonId::generate();

        store
            .mark_completed(lesson_id, alice, fixed_now())
            .await
            .unwrap();
        store.activate(bob);
        store.refresh(bob).await.unwrap();
        assert!(!store.is_completed(lesson_id));
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn refresh_for_a_previous_identity_is_discarded() {
        let store = ProgressStore::new(Arc::new(InMemoryRepository::new()));
        let alice = UserId::generate();
        let bob = UserId::generate();
        let lesson_id = LessonId::generate();

        store.activate(alice);
        store
            .mark_completed(lesson_id, alice, fixed_now())
            .await
            .unwrap();
        assert!(store.is_completed(lesson_id));

        store.activate(bob);
        store.refresh(alice).await.unwrap();
        assert_eq!(store.owner(), Some(bob));
        assert!(store.snapshot().is_empty());

        // The write itself still lands for alice.
        store
            .mark_completed(LessonId::generate(), alice, fixed_now())
            .await
            .unwrap();
        assert!(store.snapshot().is_empty());
        store.activate(alice);
        store.refresh(alice).await.unwrap();
        assert_eq!(store.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn summaries_follow_lesson_lists() {
        let store = ProgressStore::new(Arc::new(InMemoryRepository::new()));
        let user = UserId::generate();
        let m1 = ModuleId::generate();
        let m2 = ModuleId::generate();
        let lessons = vec![lesson(m1, "a"), lesson(m1, "b"), lesson(m2, "c")];

        store
            .mark_completed(lessons[0].id(), user, fixed_now())
            .await
            .unwrap();
        let overall = store.summary_for(&lessons);
        assert_eq!((overall.completed, overall.total), (1, 3));
        assert_eq!(store.module_summary(m1, &lessons).rounded_percent(), 50);
        assert_eq!(store.module_summary(m2, &lessons).rounded_percent(), 0);
        assert_eq!(store.summary_for(&[]).percent(), 0.0);
    }

    #[tokio::test]
    async fn activate_empties_the_map() {
        let store = ProgressStore::new(Arc::new(InMemoryRepository::new()));
        let lesson_id = LessonId::generate();
        store
            .mark_completed(lesson_id, UserId::generate(), fixed_now())
            .await
            .unwrap();
        let next = UserId::generate();
        store.activate(next);
        assert!(!store.is_completed(lesson_id));
        assert_eq!(store.owner(), Some(next));
    }

    /// Succeeds until `fail` is flipped, then rejects every call.
    #[derive(Default)]
    struct FlakyProgress {
        inner: InMemoryRepository,
        fail: AtomicBool,
        writes: AtomicUsize,
    }

    #[async_trait]
    impl ProgressRepository for FlakyProgress {
        async fn list_progress_for_identity(
            &self,
            user_id: UserId,
        ) -> Result<Vec<ProgressRecord>, StorageError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StorageError::Connection("offline".into()));
            }
            self.inner.list_progress_for_identity(user_id).await
        }

        async fn upsert_progress(&self, upsert: &ProgressUpsert) -> Result<(), StorageError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StorageError::Connection("offline".into()));
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.upsert_progress(upsert).await
        }
    }

    #[tokio::test]
    async fn failures_leave_state_unchanged() {
        let repo = Arc::new(FlakyProgress::default());
        let store = ProgressStore::new(Arc::clone(&repo) as Arc<dyn ProgressRepository>);
        let user = UserId::generate();
        let done = LessonId::generate();
        store.mark_completed(done, user, fixed_now()).await.unwrap();

        repo.fail.store(true, Ordering::SeqCst);
        assert!(store.refresh(user).await.is_err());
        assert!(store.is_completed(done));

        let other = LessonId::generate();
        assert!(
            store
                .mark_completed(other, user, fixed_now())
                .await
                .is_err()
        );
        assert!(!store.is_completed(other));
        assert!(store.ensure_started(other, user).await.is_err());
        assert!(!store.contains(other));
        assert_eq!(repo.writes.load(Ordering::SeqCst), 1);
    }
}
