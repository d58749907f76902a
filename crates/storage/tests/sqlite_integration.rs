use chrono::Duration;
use course_core::model::{Lesson, LessonId, Module, ModuleId, Quiz, QuizId, UserId};
use course_core::Clock;
use course_core::time::fixed_now;
use storage::repository::{
    AccountRecord, AccountRepository, CourseRepository, LocalStore, ProgressRepository,
    ProgressUpsert, StorageError,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn module(title: &str, order: i32) -> Module {
    Module::new(ModuleId::generate(), title, "about", order, fixed_now()).unwrap()
}

fn lesson(module_id: ModuleId, title: &str, order: i32) -> Lesson {
    Lesson::new(
        LessonId::generate(),
        module_id,
        title,
        "line one\n\nline two",
        order,
        fixed_now(),
    )
    .unwrap()
}

#[tokio::test]
async fn sqlite_lists_catalog_in_order() {
    let repo = connect("memdb_catalog").await;

    let second = module("Second", 2);
    let first = module("First", 1);
    repo.upsert_module(&second).await.unwrap();
    repo.upsert_module(&first).await.unwrap();

    let l2 = lesson(first.id(), "L2", 2);
    let l1 = lesson(first.id(), "L1", 1);
    let other = lesson(second.id(), "Other", 1);
    for l in [&l2, &l1, &other] {
        repo.upsert_lesson(l).await.unwrap();
    }

    let modules = repo.list_modules().await.unwrap();
    let titles: Vec<_> = modules.iter().map(Module::title).collect();
    assert_eq!(titles, vec!["First", "Second"]);

    let lessons = repo.list_lessons_for_module(first.id()).await.unwrap();
    let titles: Vec<_> = lessons.iter().map(Lesson::title).collect();
    assert_eq!(titles, vec!["L1", "L2"]);
    assert_eq!(lessons[0].content(), "line one\n\nline two");

    let all = repo.list_all_lessons().await.unwrap();
    assert_eq!(all.len(), 3);
    assert!(
        repo.list_lessons_for_module(ModuleId::generate())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn sqlite_round_trips_quiz_options() {
    let repo = connect("memdb_quizzes").await;
    let m = module("M", 1);
    repo.upsert_module(&m).await.unwrap();
    let l = lesson(m.id(), "L", 1);
    repo.upsert_lesson(&l).await.unwrap();

    let later = Quiz::new(
        QuizId::generate(),
        l.id(),
        "Second?",
        vec!["a".into(), "b".into()],
        1,
        "because b",
        2,
        fixed_now(),
    )
    .unwrap();
    let earlier = Quiz::new(
        QuizId::generate(),
        l.id(),
        "First?",
        vec!["x".into(), "y, with comma".into(), "z".into()],
        0,
        "",
        1,
        fixed_now(),
    )
    .unwrap();
    repo.upsert_quiz(&later).await.unwrap();
    repo.upsert_quiz(&earlier).await.unwrap();

    let quizzes = repo.list_quizzes_for_lesson(l.id()).await.unwrap();
    assert_eq!(quizzes.len(), 2);
    assert_eq!(quizzes[0].question(), "First?");
    assert_eq!(quizzes[0].options()[1], "y, with comma");
    assert_eq!(quizzes[1].correct_answer(), 1);
    assert_eq!(quizzes[1].explanation(), "because b");
}

#[tokio::test]
async fn sqlite_progress_upsert_keeps_one_row_per_lesson() {
    let repo = connect("memdb_progress").await;
    let user = UserId::generate();
    let lesson_id = LessonId::generate();

    repo.upsert_progress(&ProgressUpsert::started(user, lesson_id))
        .await
        .unwrap();
    repo.upsert_progress(&ProgressUpsert::started(user, lesson_id))
        .await
        .unwrap();

    let records = repo.list_progress_for_identity(user).await.unwrap();
    assert_eq!(records.len(), 1);
    assert!(!records[0].completed);
    assert!(records[0].completed_at.is_none());
    let original_id = records[0].id;

    let done_at = fixed_now() + Duration::minutes(5);
    repo.upsert_progress(&ProgressUpsert::completed(user, lesson_id, done_at))
        .await
        .unwrap();

    let records = repo.list_progress_for_identity(user).await.unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].completed);
    assert_eq!(records[0].completed_at, Some(done_at));
    assert_eq!(records[0].id, original_id);

    let stranger = repo
        .list_progress_for_identity(UserId::generate())
        .await
        .unwrap();
    assert!(stranger.is_empty());
}

#[tokio::test]
async fn sqlite_accounts_reject_duplicate_email() {
    let repo = connect("memdb_accounts").await;
    let record = AccountRecord {
        id: UserId::generate(),
        email: "ada@example.com".into(),
        password_hash: "hash".into(),
        created_at: fixed_now(),
    };
    repo.insert_account(&record).await.unwrap();

    let dup = AccountRecord {
        id: UserId::generate(),
        ..record.clone()
    };
    let err = repo.insert_account(&dup).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    let found = repo
        .find_account_by_email("ada@example.com")
        .await
        .unwrap()
        .expect("account");
    assert_eq!(found, record);
    assert_eq!(repo.get_account(record.id).await.unwrap(), Some(record));
    assert!(
        repo.find_account_by_email("nobody@example.com")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn sqlite_local_store_set_get_remove() {
    let repo = connect("memdb_local").await;
    assert_eq!(repo.get("temp_user_id").await.unwrap(), None);

    repo.set("temp_user_id", "abc").await.unwrap();
    repo.set("temp_user_id", "def").await.unwrap();
    assert_eq!(repo.get("temp_user_id").await.unwrap().as_deref(), Some("def"));

    repo.remove("temp_user_id").await.unwrap();
    assert_eq!(repo.get("temp_user_id").await.unwrap(), None);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
    assert!(repo.list_modules().await.unwrap().is_empty());
}

#[tokio::test]
async fn sqlite_started_upsert_keeps_completion_time() {
    let created = fixed_now() - Duration::days(1);
    let repo = connect("memdb_progress_keep")
        .await
        .with_clock(Clock::fixed(created));
    let user = UserId::generate();
    let lesson_id = LessonId::generate();

    let done_at = fixed_now();
    repo.upsert_progress(&ProgressUpsert::completed(user, lesson_id, done_at))
        .await
        .unwrap();
    repo.upsert_progress(&ProgressUpsert::started(user, lesson_id))
        .await
        .unwrap();

    let records = repo.list_progress_for_identity(user).await.unwrap();
    assert_eq!(records.len(), 1);
    assert!(!records[0].completed);
    assert_eq!(records[0].completed_at, Some(done_at));
    assert_eq!(records[0].created_at, created);
}
