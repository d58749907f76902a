use std::fmt;

use chrono::{DateTime, Duration, Utc};
use course_core::Clock;
use course_core::model::{Lesson, LessonId, Module, ModuleId, Quiz, QuizId};
use storage::repository::Storage;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    modules: u32,
    lessons_per_module: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidModules { raw: String },
    InvalidLessons { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidModules { raw } => write!(f, "invalid --modules value: {raw}"),
            ArgsError::InvalidLessons { raw } => {
                write!(f, "invalid --lessons-per-module value: {raw}")
            }
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("COURSE_DB_URL")
            .unwrap_or_else(|_| "sqlite://course.sqlite3?mode=rwc".into());
        let mut modules = 3;
        let mut lessons_per_module = 3;
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--modules" => {
                    let value = require_value(&mut args, "--modules")?;
                    modules = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidModules { raw: value.clone() })?;
                }
                "--lessons-per-module" => {
                    let value = require_value(&mut args, "--lessons-per-module")?;
                    lessons_per_module = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidLessons { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            modules,
            lessons_per_module,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>              SQLite URL (default: sqlite://course.sqlite3?mode=rwc)");
    eprintln!("  --modules <n>                  Number of modules to upsert (default: 3)");
    eprintln!("  --lessons-per-module <n>       Lessons per module (default: 3)");
    eprintln!("  --now <rfc3339>                Fixed creation time for deterministic seeding");
    eprintln!("  -h, --help                     Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  COURSE_DB_URL (same as --db)");
}

// Stable ids so re-running the seeder updates rows in place.
fn seeded_id(kind: u128, module: u32, lesson: u32, quiz: u32) -> Uuid {
    Uuid::from_u128(
        (kind << 96) | (u128::from(module) << 64) | (u128::from(lesson) << 32) | u128::from(quiz),
    )
}

const TOPICS: [(&str, &str); 3] = [
    ("Foundations", "Core vocabulary and the shape of the subject."),
    ("Practice", "Worked examples that build fluency."),
    ("Review", "Pulling the pieces together."),
];

fn lesson_body(module_title: &str, number: u32) -> String {
    format!(
        "Welcome to part {number} of {module_title}.\n\n\
         Read each paragraph slowly.\n\
         Then check yourself with the questions below."
    )
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let now = args.now.unwrap_or_else(Utc::now);
    let storage = Storage::sqlite(&args.db_url, Clock::fixed(now)).await?;

    let mut lesson_count = 0u32;
    let mut quiz_count = 0u32;
    for m in 0..args.modules {
        let (title, description) = TOPICS[(m as usize) % TOPICS.len()];
        let title = format!("{} {}", title, m + 1);
        let module = Module::new(
            ModuleId::new(seeded_id(1, m, 0, 0)),
            title.clone(),
            description,
            i32::try_from(m)?,
            now + Duration::seconds(i64::from(m)),
        )?;
        storage.courses.upsert_module(&module).await?;

        for l in 0..args.lessons_per_module {
            let lesson = Lesson::new(
                LessonId::new(seeded_id(2, m, l, 0)),
                module.id(),
                format!("Lesson {}", l + 1),
                lesson_body(&title, l + 1),
                i32::try_from(l)?,
                now,
            )?;
            storage.courses.upsert_lesson(&lesson).await?;
            lesson_count += 1;

            // Every other lesson carries a quiz; the rest complete on request.
            if l % 2 == 1 {
                continue;
            }
            for q in 0..2u32 {
                let quiz = Quiz::new(
                    QuizId::new(seeded_id(3, m, l, q)),
                    lesson.id(),
                    format!("Question {} about {}?", q + 1, lesson.title()),
                    vec!["First".into(), "Second".into(), "Third".into()],
                    (q as usize) % 3,
                    "The answer follows from the paragraph above.",
                    i32::try_from(q)?,
                    now,
                )?;
                storage.courses.upsert_quiz(&quiz).await?;
                quiz_count += 1;
            }
        }
    }

    println!(
        "Seeded {} modules, {} lessons and {} quizzes into {}",
        args.modules, lesson_count, quiz_count, args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
