use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use services::{Clock, ControllerConfig, CourseController, CourseServices};
use storage::repository::Storage;
use storage::rest::RestConfig;
use tokio::runtime::Handle;
use tracing_subscriber::EnvFilter;
use ui::{App, UiApp, build_app_context};

const COURSE_TITLE: &str = "Mastering AI";
const COURSE_TAGLINE: &str = "Learn to use AI without the fluff";
const DEFAULT_DB_URL: &str = "sqlite://course.sqlite3";
const DEFAULT_COMPLETION_DELAY_MS: u64 = 1000;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidDelay { raw: String },
    MissingBackendKey,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidDelay { raw } => {
                write!(f, "invalid --completion-delay-ms value: {raw}")
            }
            ArgsError::MissingBackendKey => {
                write!(f, "--backend-url needs --backend-key (or COURSE_BACKEND_KEY)")
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

struct DesktopApp {
    controller: CourseController,
}

impl UiApp for DesktopApp {
    fn course_title(&self) -> String {
        COURSE_TITLE.to_owned()
    }

    fn course_tagline(&self) -> String {
        COURSE_TAGLINE.to_owned()
    }

    fn controller(&self) -> CourseController {
        self.controller.clone()
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    backend: Option<RestConfig>,
    completion_delay: Duration,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  course-viewer [--db <sqlite_url>] [--backend-url <url> --backend-key <key>]");
    eprintln!("                [--completion-delay-ms <ms>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --completion-delay-ms {DEFAULT_COMPLETION_DELAY_MS}");
    eprintln!("  without --backend-url the local database also handles accounts");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  COURSE_DB_URL, COURSE_BACKEND_URL, COURSE_BACKEND_KEY,");
    eprintln!("  COURSE_COMPLETION_DELAY_MS, RUST_LOG (default: info)");
}

impl Args {
    /// Flags win over the environment, read through `env`.
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url = env("COURSE_DB_URL")
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let mut backend_url = env("COURSE_BACKEND_URL").filter(|value| !value.trim().is_empty());
        let mut backend_key = env("COURSE_BACKEND_KEY").filter(|value| !value.trim().is_empty());
        let mut delay_ms = match env("COURSE_COMPLETION_DELAY_MS") {
            Some(raw) => parse_delay(raw)?,
            None => DEFAULT_COMPLETION_DELAY_MS,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--backend-url" => backend_url = Some(require_value(args, "--backend-url")?),
                "--backend-key" => backend_key = Some(require_value(args, "--backend-key")?),
                "--completion-delay-ms" => {
                    delay_ms = parse_delay(require_value(args, "--completion-delay-ms")?)?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let backend = match (backend_url, backend_key) {
            (None, _) => None,
            (Some(_), None) => return Err(ArgsError::MissingBackendKey),
            (Some(url), Some(key)) => Some(RestConfig::new(url, key)),
        };

        Ok(Self {
            db_url,
            backend,
            completion_delay: Duration::from_millis(delay_ms),
        })
    }
}

fn parse_delay(raw: String) -> Result<u64, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidDelay { raw })
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv, |key| std::env::var(key).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_logging();

    // Open + migrate SQLite at startup; it also holds the local store.
    prepare_sqlite_file(&args.db_url)?;
    let clock = Clock::system();
    let storage = Storage::sqlite(&args.db_url, clock).await?;

    let services = match args.backend {
        Some(config) => {
            tracing::info!(backend = %config.base_url, "using hosted backend");
            CourseServices::remote(clock, storage, config)
        }
        None => {
            tracing::info!(db = %args.db_url, "using local database");
            CourseServices::local(clock, &storage)
        }
    };

    let controller = CourseController::new(
        services,
        ControllerConfig {
            completion_delay: args.completion_delay,
        },
        Handle::current(),
    );
    controller.start().await;
    let _auth_watch = controller.watch_auth();

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp { controller });
    let context = build_app_context(&app);

    // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
    // Explicitly disable it so the app doesn't behave like a modal window.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title(COURSE_TITLE)
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
