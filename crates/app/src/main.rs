mod telemetry;

use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use quiz_core::model::{QuizId, QuizPolicy, UserId};
use services::{AuthProvider, Clock, QuizSessionLoop, WatchAuth};
use storage::Storage;
use storage::seed::seed_samples;
use tracing::info;
use ui::{App, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidQuizId { raw: String },
    InvalidUser { raw: String },
    InvalidPolicy { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidQuizId { raw } => write!(f, "invalid --quiz-id value: {raw}"),
            ArgsError::InvalidUser { raw } => write!(f, "invalid --user value: {raw}"),
            ArgsError::InvalidPolicy { raw } => {
                write!(f, "invalid --policy value: {raw} (expected classic or resumable)")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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
    quiz_id: QuizId,
    auth: Arc<WatchAuth>,
    session_loop: Arc<QuizSessionLoop>,
}

impl UiApp for DesktopApp {
    fn default_quiz_id(&self) -> QuizId {
        self.quiz_id.clone()
    }

    fn auth(&self) -> Arc<WatchAuth> {
        Arc::clone(&self.auth)
    }

    fn session_loop(&self) -> Arc<QuizSessionLoop> {
        Arc::clone(&self.session_loop)
    }
}

struct Args {
    db_url: String,
    quiz_id: QuizId,
    user: Option<UserId>,
    policy: QuizPolicy,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- ui   [--db <sqlite_url>] [--quiz-id <id>] [--user <id>] [--policy classic|resumable]"
    );
    eprintln!("  cargo run -p app -- seed [--db <sqlite_url>] [--user <owner id>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://quiz.sqlite3");
    eprintln!("  --quiz-id math-basics");
    eprintln!("  --policy classic");
    eprintln!("  no --user: the quiz screen asks you to register first");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_ID, QUIZ_USER, QUIZ_POLICY, QUIZ_LOG, QUIZ_LOG_FORMAT=json");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

fn parse_quiz_id(raw: String) -> Result<QuizId, ArgsError> {
    QuizId::new(raw.clone()).map_err(|_| ArgsError::InvalidQuizId { raw })
}

fn parse_user(raw: String) -> Result<UserId, ArgsError> {
    UserId::new(raw.clone()).map_err(|_| ArgsError::InvalidUser { raw })
}

fn parse_policy(raw: String) -> Result<QuizPolicy, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidPolicy { raw })
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url);
        let mut quiz_id = match std::env::var("QUIZ_ID") {
            Ok(value) => parse_quiz_id(value)?,
            Err(_) => parse_quiz_id("math-basics".into())?,
        };
        let mut user = std::env::var("QUIZ_USER").ok().map(parse_user).transpose()?;
        let mut policy = std::env::var("QUIZ_POLICY")
            .ok()
            .map(parse_policy)
            .transpose()?
            .unwrap_or_default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--quiz-id" => quiz_id = parse_quiz_id(require_value(args, "--quiz-id")?)?,
                "--user" => user = Some(parse_user(require_value(args, "--user")?)?),
                "--policy" => policy = parse_policy(require_value(args, "--policy")?)?,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            quiz_id,
            user,
            policy,
        })
    }
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

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand launches the UI.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Ui,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Ui,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite here so the library crates never touch the filesystem layout.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;
    let store = storage.quizzes();

    match cmd {
        Command::Ui => {
            let auth = Arc::new(match parsed.user {
                Some(user) => WatchAuth::signed_in(user),
                None => WatchAuth::anonymous(),
            });
            let auth_provider: Arc<dyn AuthProvider> = auth.clone();
            let session_loop = Arc::new(
                QuizSessionLoop::new(Clock::system(), store, auth_provider)
                    .with_policy(parsed.policy),
            );
            info!(
                db = %parsed.db_url,
                quiz_id = %parsed.quiz_id,
                policy = %parsed.policy,
                "launching quiz ui"
            );

            let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
                quiz_id: parsed.quiz_id,
                auth,
                session_loop,
            });
            let context = build_app_context(&app);

            // Some dev setups default the window to always-on-top.
            let desktop_cfg = DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title("Quiz")
                    .with_always_on_top(false),
            );

            LaunchBuilder::desktop()
                .with_cfg(desktop_cfg)
                .with_context(context)
                .launch(App);
            Ok(())
        }
        Command::Seed => {
            let ids = seed_samples(&store, parsed.user.as_ref()).await?;
            for id in &ids {
                println!("seeded quiz {id}");
            }
            info!(count = ids.len(), db = %parsed.db_url, "seeded sample quizzes");
            Ok(())
        }
    }
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

#[tokio::main]
async fn main() {
    telemetry::init_tracing();
    if let Err(err) = run().await {
        // Binary glue: report once and exit.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
