use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use quiz_core::model::ContentId;
use services::{AppServices, BackendConfig, Clock};
use tracing::info;
use tracing_subscriber::EnvFilter;
use ui::{App, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingApi,
    MissingContent,
    UnknownArg(String),
    InvalidContentId { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingApi => write!(f, "--api or QUIZ_API_BASE_URL is required"),
            ArgsError::MissingContent => write!(f, "--content or QUIZ_CONTENT_ID is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidContentId { raw } => write!(f, "invalid --content value: {raw:?}"),
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
    content_id: ContentId,
    services: AppServices,
}

impl UiApp for DesktopApp {
    fn content_id(&self) -> ContentId {
        self.content_id.clone()
    }

    fn services(&self) -> AppServices {
        self.services.clone()
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    backend: BackendConfig,
    content_id: ContentId,
    in_memory: bool,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- --api <base_url> --content <id> [--token <token>] [--db <sqlite_url>] [--memory]"
    );
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:quiz.sqlite3");
    eprintln!("  no --token: guest attempt");
    eprintln!("  --memory: keep checkpoints in memory only");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_API_BASE_URL, QUIZ_API_TOKEN, QUIZ_API_TIMEOUT_SECS, QUIZ_CONTENT_ID");
    eprintln!("  RUST_LOG (e.g. info,services=debug)");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url);
        let mut backend = BackendConfig::from_env();
        let mut content = std::env::var("QUIZ_CONTENT_ID").ok();
        let mut token = None;
        let mut in_memory = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--api" => {
                    let value = require_value(args, "--api")?;
                    let mut config = BackendConfig::new(value);
                    if let Some(previous) = backend.take() {
                        config.api_token = previous.api_token;
                        config.timeout = previous.timeout;
                    }
                    backend = Some(config);
                }
                "--content" => content = Some(require_value(args, "--content")?),
                "--token" => token = Some(require_value(args, "--token")?),
                "--memory" => in_memory = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let mut backend = backend.ok_or(ArgsError::MissingApi)?;
        if token.is_some() {
            backend = backend.with_token(token);
        }
        let raw = content.ok_or(ArgsError::MissingContent)?;
        let content_id =
            ContentId::new(raw.clone()).map_err(|_| ArgsError::InvalidContentId { raw })?;

        Ok(Self {
            db_url,
            backend,
            content_id,
            in_memory,
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

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let clock = Clock::system();
    let services = if parsed.in_memory {
        AppServices::in_memory(clock, parsed.backend)?
    } else {
        prepare_sqlite_file(&parsed.db_url)?;
        AppServices::new_sqlite(&parsed.db_url, clock, parsed.backend).await?
    };
    info!(
        content_id = %parsed.content_id,
        in_memory = parsed.in_memory,
        "launching quiz"
    );

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
        content_id: parsed.content_id,
        services,
    });
    let context = build_app_context(&app);

    // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
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
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
