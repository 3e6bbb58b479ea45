use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use log::info;
use services::{
    AppServices, Clock, Credentials, Dashboard, IdentityError, IdentityProvider,
    ProfileServiceError, ProgressReport, ProjectBoard, ProjectSummary,
};
use storage::repository::StorageError;
use tracker_core::model::{ProfileDraft, Session, Subtask};
use tracker_core::subtasks;

mod logging;

const DEFAULT_DB_URL: &str = "sqlite://tracker.sqlite3";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    MissingEmail,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::MissingEmail => write!(f, "--email (or TRACKER_EMAIL) is required"),
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  tracker dashboard [--db <sqlite_url>] [--email <email>] [--json]");
    eprintln!("  tracker projects  [--db <sqlite_url>] [--email <email>] [--json]");
    eprintln!("  tracker report    [--db <sqlite_url>] [--email <email>] [--json]");
    eprintln!("  tracker seed      [--db <sqlite_url>] [--email <email>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TRACKER_DB_URL, TRACKER_EMAIL, TRACKER_LOG (default: info)");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Dashboard,
    Projects,
    Report,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "dashboard" => Some(Self::Dashboard),
            "projects" => Some(Self::Projects),
            "report" => Some(Self::Report),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    email: String,
    json: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("TRACKER_DB_URL")
            .ok()
            .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let mut email = std::env::var("TRACKER_EMAIL").ok();
        let mut json = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--email" => email = Some(require_value(args, "--email")?),
                "--json" => json = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let email = email
            .filter(|value| !value.trim().is_empty())
            .ok_or(ArgsError::MissingEmail)?;
        Ok(Self {
            db_url,
            email,
            json,
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

/// The CLI acts on an already-known email and never checks passwords.
struct NoIdentityProvider;

#[async_trait]
impl IdentityProvider for NoIdentityProvider {
    async fn verify(&self, _credentials: &Credentials) -> Result<bool, IdentityError> {
        Err(IdentityError::Unavailable(
            "no identity provider configured".into(),
        ))
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let mut iter = argv.into_iter().skip(1);
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let log_spec = std::env::var("TRACKER_LOG").unwrap_or_default();
    let _logger = logging::init_logging(&log_spec)?;

    prepare_sqlite_file(&parsed.db_url)?;
    let app = AppServices::new_sqlite(
        &parsed.db_url,
        Clock::default(),
        Arc::new(NoIdentityProvider),
    )
    .await?;
    let session = Session::new(parsed.email.as_str())?;

    match cmd {
        Command::Dashboard => {
            let dashboard = app.dashboard().dashboard(&session).await?;
            if parsed.json {
                println!("{}", serde_json::to_string_pretty(&dashboard)?);
            } else {
                print_dashboard(&dashboard);
            }
        }
        Command::Projects => {
            let board = app.dashboard().project_board(&session).await?;
            if parsed.json {
                println!("{}", serde_json::to_string_pretty(&board)?);
            } else {
                print_board(&board);
            }
        }
        Command::Report => {
            let report = app.dashboard().progress_report(&session).await?;
            if parsed.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Command::Seed => seed(&app, &session).await?,
    }
    Ok(())
}

fn print_summary(row: &ProjectSummary) {
    let deadline = if row.deadline.is_empty() {
        "-"
    } else {
        row.deadline.as_str()
    };
    println!(
        "  {:<28} {:>4}%  {:<12} due {deadline}",
        row.name, row.progress, row.status
    );
}

fn print_dashboard(dashboard: &Dashboard) {
    println!("Pending tasks: {}", dashboard.stats.pending_task_count);
    println!("Average progress: {}%", dashboard.stats.average_progress);
    for row in &dashboard.projects {
        print_summary(row);
    }
}

fn print_board(board: &ProjectBoard) {
    for column in &board.columns {
        println!("{} ({})", column.status, column.projects.len());
        for row in &column.projects {
            print_summary(row);
        }
    }
}

fn print_report(report: &ProgressReport) {
    for slice in &report.slices {
        println!("{:<12} {}", slice.label, slice.count);
    }
    println!(
        "Subtasks: {} completed, {} pending",
        report.stats.completed_subtask_count, report.stats.pending_subtask_count
    );
    for row in &report.rows {
        print_summary(row);
    }
}

/// Sample projects: (name, deadline, [(subtask, completed)]).
const SAMPLE_PROJECTS: &[(&str, &str, &[(&str, bool)])] = &[
    (
        "GEHISTO Video",
        "2025-05-10",
        &[("Script", true), ("Shoot", true), ("Edit", true), ("Upload", false)],
    ),
    (
        "GEFIL02 Whole Paper",
        "2025-05-20",
        &[("Introduction", true), ("Body", false)],
    ),
    (
        "CSPL System",
        "2025-06-02",
        &[("Requirements", false), ("Prototype", false)],
    ),
    (
        "ITECC06 System",
        "2025-04-28",
        &[("Design", true), ("Build", true)],
    ),
];

async fn seed(app: &AppServices, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    let draft = ProfileDraft {
        email: session.email().to_owned(),
        first_name: "Demo".into(),
        last_name: "Student".into(),
    };
    match app.profiles().sign_up(draft).await {
        Ok(_) | Err(ProfileServiceError::Storage(StorageError::AlreadyExists)) => {}
        Err(err) => return Err(err.into()),
    }

    let projects = app.projects();
    if !projects.list_projects(session).await?.is_empty() {
        eprintln!("seed: {} already has projects; nothing to do", session.email());
        return Ok(());
    }

    for (name, deadline, tasks) in SAMPLE_PROJECTS {
        let id = projects.create_project(session, name, deadline).await?;
        let mut list: Vec<Subtask> = Vec::new();
        for (index, (task, completed)) in tasks.iter().enumerate() {
            list = subtasks::add_subtask(&list, task)?;
            if *completed {
                list = subtasks::toggle_subtask(&list, index)?;
            }
        }
        projects.save_subtasks(session, &id, list).await?;
    }

    info!(
        "event=seed module=app status=ok user={} projects={}",
        session.user_key(),
        SAMPLE_PROJECTS.len()
    );
    println!("Seeded {} projects for {}", SAMPLE_PROJECTS.len(), session.email());
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
