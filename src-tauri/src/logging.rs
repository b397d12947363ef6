//! Structured logging for the wellbeing agent
//!
//! Events go through `tracing` to stdout and to a daily file under the
//! platform local-data directory (`wellbeing-agent/logs`). Categories:
//! - INTAKE: Form submissions and credential checks
//! - ROUTING: Group chat speaker selection and termination
//! - AGENT: Persona and driver replies
//! - SESSION: App and submission lifecycle
//! - ERROR: Pipeline failures
//!
//! Message text must never contain the API key.

use chrono::{Local, Utc};
use once_cell::sync::OnceCell;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

const LOG_RETENTION_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCategory {
    Intake,
    Routing,
    Agent,
    Session,
    Error,
}

impl LogCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogCategory::Intake => "INTAKE",
            LogCategory::Routing => "ROUTING",
            LogCategory::Agent => "AGENT",
            LogCategory::Session => "SESSION",
            LogCategory::Error => "ERROR",
        }
    }
}

static LOG_FILE: OnceCell<PathBuf> = OnceCell::new();

fn get_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("wellbeing-agent")
        .join("logs")
}

fn get_log_file_path(dir: &Path) -> PathBuf {
    let today = Local::now().format("%Y-%m-%d").to_string();
    dir.join(format!("wellbeing-agent-{}.log", today))
}

/// Install the global subscriber. Safe to call more than once.
pub fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    if LOG_FILE.get().is_some() {
        return Ok(());
    }

    let log_dir = get_log_dir();
    if !log_dir.exists() {
        fs::create_dir_all(&log_dir)?;
    }

    let log_path = get_log_file_path(&log_dir);
    let file = OpenOptions::new().create(true).append(true).open(&log_path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stdout.and(Mutex::new(file)))
        .try_init()
        .is_ok();

    if installed {
        let _ = LOG_FILE.set(log_path.clone());
        log_session(None, &format!("Logging initialized at {}", log_path.display()));
    }

    Ok(())
}

fn session_context(session_id: Option<&str>) -> String {
    session_id
        .map(|id| format!("session={} | ", &id[..8.min(id.len())]))
        .unwrap_or_default()
}

/// Log a message with category and optional session context
pub fn log(category: LogCategory, session_id: Option<&str>, message: &str) {
    let context = session_context(session_id);
    match category {
        LogCategory::Error => tracing::error!(category = category.as_str(), "{}{}", context, message),
        _ => tracing::info!(category = category.as_str(), "{}{}", context, message),
    }
}

pub fn log_intake(session_id: Option<&str>, message: &str) {
    log(LogCategory::Intake, session_id, message);
}

pub fn log_routing(session_id: Option<&str>, message: &str) {
    log(LogCategory::Routing, session_id, message);
}

pub fn log_agent(session_id: Option<&str>, message: &str) {
    log(LogCategory::Agent, session_id, message);
}

pub fn log_session(session_id: Option<&str>, message: &str) {
    log(LogCategory::Session, session_id, message);
}

pub fn log_error(session_id: Option<&str>, message: &str) {
    log(LogCategory::Error, session_id, message);
}

/// Remove log files older than the retention window
pub fn cleanup_old_logs() -> Result<usize, Box<dyn std::error::Error>> {
    cleanup_logs_in(&get_log_dir(), LOG_RETENTION_DAYS)
}

fn cleanup_logs_in(log_dir: &Path, retention_days: i64) -> Result<usize, Box<dyn std::error::Error>> {
    let mut deleted = 0;

    if !log_dir.exists() {
        return Ok(0);
    }

    let cutoff = Utc::now() - chrono::Duration::days(retention_days);

    for entry in fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("log") {
            continue;
        }

        if let Ok(modified) = entry.metadata().and_then(|m| m.modified()) {
            let modified_time: chrono::DateTime<Utc> = modified.into();
            if modified_time < cutoff && fs::remove_file(&path).is_ok() {
                deleted += 1;
            }
        }
    }

    Ok(deleted)
}
