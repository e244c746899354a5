use std::fs;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const LOG_DIR: &str = "match_narrator";
const LOG_FILE: &str = "match_narrator.log";

/// File-only logging: the dashboard owns the terminal. Returns the writer guard,
/// which must stay alive until exit, or `None` when no log directory is usable.
pub fn init_logging() -> Option<WorkerGuard> {
    let dir = log_dir()?;
    if fs::create_dir_all(&dir).is_err() {
        return None;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,match_narrator=debug,reqwest=warn"));
    let appender = tracing_appender::rolling::never(&dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .ok()?;
    Some(guard)
}

pub fn log_file_path() -> Option<PathBuf> {
    log_dir().map(|dir| dir.join(LOG_FILE))
}

fn log_dir() -> Option<PathBuf> {
    if let Some(dir) = non_empty_env("MATCH_NARRATOR_LOG_DIR") {
        return Some(PathBuf::from(dir));
    }
    if let Some(base) = non_empty_env("XDG_CACHE_HOME") {
        return Some(PathBuf::from(base).join(LOG_DIR));
    }
    let home = non_empty_env("HOME")?;
    Some(PathBuf::from(home).join(".cache").join(LOG_DIR))
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
