//! Logging infrastructure for the importer.
//!
//! Structured logging uses the `tracing` ecosystem: JSON lines go to a
//! daily-rolling file under `~/.importer/logs/`, and a compact human-readable
//! layer writes to stderr.
//!
//! ## Example
//!
//! ```no_run
//! use importer_core::logging;
//!
//! let _guard = logging::init_logging(None, false).expect("logging init");
//!
//! tracing::info!("importer started");
//! tracing::debug!(task_id = "c0ffee", "polling progress");
//! ```

use std::path::PathBuf;

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{ImporterError, Result};

/// Log file name inside the log directory.
pub const LOG_FILE_NAME: &str = "importer.log";

/// Crates whose events are recorded by default.
const LOG_TARGETS: &[&str] = &[
    "importer",
    "importer_core",
    "importer_config",
    "importer_client",
    "importer_tracker",
];

/// Guard that must be held to ensure log flushing on shutdown.
///
/// Keep this guard alive for the lifetime of the application.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the importer logging system.
///
/// * `log_dir` - Optional custom log directory. Defaults to `~/.importer/logs/`
/// * `verbose` - If true, records DEBUG and mirrors it to stderr.
///
/// The file always gets every recorded event as JSON. Without `verbose`
/// stderr only shows warnings and errors, since user-facing notifications
/// are printed there already.
///
/// Returns a [`LogGuard`] that must be held for the application lifetime.
pub fn init_logging(log_dir: Option<PathBuf>, verbose: bool) -> Result<LogGuard> {
    let log_dir = match log_dir {
        Some(dir) => dir,
        None => default_log_dir()?,
    };

    std::fs::create_dir_all(&log_dir).map_err(|e| ImporterError::DirectoryCreation {
        path: log_dir.clone(),
        source: e,
    })?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_NAME);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    // Events carry task and webhook ids as fields; no spans are opened.
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .json()
        .flatten_event(true);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .without_time()
        .compact()
        .with_filter(if verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::WARN
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::debug!(log_dir = %log_dir.display(), verbose, "logging initialized");

    Ok(LogGuard {
        _file_guard: Some(file_guard),
    })
}

/// `EnvFilter` directives enabling `level` for the importer crates only.
fn default_directives(level: &str) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize minimal console-only logging for testing.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Get the importer home directory (`~/.importer/`).
pub fn importer_home() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".importer"))
        .ok_or_else(|| ImporterError::internal("home directory could not be determined"))
}

/// Get the default log directory path (`~/.importer/logs/`).
pub fn default_log_dir() -> Result<PathBuf> {
    Ok(importer_home()?.join("logs"))
}

/// Get the default log file path (`~/.importer/logs/importer.log`).
pub fn default_log_file() -> Result<PathBuf> {
    Ok(default_log_dir()?.join(LOG_FILE_NAME))
}

/// Log a progress-tracking milestone for one import task.
///
/// Events go to the `importer::import` target so the JSON log can be
/// filtered down to one task's history.
///
/// ```ignore
/// log_task_event!("c0ffee", "progress tracking armed");
/// log_task_event!("c0ffee", "import reached terminal status", status = %ImportStatus::Failed);
/// ```
#[macro_export]
macro_rules! log_task_event {
    ($task_id:expr, $event:expr) => {
        tracing::info!(
            target: "importer::import",
            task_id = %$task_id,
            event = $event,
            "import task event"
        )
    };
    ($task_id:expr, $event:expr, $($field:tt)*) => {
        tracing::info!(
            target: "importer::import",
            task_id = %$task_id,
            event = $event,
            $($field)*,
            "import task event"
        )
    };
}
