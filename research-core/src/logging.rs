//! Tracing subscriber setup shared by the binaries.
//!
//! The REPL logs to `<data dir>/logs/research.log` so log lines do not mix
//! with answers on the console. Servers log to stderr.

use config::PathManager;
use std::path::Path;
use std::sync::{Once, OnceLock};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_FILTER: &str = "info,llm=info,research_core=info,traffic=warn";

static INIT: Once = Once::new();
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Log to the application log file, falling back to stderr when it cannot be opened.
pub fn init_file_logging() {
    INIT.call_once(|| match PathManager::log_file_path() {
        Some(path) => {
            if let Err(e) = install_file_subscriber(&path) {
                eprintln!("Failed to open log file {:?}: {}", path, e);
                install_stderr_subscriber(DEFAULT_FILTER);
            }
        }
        None => install_stderr_subscriber(DEFAULT_FILTER),
    });
}

/// Log to stderr. `default_filter` applies when `RUST_LOG` is unset.
pub fn init_stderr_logging(default_filter: &str) {
    INIT.call_once(|| install_stderr_subscriber(default_filter));
}

fn install_file_subscriber(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    let (writer, guard) = tracing_appender::non_blocking(file);
    let _ = LOG_GUARD.set(guard);

    let subscriber = tracing_subscriber::registry().with(filter(DEFAULT_FILTER)).with(
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true),
    );
    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        tracing::info!("Logging initialized, writing to {:?}", path);
    }
    Ok(())
}

fn install_stderr_subscriber(default_filter: &str) {
    let subscriber = tracing_subscriber::registry().with(filter(default_filter)).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true),
    );
    let _ = tracing::subscriber::set_global_default(subscriber);
}
