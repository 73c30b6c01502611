//! Tracing subscriber setup.
//!
//! Logs go to stderr, plus a daily rolling file when the config names a
//! log directory. `RUST_LOG` overrides the configured filter.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

pub const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn";

const LOG_FILE_NAME: &str = "xblstatus.log";

/// Installs the global subscriber.
///
/// Keep the returned guard alive for the life of the process; dropping it
/// stops the file writer.
///
/// # Panics
/// Panics if a global subscriber is already installed.
pub fn init(config: Option<&LoggingConfig>) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match config.and_then(|config| config.directory.as_deref()) {
        Some(dir) => match file_writer(dir) {
            Some((writer, guard)) => {
                let layer = fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(false)
                    .with_writer(writer);
                (Some(layer), Some(guard))
            }
            None => (None, None),
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    if config.is_some() {
        tracing::info!("Using logging config from file");
    } else {
        tracing::info!("Using default logging config");
    }
    if let Some(dir) = config.and_then(|config| config.directory.as_deref())
        && guard.is_some()
    {
        tracing::info!("Log directory: {}", dir.display());
    }

    guard
}

/// Filter directives from the config, or the default set.
pub fn filter_directives(config: Option<&LoggingConfig>) -> &str {
    config
        .and_then(|config| config.filter.as_deref())
        .map(str::trim)
        .filter(|filter| !filter.is_empty())
        .unwrap_or(DEFAULT_FILTER)
}

fn file_writer(dir: &Path) -> Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!(
            "Warning: Failed to create log directory {}: {}",
            dir.display(),
            e
        );
        return None;
    }

    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
    Some(tracing_appender::non_blocking(appender))
}
