#![forbid(unsafe_code)]

//! Structured logging to a file.
//!
//! The terminal belongs to the dashboard while it runs, so logs only go to
//! a file that is appended to across runs. `DEADRABBIT_LOG` takes an
//! `EnvFilter` directive and overrides the level picked from the debug
//! flag.
//!
//! ```ignore
//! let _guard = deadrabbit::logging::init(Path::new("logs.txt"), false)?;
//! ```
//!
//! Keep the guard alive for the whole run; dropping it flushes the
//! background writer.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the log filter.
pub const FILTER_ENV: &str = "DEADRABBIT_LOG";

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("cannot open log file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("a global subscriber is already installed")]
    AlreadyInitialized(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// The level used when `DEADRABBIT_LOG` is unset or invalid.
pub fn default_level(debug: bool) -> &'static str {
    if debug { "debug" } else { "info" }
}

/// Install the global subscriber writing to `path`.
pub fn init(path: &Path, debug: bool) -> Result<WorkerGuard, LogError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| LogError::Open {
            path: path.display().to_string(),
            source,
        })?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LogError::Open {
            path: path.display().to_string(),
            source,
        })?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let env_filter =
        EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(default_level(debug)));
    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false),
    );
    tracing::subscriber::set_global_default(subscriber)?;

    // `tracing`'s macros import a `debug` helper that shadows the parameter.
    let debug_enabled = debug;
    tracing::info!(path = %path.display(), debug = debug_enabled, "logging initialized");
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_picks_level() {
        assert_eq!(default_level(true), "debug");
        assert_eq!(default_level(false), "info");
    }

    #[test]
    fn unopenable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending.
        let err = init(dir.path(), false).unwrap_err();
        assert!(matches!(err, LogError::Open { .. }));
    }
}
