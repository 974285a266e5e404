//! Structured logging with tracing.
//!
//! The trainer owns the terminal, so logs normally go to a file. The level
//! comes from `BREATHWORK_LOG` when set, otherwise from the caller.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, EnvFilter};

use crate::error::BreathError;

/// Environment variable that overrides the log filter.
pub const LOG_ENV: &str = "BREATHWORK_LOG";

/// Build the log filter, preferring `BREATHWORK_LOG` over `level`.
#[must_use]
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber.
///
/// With `log_file` set, output is appended to that file without colors;
/// otherwise it goes to stderr. A second call is a no-op.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
pub fn init_logging(level: &str, log_file: Option<&Path>) -> Result<(), BreathError> {
    let filter = build_filter(level);

    let installed = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    BreathError::Config(format!(
                        "Failed to open log file {}: {e}",
                        path.display()
                    ))
                })?;
            fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .compact()
                .try_init()
        }
        None => fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .try_init(),
    };

    if installed.is_err() {
        tracing::debug!("logging already initialised");
    }

    Ok(())
}
