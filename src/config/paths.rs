//! Path resolution for breathwork configuration and data files.
//!
//! All breathwork data is stored in `~/.breathwork/`:
//! - `config.yaml` - Main configuration file
//! - `breathwork.db` - `SQLite` database of finished sessions
//! - `breathwork.log` - Log file written while the trainer owns the terminal

use std::path::PathBuf;

use crate::error::BreathError;

/// Paths to breathwork configuration and data files.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory: `~/.breathwork/`
    pub root: PathBuf,
    /// Config file: `~/.breathwork/config.yaml`
    pub config_file: PathBuf,
    /// Database file: `~/.breathwork/breathwork.db`
    pub database: PathBuf,
    /// Log file: `~/.breathwork/breathwork.log`
    pub log_file: PathBuf,
}

impl Paths {
    /// Create paths based on the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, BreathError> {
        let home = std::env::var("HOME").map_err(|_| {
            BreathError::Config("Could not determine home directory".to_string())
        })?;

        Ok(Self::with_root(PathBuf::from(home).join(".breathwork")))
    }

    /// Create paths with a custom root directory.
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            database: root.join("breathwork.db"),
            log_file: root.join("breathwork.log"),
            root,
        }
    }

    /// Ensure the root directory exists, creating it if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_dirs(&self) -> Result<(), BreathError> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root).map_err(|e| {
                BreathError::Config(format!(
                    "Failed to create directory {}: {e}",
                    self.root.display()
                ))
            })?;
        }

        Ok(())
    }
}
