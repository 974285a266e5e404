//! Error types for breathwork.

use thiserror::Error;

/// Errors that can occur in breathwork.
#[derive(Error, Debug)]
pub enum BreathError {
    /// Configuration could not be read, written or resolved.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Session settings were rejected before a session could start.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// A requested session does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input or stored data could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The terminal could not be set up or drawn to.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for BreathError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<rusqlite::Error> for BreathError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl BreathError {
    /// Process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidSettings(_) | Self::Parse(_) => 2,
            Self::NotFound(_) => 3,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BreathError::InvalidSettings("inhale must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid settings: inhale must be positive");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(BreathError::NotFound("x".to_string()).exit_code(), 3);
        assert_eq!(BreathError::Parse("x".to_string()).exit_code(), 2);
        assert_eq!(BreathError::Database("x".to_string()).exit_code(), 1);
    }

    #[test]
    fn test_from_serde_json() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        assert!(matches!(BreathError::from(err), BreathError::Parse(_)));
    }
}
