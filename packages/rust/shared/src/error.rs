//! Error types for SkillSync.
//!
//! Library crates use [`SkillSyncError`] via `thiserror`.
//! The CLI app wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all SkillSync operations.
#[derive(Debug, thiserror::Error)]
pub enum SkillSyncError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error during catalog or registry calls.
    #[error("network error: {0}")]
    Network(String),

    /// JSON body or header parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad domain, CTID, or key format).
    #[error("{message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SkillSyncError>;

impl SkillSyncError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    ///
    /// Validation messages are surfaced to the operator as-is, so they
    /// must be self-contained and name the offending value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = SkillSyncError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = SkillSyncError::Network("http://example.com/api/skills: HTTP 503".into());
        assert!(err.to_string().contains("HTTP 503"));
    }

    #[test]
    fn validation_message_is_unwrapped() {
        // Validation text goes straight to the operator, so Display must
        // not add a prefix around it.
        let err = SkillSyncError::validation("This domain appears to be invalid.");
        assert_eq!(err.to_string(), "This domain appears to be invalid.");
    }
}
