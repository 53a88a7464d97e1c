//! Error types for repairkb.
//!
//! Library crates use [`RepairKbError`] via `thiserror`.
//! The CLI app wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all repairkb operations.
#[derive(Debug, thiserror::Error)]
pub enum RepairKbError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// HTTP fetch failure (transport error, timeout, or non-success status).
    /// Recoverable: callers skip the URL and continue the run.
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// HTML parsing or content extraction error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// URL store or guide store error. Load paths fall back to an empty
    /// store with a warning; save failures abort the merge operation.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, RepairKbError>;

impl RepairKbError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a fetch error for a URL.
    pub fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
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
        let err = RepairKbError::config("missing base domain");
        assert_eq!(err.to_string(), "config error: missing base domain");

        let err = RepairKbError::fetch("https://example.com/Guide/1", "HTTP 503");
        assert!(err.to_string().contains("https://example.com/Guide/1"));
        assert!(err.to_string().contains("HTTP 503"));
    }
}
