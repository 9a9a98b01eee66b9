//! Centralized error types for mailshred.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the mailshred library.
#[derive(Error, Debug)]
pub enum ShredError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified source file or directory does not exist.
    #[error("Tranche source not found: {0}")]
    SourceNotFound(PathBuf),

    /// The source path exists but has the wrong kind (file vs. directory).
    #[error("Expected a directory of PDFs: {0}")]
    NotADirectory(PathBuf),

    /// An external extraction tool failed or could not be spawned.
    #[error("{tool} failed: {reason}")]
    Tool { tool: String, reason: String },

    /// The positioned-word stream was malformed beyond recovery.
    #[error("Malformed word stream on page {page}: {reason}")]
    Stream { page: u32, reason: String },

    /// An invalid configuration value was supplied.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A report or side-car file could not be produced.
    #[error("Report error: {0}")]
    Report(String),

    /// The user cancelled the tranche mid-run.
    #[error("Operation cancelled by user")]
    Cancelled,
}

/// Convenience alias for `Result<T, ShredError>`.
pub type Result<T> = std::result::Result<T, ShredError>;

impl ShredError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a `Tool` variant from a tool name and a failure description.
    pub fn tool(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            reason: reason.into(),
        }
    }
}

/// Allow `?` on `std::io::Error` inside functions returning `ShredError`
/// when no path context is available (rare; prefer `ShredError::io`).
impl From<std::io::Error> for ShredError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<unknown>"),
            source,
        }
    }
}
