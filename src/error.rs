//! Error types for varidelta.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for varidelta operations.
///
/// Each variant maps to a process exit code (see [`exit_codes`]).
#[derive(Error, Debug)]
pub enum VariError {
    /// Malformed unified diff text.
    #[error("diff parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Filesystem read, write, or move failure.
    #[error("I/O error: {0}")]
    Io(String),

    /// Read of an absent artifact, generation, or diff entry.
    #[error("not found: {0}")]
    NotFound(String),

    /// Artifact codec failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration or command-line input.
    #[error("{0}")]
    Config(String),

    /// Git invocation failed.
    #[error("git operation failed: {0}")]
    Git(String),
}

impl VariError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        VariError::Parse {
            line,
            message: message.into(),
        }
    }

    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            VariError::Config(_) => exit_codes::USER_ERROR,
            VariError::Parse { .. } => exit_codes::PARSE_FAILURE,
            VariError::Io(_) | VariError::NotFound(_) | VariError::Serialization(_) => {
                exit_codes::STORE_FAILURE
            }
            VariError::Git(_) => exit_codes::GIT_FAILURE,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, VariError::NotFound(_))
    }
}

/// Result type alias for varidelta operations.
pub type Result<T> = std::result::Result<T, VariError>;
