//! Error types for pipecheck-core.
//!
//! Launch failures are kept apart from failures reported by a process that
//! did start: a pipeline that prints an error and exits non-zero is a normal
//! `InvocationResult`, not a `CoreError::Launch`.

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::expectation::Stream;

/// Custom error types for pipecheck
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to launch '{}': {source}", program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error waiting for '{}': {source}", program.display())]
    Wait {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}' timed out after {} seconds", program.display(), timeout.as_secs())]
    Timeout { program: PathBuf, timeout: Duration },

    #[error("{case}: expected {stream} to contain {expected}, got: {excerpt}")]
    ExpectationMismatch {
        case: String,
        stream: Stream,
        expected: String,
        excerpt: String,
    },

    #[error("{case}: expected {expected} exit status, got {actual}")]
    UnexpectedExitStatus {
        case: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("{0}")]
    OperationFailed(String),
}

impl CoreError {
    /// True for errors raised before the process could run.
    pub fn is_launch_failure(&self) -> bool {
        matches!(self, CoreError::Launch { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, CoreError::Timeout { .. })
    }
}

/// Result type for pipecheck operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds a launch error for `program`.
pub fn command_start_error(program: &Path, source: std::io::Error) -> CoreError {
    CoreError::Launch {
        program: program.to_path_buf(),
        source,
    }
}

/// Builds a wait error for `program`.
pub fn command_wait_error(program: &Path, source: std::io::Error) -> CoreError {
    CoreError::Wait {
        program: program.to_path_buf(),
        source,
    }
}
