// ============================================================================
// pipecheck-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Error types and utilities for the CLI
//
// KEY COMPONENTS:
// - CliResult: Type alias for CLI operations
// - CliErrorContext: context helpers that keep errors as CoreError
// - Exit codes shared by main and the commands

use pipecheck_core::{CoreError, CoreResult};
use std::fmt;

/// Every case passed, or `exec` ran a pipeline that exited 0.
pub const EXIT_SUCCESS: i32 = 0;

/// A case failed, timed out or could not be launched.
pub const EXIT_FAILURE: i32 = 1;

/// Bad configuration or usage (matches clap's own usage exit code).
pub const EXIT_USAGE: i32 = 2;

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

/// Extension trait for adding context to errors in the CLI.
///
/// Configuration and I/O errors keep their variant so `exit_code_for` can
/// still classify them after context is added.
pub trait CliErrorContext<T> {
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: Into<CoreError>,
{
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.map_err(|e| match e.into() {
            CoreError::Config(msg) => CoreError::Config(format!("{}: {}", context, msg)),
            CoreError::JsonParse(msg) => CoreError::JsonParse(format!("{}: {}", context, msg)),
            other => CoreError::OperationFailed(format!("{}: {}", context, other)),
        })
    }
}

/// Maps an error that aborted a command to the process exit code.
pub fn exit_code_for(error: &CoreError) -> i32 {
    match error {
        CoreError::Config(_) | CoreError::JsonParse(_) => EXIT_USAGE,
        _ => EXIT_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_keeps_config_variant() {
        let result: CoreResult<()> = Err(CoreError::Config("timeout must be set".to_string()));
        let err = result.cli_context("Loading pipecheck.json").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
        assert_eq!(
            err.to_string(),
            "Invalid configuration: Loading pipecheck.json: timeout must be set"
        );
        assert_eq!(exit_code_for(&err), EXIT_USAGE);
    }

    #[test]
    fn test_context_wraps_other_errors() {
        let result: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        let err = result.cli_context("Writing report").unwrap_err();
        assert!(matches!(err, CoreError::OperationFailed(_)));
        assert_eq!(exit_code_for(&err), EXIT_FAILURE);
    }
}
