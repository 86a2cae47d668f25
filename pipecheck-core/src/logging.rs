//! Logging helpers shared by the runner and the suite.
//!
//! The crate logs through the `log` facade only; the binary decides where the
//! records go (console via fern, or a file via `file_logging`).

use log::debug;
use std::path::Path;
use std::process::Command;

use crate::runner::InvocationResult;

/// Renders a command line the way it is logged and reported.
pub fn format_command(cmd: &Command) -> String {
    let program = cmd.get_program().to_string_lossy();
    let args: Vec<_> = cmd.get_args().map(|arg| arg.to_string_lossy()).collect();

    if args.is_empty() {
        program.into_owned()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

/// Log a command being executed
pub fn log_command(cmd: &Command) {
    debug!("Executing command: {}", format_command(cmd));
}

/// Log the termination of a command
pub fn log_exit(program: &Path, result: &InvocationResult) {
    debug!(
        "Command '{}' finished with {} after {:.2}s",
        program.display(),
        result.describe_exit(),
        result.duration.as_secs_f64()
    );
}

/// Shortens captured output for error messages and reports.
///
/// Keeps the tail of the text, which is where pipelines print their final
/// diagnostic.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    let count = trimmed.chars().count();
    if count <= max_chars {
        return trimmed.to_string();
    }

    let tail: String = trimmed.chars().skip(count - max_chars).collect();
    format!("...{}", tail)
}
