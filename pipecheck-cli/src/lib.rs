//! Library component for the pipecheck CLI application.
//!
//! This contains the argument definitions and command logic that the binary
//! uses, split out so they can be unit tested.

/// Command-line interface definitions using clap
pub mod cli;

/// Command implementations for each subcommand
pub mod commands;

/// Error handling utilities for the CLI
pub mod error;

/// Logging setup and helper functions
pub mod logging;

// Re-exports for convenience
pub use cli::{Cli, Commands, ExecArgs, HarnessArgs, ListArgs, RunArgs, parse_cli, parse_cli_from};
pub use commands::exec::run_exec;
pub use commands::run::run_cases;
