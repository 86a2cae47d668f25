// ============================================================================
// pipecheck-cli/src/logging.rs
// ============================================================================
//
// LOGGING UTILITIES: console logger setup and timestamps
//
// Console records go to stderr so that stdout stays reserved for the report
// (and stays valid JSON with --json). When a log directory is given, the
// file logger from pipecheck-core is installed instead.

use log::LevelFilter;
use std::path::{Path, PathBuf};

use pipecheck_core::CoreError;
use pipecheck_core::file_logging::setup_file_logging;

use crate::error::CliResult;

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Console level: warnings only unless verbose, since the reporter already
/// prints per-case results.
pub fn console_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

/// File level: the log file keeps per-case info records.
pub fn file_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

pub fn init_console_logging(level: LevelFilter) -> CliResult<()> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
        .map_err(|e| CoreError::OperationFailed(format!("Failed to initialize logging: {}", e)))
}

/// Installs file logging into `log_dir` and returns the log file path.
pub fn init_file_logging(log_dir: &Path, level: LevelFilter) -> CliResult<PathBuf> {
    setup_file_logging(log_dir, &get_timestamp(), level).map_err(|e| {
        CoreError::OperationFailed(format!(
            "Failed to set up file logging in {}: {:#}",
            log_dir.display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_format() {
        let ts = get_timestamp();
        assert_eq!(ts.len(), 15);
        assert_eq!(&ts[8..9], "_");
        assert!(ts.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_levels() {
        assert_eq!(console_level(false), LevelFilter::Warn);
        assert_eq!(console_level(true), LevelFilter::Debug);
        assert_eq!(file_level(false), LevelFilter::Info);
    }
}
