use anyhow::{Context, Result};
use log::LevelFilter;
use log4rs::{
    append::file::FileAppender,
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};
use std::path::{Path, PathBuf};

/// Name of the log file for a run started at `timestamp` (`YYYYMMDD_HHMMSS`).
pub fn run_log_file_name(timestamp: &str) -> String {
    format!("pipecheck_run_{}.log", timestamp)
}

/// Routes all `log` records at or above `log_level` to a file in `log_dir`.
///
/// Returns the path of the created log file.
pub fn setup_file_logging(log_dir: &Path, timestamp: &str, log_level: LevelFilter) -> Result<PathBuf> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let log_file = log_dir.join(run_log_file_name(timestamp));

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}{n}",
        )))
        .build(&log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(file_appender)))
        .build(Root::builder().appender("file").build(log_level))?;

    log4rs::init_config(config)?;

    Ok(log_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_log_file_name() {
        assert_eq!(
            run_log_file_name("20261016_093000"),
            "pipecheck_run_20261016_093000.log"
        );
    }
}
