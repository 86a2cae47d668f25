//! File logging for harness runs.

pub mod setup;

pub use setup::{run_log_file_name, setup_file_logging};
