//! Core library for checking how external video pipelines handle bad input.
//!
//! The crate launches pipeline executables as subprocesses, captures their
//! stdout and stderr, and classifies each run against an expected diagnostic
//! substring. It owns none of the pipelines' behavior; they are opaque
//! programs invoked by path.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use pipecheck_core::{HarnessConfig, Runner, default_cases, run_suite};
//! use pipecheck_core::reporting::TerminalReporter;
//!
//! let config = HarnessConfig::default();
//! config.validate().unwrap();
//!
//! let runner = Runner::from_config(&config);
//! let summary = run_suite(&runner, &default_cases(&config), &TerminalReporter::new());
//! assert!(summary.is_success());
//! ```
//!
//! A single invocation without any timeout:
//!
//! ```rust,no_run
//! let result = pipecheck_core::run("detection.py", ["--input", "invalid_path.mp4"]).unwrap();
//! assert!(result.stdout.contains("No such file"));
//! ```

pub mod config;
pub mod error;
pub mod expectation;
pub mod file_logging;
pub mod logging;
pub mod pipeline;
pub mod reporting;
pub mod runner;
pub mod suite;

// Re-exports for public API
pub use config::HarnessConfig;
pub use error::{CoreError, CoreResult};
pub use expectation::{ExitExpectation, Expectation, Stream};
pub use pipeline::Pipeline;
pub use runner::{InvocationResult, Runner, run};
pub use suite::{
    CaseOutcome, CaseStatus, EdgeCase, SuiteSummary, TestCase, default_cases, filter_cases,
    run_case, run_suite,
};
