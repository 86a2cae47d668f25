//! `pipecheck run`: execute the built-in edge-case suite.

use log::info;
use pipecheck_core::reporting::Reporter;
use pipecheck_core::{HarnessConfig, Runner, SuiteSummary, default_cases, filter_cases, run_suite};

use crate::cli::RunArgs;
use crate::error::{CliResult, EXIT_FAILURE, EXIT_SUCCESS};
use pipecheck_core::CoreError;

/// Runs the selected cases and returns the tally.
pub fn run_cases(args: &RunArgs, config: &HarnessConfig, reporter: &dyn Reporter) -> CliResult<SuiteSummary> {
    let cases = filter_cases(default_cases(config), &args.pipelines, &args.cases);
    if cases.is_empty() {
        return Err(CoreError::Config(
            "No cases match the given --pipeline/--case filters".to_string(),
        ));
    }

    if !config.pipelines_dir.is_dir() {
        reporter.warning(&format!(
            "Pipelines directory {} does not exist; every case will fail",
            config.pipelines_dir.display()
        ));
    }

    info!(
        "Running {} cases against {}",
        cases.len(),
        config.pipelines_dir.display()
    );
    let runner = Runner::from_config(config);
    Ok(run_suite(&runner, &cases, reporter))
}

pub fn exit_code(summary: &SuiteSummary) -> i32 {
    if summary.is_success() {
        EXIT_SUCCESS
    } else {
        EXIT_FAILURE
    }
}
