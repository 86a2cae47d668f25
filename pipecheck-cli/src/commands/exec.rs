//! `pipecheck exec`: one invocation, printed verbatim.

use log::debug;
use pipecheck_core::logging::format_command;
use pipecheck_core::reporting::{Reporter, ReporterError};
use pipecheck_core::{CoreError, HarnessConfig, Pipeline, Runner};
use std::path::{Path, PathBuf};

use crate::cli::ExecArgs;
use crate::error::{CliResult, EXIT_FAILURE};

/// Resolves a pipeline name against the pipelines dir; anything else is
/// taken as a path to a script.
pub fn resolve_target(target: &str, pipelines_dir: &Path) -> PathBuf {
    match target.parse::<Pipeline>() {
        Ok(pipeline) => pipeline.script_path(pipelines_dir),
        Err(_) => PathBuf::from(target),
    }
}

/// Runs the pipeline and returns the exit code `pipecheck` should use.
///
/// The pipeline's own exit code is passed through. Termination by signal,
/// a launch failure and a timeout all map to 1.
pub fn run_exec(args: &ExecArgs, config: &HarnessConfig, reporter: &dyn Reporter) -> CliResult<i32> {
    let script = resolve_target(&args.target, &config.pipelines_dir);
    debug!("Resolved '{}' to {}", args.target, script.display());

    let runner = Runner::from_config(config);
    let mut cmd = runner.command(&script, &args.args);
    let rendered = format_command(&cmd);

    match runner.run_command(&mut cmd) {
        Ok(result) => {
            reporter.invocation_complete(&rendered, &result);
            Ok(result.exit_code.unwrap_or(EXIT_FAILURE))
        }
        Err(err @ (CoreError::Launch { .. } | CoreError::Timeout { .. })) => {
            let suggestion = if err.is_launch_failure() {
                Some("Check --interpreter and --pipelines-dir".to_string())
            } else {
                Some("Raise --timeout or pass --timeout 0 to wait indefinitely".to_string())
            };
            reporter.error(&ReporterError {
                title: if err.is_launch_failure() {
                    "Launch failed".to_string()
                } else {
                    "Timed out".to_string()
                },
                message: err.to_string(),
                context: Some(rendered),
                suggestion,
            });
            Ok(EXIT_FAILURE)
        }
        Err(err) => Err(err),
    }
}
