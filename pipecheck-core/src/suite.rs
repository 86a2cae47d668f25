//! Built-in edge-case scenarios and the sequential suite driver.
//!
//! Each scenario is one pipeline invocation with crafted arguments plus one
//! expectation on its captured output. Cases run one after another; a failing
//! case never stops the suite.

use log::{debug, info, warn};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::config::HarnessConfig;
use crate::error::CoreError;
use crate::expectation::{ExitExpectation, Expectation};
use crate::pipeline::Pipeline;
use crate::reporting::{Reporter, SuiteStartInfo};
use crate::runner::{InvocationResult, Runner};

/// Substring printed by a pipeline when its input path does not exist.
pub const NO_SUCH_FILE: &str = "No such file";

/// Substring printed by a pipeline when its input is not a media stream.
pub const CANT_TYPEFIND: &str = "Can't typefind stream";

/// Substring printed by an argparse-style parser for an unknown flag.
pub const UNRECOGNIZED_ARGUMENTS: &str = "error: unrecognized arguments:";

/// Substring of the usage banner printed alongside argument errors.
pub const USAGE: &str = "usage:";

/// Flag no pipeline accepts.
pub const UNKNOWN_FLAG: &str = "--unknown_arg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeCase {
    /// `--input` points at a path that does not exist.
    InvalidVideoInput,
    /// `--input` points at a plain text file.
    UnsupportedFormat,
    /// An unrecognized flag is passed.
    InvalidCommandArguments,
}

impl EdgeCase {
    pub const ALL: [EdgeCase; 3] = [
        EdgeCase::InvalidVideoInput,
        EdgeCase::UnsupportedFormat,
        EdgeCase::InvalidCommandArguments,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            EdgeCase::InvalidVideoInput => "invalid_video_input",
            EdgeCase::UnsupportedFormat => "unsupported_format",
            EdgeCase::InvalidCommandArguments => "invalid_command_arguments",
        }
    }

    /// Pipelines this scenario is exercised against.
    pub fn pipelines(self) -> &'static [Pipeline] {
        match self {
            EdgeCase::InvalidVideoInput | EdgeCase::UnsupportedFormat => &[Pipeline::Detection],
            EdgeCase::InvalidCommandArguments => &Pipeline::ALL,
        }
    }

    fn args(self, config: &HarnessConfig) -> Vec<String> {
        match self {
            EdgeCase::InvalidVideoInput => vec![
                "--input".to_string(),
                config.invalid_input_path.to_string_lossy().into_owned(),
            ],
            EdgeCase::UnsupportedFormat => vec![
                "--input".to_string(),
                config.unsupported_input_path().to_string_lossy().into_owned(),
            ],
            EdgeCase::InvalidCommandArguments => vec![UNKNOWN_FLAG.to_string()],
        }
    }

    fn expectation(self) -> Expectation {
        match self {
            EdgeCase::InvalidVideoInput => Expectation::stdout_contains(NO_SUCH_FILE),
            EdgeCase::UnsupportedFormat => Expectation::stdout_contains(CANT_TYPEFIND),
            EdgeCase::InvalidCommandArguments => {
                Expectation::stderr_contains_any([UNRECOGNIZED_ARGUMENTS, USAGE])
                    .with_exit(ExitExpectation::Failure)
            }
        }
    }
}

impl fmt::Display for EdgeCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeCase {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        EdgeCase::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| {
                CoreError::Config(format!(
                    "Unknown case '{}'. Expected one of: invalid_video_input, unsupported_format, invalid_command_arguments",
                    s
                ))
            })
    }
}

/// One invocation plus one expectation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCase {
    /// `<edge case>[<pipeline>]`, e.g. `invalid_command_arguments[pose_estimation]`.
    pub name: String,
    pub edge_case: EdgeCase,
    pub pipeline: Pipeline,
    pub script: PathBuf,
    pub args: Vec<String>,
    pub expectation: Expectation,
}

impl TestCase {
    pub fn new(edge_case: EdgeCase, pipeline: Pipeline, config: &HarnessConfig) -> Self {
        Self {
            name: format!("{}[{}]", edge_case, pipeline),
            edge_case,
            pipeline,
            script: pipeline.script_path(&config.pipelines_dir),
            args: edge_case.args(config),
            expectation: edge_case.expectation(),
        }
    }
}

/// Builds every built-in case in declaration order.
pub fn default_cases(config: &HarnessConfig) -> Vec<TestCase> {
    EdgeCase::ALL
        .into_iter()
        .flat_map(|edge_case| {
            edge_case
                .pipelines()
                .iter()
                .map(move |&pipeline| TestCase::new(edge_case, pipeline, config))
        })
        .collect()
}

/// Keeps cases matching the filters. An empty filter matches everything.
pub fn filter_cases(cases: Vec<TestCase>, pipelines: &[Pipeline], edge_cases: &[EdgeCase]) -> Vec<TestCase> {
    cases
        .into_iter()
        .filter(|c| pipelines.is_empty() || pipelines.contains(&c.pipeline))
        .filter(|c| edge_cases.is_empty() || edge_cases.contains(&c.edge_case))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaseStatus {
    Passed,
    /// The pipeline ran but its output or exit status did not match.
    Failed { reason: String },
    /// The pipeline could not be started at all.
    LaunchFailed { reason: String },
    /// The pipeline was killed after exceeding the timeout.
    TimedOut { reason: String },
}

impl CaseStatus {
    pub fn is_passed(&self) -> bool {
        matches!(self, CaseStatus::Passed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            CaseStatus::Passed => "passed",
            CaseStatus::Failed { .. } => "failed",
            CaseStatus::LaunchFailed { .. } => "launch failed",
            CaseStatus::TimedOut { .. } => "timed out",
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            CaseStatus::Passed => None,
            CaseStatus::Failed { reason }
            | CaseStatus::LaunchFailed { reason }
            | CaseStatus::TimedOut { reason } => Some(reason),
        }
    }

    fn from_error(err: &CoreError) -> Self {
        let reason = err.to_string();
        if err.is_launch_failure() {
            CaseStatus::LaunchFailed { reason }
        } else if err.is_timeout() {
            CaseStatus::TimedOut { reason }
        } else {
            CaseStatus::Failed { reason }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseOutcome {
    pub name: String,
    pub pipeline: Pipeline,
    #[serde(flatten)]
    pub status: CaseStatus,
    /// Captured output; absent when the process never ran to completion.
    pub result: Option<InvocationResult>,
}

/// Runs one case and classifies the result.
pub fn run_case(runner: &Runner, case: &TestCase) -> CaseOutcome {
    debug!("Running case {}", case.name);

    let (status, result) = match runner.run(&case.script, &case.args) {
        Ok(result) => {
            let status = match case.expectation.check(&case.name, &result) {
                Ok(()) => CaseStatus::Passed,
                Err(err) => CaseStatus::from_error(&err),
            };
            (status, Some(result))
        }
        Err(err) => (CaseStatus::from_error(&err), None),
    };

    match &status {
        CaseStatus::Passed => info!("{}: passed", case.name),
        other => warn!(
            "{}: {} ({})",
            case.name,
            other.label(),
            other.reason().unwrap_or_default()
        ),
    }

    CaseOutcome {
        name: case.name.clone(),
        pipeline: case.pipeline,
        status,
        result,
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SuiteSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub launch_failures: usize,
    pub timeouts: usize,
    #[serde(serialize_with = "serialize_secs")]
    pub duration: Duration,
    pub outcomes: Vec<CaseOutcome>,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

impl SuiteSummary {
    fn record(&mut self, outcome: CaseOutcome) {
        self.total += 1;
        match outcome.status {
            CaseStatus::Passed => self.passed += 1,
            CaseStatus::Failed { .. } => self.failed += 1,
            CaseStatus::LaunchFailed { .. } => self.launch_failures += 1,
            CaseStatus::TimedOut { .. } => self.timeouts += 1,
        }
        self.outcomes.push(outcome);
    }

    /// True when every case passed.
    pub fn is_success(&self) -> bool {
        self.passed == self.total
    }
}

/// Runs `cases` sequentially, reporting each one, and returns the tally.
pub fn run_suite(runner: &Runner, cases: &[TestCase], reporter: &dyn Reporter) -> SuiteSummary {
    let started = Instant::now();
    reporter.suite_started(&SuiteStartInfo {
        total_cases: cases.len(),
        interpreter: runner
            .interpreter()
            .map(|p| p.to_string_lossy().into_owned()),
        timeout: runner.timeout(),
    });

    let mut summary = SuiteSummary::default();
    for (index, case) in cases.iter().enumerate() {
        reporter.case_started(case, index + 1, cases.len());
        let outcome = run_case(runner, case);
        reporter.case_finished(&outcome);
        summary.record(outcome);
    }
    summary.duration = started.elapsed();

    info!(
        "Suite finished: {} of {} passed ({} failed, {} launch failures, {} timeouts)",
        summary.passed, summary.total, summary.failed, summary.launch_failures, summary.timeouts
    );
    reporter.suite_complete(&summary);
    summary
}
