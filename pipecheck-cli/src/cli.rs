// ============================================================================
// pipecheck-cli/src/cli.rs
// ============================================================================
//
// COMMAND-LINE INTERFACE: Argument definitions using clap
//
// KEY COMPONENTS:
// - Cli: top-level parser with global flags
// - Commands: run / exec / list subcommands
// - HarnessArgs: flags shared by every subcommand that launches pipelines

use clap::{Args, Parser, Subcommand};
use pipecheck_core::{EdgeCase, HarnessConfig, Pipeline};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "pipecheck: edge-case checks for external video pipelines",
    long_about = "Launches detection, pose estimation, instance segmentation and face \
                  recognition pipelines with bad inputs and checks the diagnostics they print."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable detailed (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON config file with harness defaults
    #[arg(long, global = true, value_name = "FILE", env = "PIPECHECK_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the built-in edge-case suite
    Run(RunArgs),

    /// Run one pipeline once with arbitrary arguments and show what it printed
    Exec(ExecArgs),

    /// List the cases the suite would run
    List(ListArgs),
}

/// Flags that control how pipelines are launched.
#[derive(Args, Debug, Clone, Default)]
pub struct HarnessArgs {
    /// Directory containing the pipeline scripts
    #[arg(long, value_name = "DIR", env = "PIPECHECK_PIPELINES_DIR")]
    pub pipelines_dir: Option<PathBuf>,

    /// Program used to launch the scripts (default: python)
    #[arg(long, value_name = "PROG", env = "PIPECHECK_INTERPRETER")]
    pub interpreter: Option<PathBuf>,

    /// Execute the scripts directly instead of through an interpreter
    #[arg(long)]
    pub no_interpreter: bool,

    /// Per-invocation timeout in seconds (0 waits indefinitely)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl HarnessArgs {
    /// Overlays the flags that were given onto `config`.
    ///
    /// `--no-interpreter` wins over `--interpreter`, including one taken from
    /// the environment.
    pub fn apply(&self, config: &mut HarnessConfig) {
        if let Some(dir) = &self.pipelines_dir {
            config.pipelines_dir = dir.clone();
        }
        if self.no_interpreter {
            config.interpreter = None;
        } else if let Some(interpreter) = &self.interpreter {
            config.interpreter = Some(interpreter.clone());
        }
        if let Some(secs) = self.timeout {
            config.timeout_secs = secs;
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub harness: HarnessArgs,

    /// Directory containing test fixtures (holds dummy_text.txt)
    #[arg(long, value_name = "DIR", env = "PIPECHECK_RESOURCES_DIR")]
    pub resources_dir: Option<PathBuf>,

    /// Only run cases for this pipeline (repeatable)
    #[arg(long = "pipeline", value_name = "NAME")]
    pub pipelines: Vec<Pipeline>,

    /// Only run this edge case (repeatable)
    #[arg(long = "case", value_name = "NAME")]
    pub cases: Vec<EdgeCase>,

    /// Emit line-delimited JSON events instead of text
    #[arg(long)]
    pub json: bool,

    /// Also write a log file into this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ExecArgs {
    #[command(flatten)]
    pub harness: HarnessArgs,

    /// Emit the result as a JSON object instead of text
    #[arg(long)]
    pub json: bool,

    /// Pipeline name (e.g. detection) or a path to any script
    #[arg(value_name = "PIPELINE")]
    pub target: String,

    /// Arguments passed to the pipeline unchanged
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<OsString>,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Only list cases for this pipeline (repeatable)
    #[arg(long = "pipeline", value_name = "NAME")]
    pub pipelines: Vec<Pipeline>,

    /// Only list this edge case (repeatable)
    #[arg(long = "case", value_name = "NAME")]
    pub cases: Vec<EdgeCase>,

    /// Emit the case list as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}

pub fn parse_cli_from<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args)
}
