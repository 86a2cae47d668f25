//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

pub mod exec;
pub mod list;
pub mod run;

use log::debug;
use pipecheck_core::HarnessConfig;
use std::path::Path;

use crate::cli::HarnessArgs;
use crate::error::{CliErrorContext, CliResult};

/// Builds the effective config: defaults, then the config file, then flags.
pub fn resolve_config(
    config_file: Option<&Path>,
    harness: &HarnessArgs,
    resources_dir: Option<&Path>,
) -> CliResult<HarnessConfig> {
    let mut config = match config_file {
        Some(path) => HarnessConfig::load_from_file(path)
            .cli_context(format!("Loading config file {}", path.display()))?,
        None => HarnessConfig::default(),
    };

    harness.apply(&mut config);
    if let Some(dir) = resources_dir {
        config.resources_dir = dir.to_path_buf();
    }

    config.validate()?;
    debug!("Effective harness config: {:?}", config);
    Ok(config)
}
