//! Main entry point for the pipecheck CLI application.
//!
//! This handles command-line argument parsing, logging setup, and dispatching
//! to the appropriate command handlers. The process exit code reflects the
//! outcome: 0 when everything passed, 1 on any failing case, 2 on bad usage.

use pipecheck::commands::list::{list_cases, render_cases};
use pipecheck::commands::{resolve_config, run};
use pipecheck::error::{CliResult, EXIT_SUCCESS, exit_code_for};
use pipecheck::logging::{console_level, file_level, init_console_logging, init_file_logging};
use pipecheck::{Cli, Commands, parse_cli, run_cases, run_exec};
use pipecheck_core::reporting::{JsonReporter, Reporter, TerminalReporter};
use std::process;

fn main() {
    let cli = parse_cli();

    let code = match dispatch(cli) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            exit_code_for(&e)
        }
    };
    process::exit(code);
}

fn reporter(json: bool) -> Box<dyn Reporter> {
    if json {
        Box::new(JsonReporter::new())
    } else {
        Box::new(TerminalReporter::new())
    }
}

fn dispatch(cli: Cli) -> CliResult<i32> {
    let config_file = cli.config.as_deref();

    match &cli.command {
        Commands::Run(args) => {
            match &args.log_dir {
                Some(log_dir) => {
                    let log_file = init_file_logging(log_dir, file_level(cli.verbose))?;
                    log::info!("pipecheck {} starting", env!("CARGO_PKG_VERSION"));
                    log::info!("Logging to {}", log_file.display());
                }
                None => init_console_logging(console_level(cli.verbose))?,
            }

            let config = resolve_config(config_file, &args.harness, args.resources_dir.as_deref())?;
            let reporter = reporter(args.json);
            let summary = run_cases(args, &config, reporter.as_ref())?;
            Ok(run::exit_code(&summary))
        }
        Commands::Exec(args) => {
            init_console_logging(console_level(cli.verbose))?;
            let config = resolve_config(config_file, &args.harness, None)?;
            let reporter = reporter(args.json);
            run_exec(args, &config, reporter.as_ref())
        }
        Commands::List(args) => {
            init_console_logging(console_level(cli.verbose))?;
            let config = resolve_config(config_file, &Default::default(), None)?;
            let cases = list_cases(args, &config);
            println!("{}", render_cases(&cases, args.json)?);
            Ok(EXIT_SUCCESS)
        }
    }
}
