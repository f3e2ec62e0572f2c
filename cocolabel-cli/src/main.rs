// ============================================================================
// cocolabel-cli/src/main.rs
// ============================================================================
//
// MAIN ENTRY POINT: cocolabel CLI Application
//
// This file contains the main entry point for the cocolabel CLI application.
// It parses the command line, installs the logger, selects the reporter and
// dispatches to the appropriate command handler.
//
// Exit status is 0 on success and 1 when the command fails; argument errors
// are reported by clap with its own status.

use clap::Parser;
use cocolabel_cli::{Cli, CliResult, Commands, run_filter_command, run_manifest_command, run_prepare};
use cocolabel_cli::logging::{init_console, init_file, level_for};
use cocolabel_cli::suggestion_for;
use cocolabel_core::reporting::ReporterError;
use cocolabel_core::{JsonReporter, Reporter, TerminalReporter};
use log::{debug, error};
use std::process;

fn main() {
    let cli = Cli::parse();
    let level = level_for(cli.verbose);

    match &cli.log_dir {
        Some(log_dir) => match init_file(log_dir, cli.command.name(), level) {
            Ok(path) => debug!("Logging to {}", path.display()),
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        },
        None => init_console(level),
    }

    let reporter: Box<dyn Reporter> = if cli.progress_json {
        Box::new(JsonReporter::new())
    } else {
        Box::new(TerminalReporter::new())
    };

    let command_name = cli.command.name();
    if let Err(e) = run(cli.command, reporter.as_ref()) {
        error!("{command_name} failed: {e}");
        reporter.error(&ReporterError {
            title: format!("{command_name} failed"),
            message: e.to_string(),
            suggestion: suggestion_for(&e),
        });
        if cli.progress_json {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

fn run(command: Commands, reporter: &dyn Reporter) -> CliResult<()> {
    match command {
        Commands::Prepare(args) => run_prepare(args, reporter).map(|_| ()),
        Commands::Filter(args) => run_filter_command(args, reporter).map(|_| ()),
        Commands::Manifest(args) => run_manifest_command(args, reporter).map(|_| ()),
    }
}
