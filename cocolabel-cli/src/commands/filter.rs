//! Implementation of the 'filter' subcommand.

use crate::cli::FilterArgs;
use crate::commands::{missing_policy, output_policy};
use crate::error::CliResult;

use cocolabel_core::{FilterOutcome, Reporter, run_filter};

use log::info;

/// Executes the filter command.
pub fn run_filter_command(args: FilterArgs, reporter: &dyn Reporter) -> CliResult<FilterOutcome> {
    info!(
        "Filtering {} to [{}]",
        args.input.display(),
        args.categories.join(", ")
    );
    let outcome = run_filter(
        &args.input,
        &args.output,
        &args.categories,
        missing_policy(args.allow_missing),
        output_policy(args.force),
        reporter,
    )?;
    reporter.operation_complete(&format!(
        "Wrote {} images with {} annotations to {}",
        outcome.stats.after.images,
        outcome.stats.after.annotations,
        args.output.display()
    ));
    Ok(outcome)
}
