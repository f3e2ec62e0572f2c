//! Implementation of the 'manifest' subcommand.
//!
//! The input must already be filtered: every annotation has to reference an
//! image and a category of the same file.

use crate::cli::ManifestArgs;
use crate::commands::output_policy;
use crate::error::CliResult;

use cocolabel_core::{ManifestReport, ManifestSettings, Reporter, run_manifest};

use log::info;

/// Executes the manifest command.
pub fn run_manifest_command(args: ManifestArgs, reporter: &dyn Reporter) -> CliResult<ManifestReport> {
    let settings = ManifestSettings {
        label_key: args.label_key,
        job_name: args.job_name,
        storage_base_path: args.base_path,
    };
    info!(
        "Building manifest for {} with base path {}",
        args.input.display(),
        settings.storage_base_path
    );
    let report = run_manifest(
        &args.input,
        &args.output,
        &settings,
        output_policy(args.force),
        reporter,
    )?;
    reporter.operation_complete(&format!(
        "Wrote {} manifest lines to {}",
        report.lines,
        args.output.display()
    ));
    Ok(report)
}
