//! Implementation of the 'prepare' subcommand.
//!
//! This module maps the command-line arguments onto a `ConversionConfig` and
//! delegates the run to `cocolabel_core::prepare`.

use crate::cli::PrepareArgs;
use crate::commands::{missing_policy, output_policy};
use crate::error::{CliErrorContext, CliResult};

use cocolabel_core::fetch::Fetcher;
use cocolabel_core::storage::ObjectStore;
use cocolabel_core::{
    ConversionConfig, ConversionConfigBuilder, HttpFetcher, LocalObjectStore, PrepareSummary,
    Reporter,
};

use log::{debug, info};

/// Creates and validates the core configuration from CLI arguments.
pub fn create_config(args: &PrepareArgs) -> CliResult<ConversionConfig> {
    let mut builder = ConversionConfigBuilder::new()
        .dataset_dir(args.download_dir.clone())
        .categories(args.categories.iter().cloned())
        .bucket(&args.bucket)
        .label_key(&args.label_key)
        .manifest_file_name(&args.manifest_name)
        .missing_category_policy(missing_policy(args.allow_missing))
        .output_policy(output_policy(args.force))
        .skip_download(args.no_download)
        .overwrite_archives(args.overwrite);
    if let Some(job_name) = &args.job_name {
        builder = builder.job_name(job_name);
    }
    builder.build()
}

/// Executes the prepare command.
pub fn run_prepare(args: PrepareArgs, reporter: &dyn Reporter) -> CliResult<PrepareSummary> {
    let config = create_config(&args)?;
    debug!("Prepare configuration: {config:?}");
    info!(
        "Preparing '{}' from {} for bucket '{}'",
        config.selection_name(),
        config.dataset_dir.display(),
        config.bucket
    );

    let fetcher = if config.download {
        Some(HttpFetcher::new().cli_context("Failed to create download client")?)
    } else {
        None
    };
    let store = args.publish_dir.as_ref().map(LocalObjectStore::new);

    cocolabel_core::prepare(
        &config,
        fetcher.as_ref().map(|f| f as &dyn Fetcher),
        store.as_ref().map(|s| s as &dyn ObjectStore),
        reporter,
    )
}
