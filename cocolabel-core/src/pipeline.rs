// ============================================================================
// cocolabel-core/src/pipeline.rs
// ============================================================================
//
// PIPELINE: Dataset Preparation Orchestration
//
// This module coordinates a preparation run, from making sure the COCO
// download is present to publishing the training manifest. The individual
// stages are also exposed on their own so the CLI can run just the filter or
// just the manifest builder against arbitrary files.
//
// WORKFLOW:
// 1. Validate the configuration
// 2. Check the dataset layout and fetch missing archives
// 3. Load the source instances file
// 4. Filter by category and write the filtered dataset
// 5. Build the manifest and write it next to the dataset
// 6. Upload the manifest when an object store is available

// ---- Internal crate imports ----
use crate::config::ConversionConfig;
use crate::dataset::CocoDataset;
use crate::error::{CoreError, CoreResult};
use crate::fetch::{COCO_TRAIN2017_ARCHIVES, Fetcher, ensure_dataset};
use crate::filter::{CocoFilter, FilterOutcome, FilterStats, MissingCategoryPolicy};
use crate::io::{OutputPolicy, load_dataset, prepare_output, write_dataset, write_manifest};
use crate::layout::{DatasetLayout, expand_home};
use crate::manifest::{ManifestSettings, build_manifest};
use crate::reporting::{
    DatasetSummary, FilterSummary, ManifestSummary, PublishSummary, Reporter, StageProgress,
};
use crate::storage::ObjectStore;

// ---- External crate imports ----
use log::{info, warn};

// ---- Standard library imports ----
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Result of a complete preparation run.
#[derive(Debug, Clone)]
pub struct PrepareSummary {
    pub filtered_path: PathBuf,
    pub manifest_path: PathBuf,
    /// Bucket location the manifest belongs at.
    pub manifest_uri: String,
    /// Location reported by the object store, when one was used.
    pub stored_uri: Option<String>,
    /// `(original id, new id)` pairs.
    pub category_map: Vec<(i64, i64)>,
    pub missing_categories: Vec<String>,
    pub manifest_lines: usize,
    pub stats: FilterStats,
}

/// Result of writing a manifest file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestReport {
    pub lines: usize,
    pub annotations: usize,
}

fn stage(reporter: &dyn Reporter, stage: &str, message: impl Into<String>) {
    let message = message.into();
    info!("[{stage}] {message}");
    reporter.stage_progress(&StageProgress {
        stage: stage.to_string(),
        message,
    });
}

fn load_with_progress(path: &Path, label: &str, reporter: &dyn Reporter) -> CoreResult<CocoDataset> {
    reporter.activity_started(&format!("Loading {}", path.display()));
    let loaded = load_dataset(path);
    reporter.activity_finished();
    let dataset = loaded?;

    reporter.dataset_loaded(&DatasetSummary {
        label: label.to_string(),
        path: path.display().to_string(),
        counts: dataset.counts(),
    });
    Ok(dataset)
}

// ============================================================================
// INDIVIDUAL STAGES
// ============================================================================

/// Filters `dataset` and writes the result to `output`.
///
/// Requested names missing from the source are reported as a warning before
/// the filtered dataset is written.
pub fn filter_to_file<S: AsRef<str>>(
    dataset: &CocoDataset,
    categories: &[S],
    missing_policy: MissingCategoryPolicy,
    output: &Path,
    output_policy: OutputPolicy,
    reporter: &dyn Reporter,
) -> CoreResult<FilterOutcome> {
    stage(
        reporter,
        "filter",
        format!("Selecting {} categories", categories.len()),
    );
    let outcome = CocoFilter::new(dataset).filter(categories, missing_policy)?;

    if !outcome.missing_categories.is_empty() {
        reporter.warning(&format!(
            "Categories not found in dataset, continuing without them: {}",
            outcome.missing_categories.join(", ")
        ));
    }
    reporter.filter_complete(&FilterSummary {
        requested: categories.iter().map(|c| c.as_ref().to_string()).collect(),
        missing: outcome.missing_categories.clone(),
        category_map: outcome.category_map.clone(),
        stats: outcome.stats.clone(),
    });

    write_dataset(output, &outcome.dataset, output_policy)?;
    reporter.dataset_loaded(&DatasetSummary {
        label: "Filtered dataset".to_string(),
        path: output.display().to_string(),
        counts: outcome.stats.after,
    });
    Ok(outcome)
}

/// Builds the manifest for a filtered dataset and writes it to `output`.
pub fn manifest_to_file(
    dataset: &CocoDataset,
    settings: &ManifestSettings,
    output: &Path,
    output_policy: OutputPolicy,
    reporter: &dyn Reporter,
) -> CoreResult<ManifestReport> {
    stage(
        reporter,
        "manifest",
        format!("Building manifest lines for {} images", dataset.images.len()),
    );
    let lines = build_manifest(dataset, settings)?;
    let written = write_manifest(output, &lines, &settings.label_key, output_policy)?;
    let report = ManifestReport {
        lines: written,
        annotations: dataset.annotations.len(),
    };

    reporter.manifest_written(&ManifestSummary {
        path: output.display().to_string(),
        lines: report.lines,
        annotations: report.annotations,
    });
    Ok(report)
}

/// Loads a dataset from `input`, filters it and writes the result to `output`.
pub fn run_filter<S: AsRef<str>>(
    input: &Path,
    output: &Path,
    categories: &[S],
    missing_policy: MissingCategoryPolicy,
    output_policy: OutputPolicy,
    reporter: &dyn Reporter,
) -> CoreResult<FilterOutcome> {
    if categories.is_empty() {
        return Err(CoreError::Config(
            "at least one category is required".to_string(),
        ));
    }
    let dataset = load_with_progress(input, "Source dataset", reporter)?;
    filter_to_file(
        &dataset,
        categories,
        missing_policy,
        output,
        output_policy,
        reporter,
    )
}

/// Loads a filtered dataset from `input` and writes its manifest to `output`.
pub fn run_manifest(
    input: &Path,
    output: &Path,
    settings: &ManifestSettings,
    output_policy: OutputPolicy,
    reporter: &dyn Reporter,
) -> CoreResult<ManifestReport> {
    settings.validate()?;
    let dataset = load_with_progress(input, "Filtered dataset", reporter)?;
    manifest_to_file(&dataset, settings, output, output_policy, reporter)
}

// ============================================================================
// FULL PREPARATION RUN
// ============================================================================

/// Runs a full preparation: fetch, filter, build manifest and publish.
///
/// The dataset is fetched only when `config.download` is set and the layout
/// is incomplete; `fetcher` must be provided in that case. Without an object
/// store the manifest stays local and the summary carries the bucket URI it
/// belongs at.
///
/// # Errors
///
/// * `CoreError::Config` if the configuration is invalid
/// * `CoreError::InputNotFound` if the source annotations are absent and
///   downloading is disabled
/// * `CoreError::UnknownCategories` under `MissingCategoryPolicy::Abort`
/// * `CoreError::OutputExists` if an output exists under `OutputPolicy::Fail`
pub fn prepare(
    config: &ConversionConfig,
    fetcher: Option<&dyn Fetcher>,
    store: Option<&dyn ObjectStore>,
    reporter: &dyn Reporter,
) -> CoreResult<PrepareSummary> {
    config.validate()?;
    let start_time = Instant::now();
    let layout = DatasetLayout::new(expand_home(&config.dataset_dir));

    stage(
        reporter,
        "dataset",
        format!("Checking dataset at {}", layout.root().display()),
    );
    if !layout.is_complete() {
        match (config.download, fetcher) {
            (true, Some(fetcher)) => {
                reporter.activity_started("Fetching COCO train2017 archives");
                let fetched = ensure_dataset(
                    &layout,
                    COCO_TRAIN2017_ARCHIVES,
                    fetcher,
                    config.overwrite_archives,
                );
                reporter.activity_finished();
                fetched?;
            }
            (true, None) => {
                return Err(CoreError::Config(
                    "dataset is incomplete and no fetcher is available".to_string(),
                ));
            }
            (false, _) => {
                warn!(
                    "Dataset layout at {} is incomplete and downloading is disabled",
                    layout.root().display()
                );
            }
        }
    }

    let instances = layout.instances_file();
    if !instances.is_file() {
        return Err(CoreError::InputNotFound(instances));
    }

    // Both outputs are checked up front so a refused manifest never leaves a
    // filtered dataset behind.
    let filtered_path = layout.filtered_file(&config.categories);
    let manifest_path = layout.manifest_file(&config.manifest_file_name);
    prepare_output(&filtered_path, config.output_policy)?;
    prepare_output(&manifest_path, config.output_policy)?;

    let source = load_with_progress(&instances, "Source dataset", reporter)?;
    let outcome = filter_to_file(
        &source,
        &config.categories,
        config.missing_category_policy,
        &filtered_path,
        config.output_policy,
        reporter,
    )?;
    drop(source);

    let report = manifest_to_file(
        &outcome.dataset,
        &config.manifest_settings(),
        &manifest_path,
        config.output_policy,
        reporter,
    )?;

    let manifest_uri = config.manifest_uri();
    let stored_uri = match store {
        Some(store) => {
            stage(reporter, "publish", format!("Uploading manifest to {manifest_uri}"));
            Some(store.upload(&manifest_path, &config.manifest_key())?)
        }
        None => None,
    };
    reporter.publish_complete(&PublishSummary {
        manifest_uri: manifest_uri.clone(),
        stored_uri: stored_uri.clone(),
        image_sync_command: format!(
            "aws s3 sync {} {}",
            layout.train_images_dir().display(),
            config.storage_base_path()
        ),
    });

    info!(
        "Preparation of '{}' finished in {:.1}s",
        config.selection_name(),
        start_time.elapsed().as_secs_f64()
    );
    reporter.operation_complete(&format!(
        "Prepared {} manifest lines for '{}'",
        report.lines,
        config.selection_name()
    ));

    Ok(PrepareSummary {
        filtered_path,
        manifest_path,
        manifest_uri,
        stored_uri,
        category_map: outcome.category_map,
        missing_categories: outcome.missing_categories,
        manifest_lines: report.lines,
        stats: outcome.stats,
    })
}
