// ============================================================================
// cocolabel-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for ConversionConfig
//
// This module implements the builder pattern for the ConversionConfig
// structure, providing a fluent API for creating and configuring instances.
// Required fields are checked in `build`, which also runs
// `ConversionConfig::validate`.

use std::path::PathBuf;

use super::ConversionConfig;
use crate::error::{CoreError, CoreResult};
use crate::filter::MissingCategoryPolicy;
use crate::io::OutputPolicy;

/// Builder for creating ConversionConfig instances.
///
/// # Examples
///
/// ```rust
/// use cocolabel_core::config::ConversionConfigBuilder;
/// use cocolabel_core::filter::MissingCategoryPolicy;
/// use std::path::PathBuf;
///
/// let config = ConversionConfigBuilder::new()
///     .dataset_dir(PathBuf::from("/data/mscoco"))
///     .categories(["boat"])
///     .bucket("my-bucket")
///     .missing_category_policy(MissingCategoryPolicy::ProceedWithSubset)
///     .build()
///     .unwrap();
/// assert_eq!(config.selection_name(), "boat");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConversionConfigBuilder {
    // Required fields
    dataset_dir: Option<PathBuf>,
    categories: Vec<String>,
    bucket: Option<String>,

    // Optional fields
    label_key: Option<String>,
    job_name: Option<String>,
    manifest_file_name: Option<String>,
    missing_category_policy: MissingCategoryPolicy,
    output_policy: OutputPolicy,
    skip_download: bool,
    overwrite_archives: bool,
}

impl ConversionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dataset_dir(mut self, dataset_dir: PathBuf) -> Self {
        self.dataset_dir = Some(dataset_dir);
        self
    }

    /// Sets the category names to keep, replacing any set before.
    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn bucket(mut self, bucket: &str) -> Self {
        self.bucket = Some(bucket.to_string());
        self
    }

    pub fn label_key(mut self, label_key: &str) -> Self {
        self.label_key = Some(label_key.to_string());
        self
    }

    pub fn job_name(mut self, job_name: &str) -> Self {
        self.job_name = Some(job_name.to_string());
        self
    }

    pub fn manifest_file_name(mut self, name: &str) -> Self {
        self.manifest_file_name = Some(name.to_string());
        self
    }

    pub fn missing_category_policy(mut self, policy: MissingCategoryPolicy) -> Self {
        self.missing_category_policy = policy;
        self
    }

    pub fn output_policy(mut self, policy: OutputPolicy) -> Self {
        self.output_policy = policy;
        self
    }

    /// Disables fetching the dataset when its layout is incomplete.
    pub fn skip_download(mut self, skip: bool) -> Self {
        self.skip_download = skip;
        self
    }

    pub fn overwrite_archives(mut self, overwrite: bool) -> Self {
        self.overwrite_archives = overwrite;
        self
    }

    /// Builds and validates a ConversionConfig.
    ///
    /// # Errors
    ///
    /// * `CoreError::Config` if a required field is missing or invalid
    pub fn build(self) -> CoreResult<ConversionConfig> {
        let dataset_dir = self
            .dataset_dir
            .ok_or_else(|| CoreError::Config("dataset directory is required".to_string()))?;
        let bucket = self
            .bucket
            .ok_or_else(|| CoreError::Config("bucket name is required".to_string()))?;

        let mut config = ConversionConfig::new(dataset_dir, self.categories, bucket);
        if let Some(label_key) = self.label_key {
            config.label_key = label_key;
        }
        if let Some(name) = self.manifest_file_name {
            config.manifest_file_name = name;
        }
        config.job_name = self.job_name;
        config.missing_category_policy = self.missing_category_policy;
        config.output_policy = self.output_policy;
        config.download = !self.skip_download;
        config.overwrite_archives = self.overwrite_archives;

        config.validate()?;
        Ok(config)
    }
}
