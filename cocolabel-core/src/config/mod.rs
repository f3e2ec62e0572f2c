//! Configuration structures and constants for the cocolabel-core library.
//!
//! This module provides the configuration for a full dataset preparation run:
//! where the dataset lives, which categories to keep, where the manifest is
//! headed and how to resolve conflicts without prompting the operator.

mod builder;

use std::path::PathBuf;

pub use builder::ConversionConfigBuilder;

use crate::error::{CoreError, CoreResult};
use crate::filter::MissingCategoryPolicy;
use crate::io::OutputPolicy;
use crate::manifest::{ManifestSettings, validate_label_key};

// Default constants

/// Default label attribute key used in manifest lines.
pub const DEFAULT_LABEL_KEY: &str = "bounding-box";

/// Default file name of the generated manifest.
pub const DEFAULT_MANIFEST_FILE_NAME: &str = "custom_labels.manifest";

/// Default directory for the downloaded dataset.
pub const DEFAULT_DOWNLOAD_DIR: &str = "~/mscoco/";

/// Prefix of the generated job name; the category selection is appended.
pub const JOB_NAME_PREFIX: &str = "Custom Labels job name for ";

/// Main configuration structure for a dataset preparation run.
///
/// Only the dataset directory, the category selection and the bucket are
/// required; everything else has a default. Names derived from the selection
/// (job name, object keys, storage paths) are computed on demand.
///
/// # Examples
///
/// ```rust
/// use cocolabel_core::config::ConversionConfig;
/// use std::path::PathBuf;
///
/// let config = ConversionConfig::new(
///     PathBuf::from("/data/mscoco"),
///     vec!["boat".to_string()],
///     "my-bucket",
/// );
/// assert_eq!(config.storage_base_path(), "s3://my-bucket/boat/images/");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionConfig {
    /// Root of the COCO download (contains `annotations/` and `train2017/`)
    pub dataset_dir: PathBuf,

    /// Category names to keep, in request order
    pub categories: Vec<String>,

    /// Destination bucket for images and manifest
    pub bucket: String,

    /// Label attribute key for manifest lines
    pub label_key: String,

    /// Overrides the generated job name
    pub job_name: Option<String>,

    /// File name of the manifest written into `dataset_dir`
    pub manifest_file_name: String,

    pub missing_category_policy: MissingCategoryPolicy,

    /// Applies to both the filtered dataset and the manifest
    pub output_policy: OutputPolicy,

    /// Fetch the dataset when the directory layout is incomplete
    pub download: bool,

    /// Re-download archives even when a verified copy is present
    pub overwrite_archives: bool,
}

impl ConversionConfig {
    /// Creates a configuration with default settings for everything optional.
    pub fn new(dataset_dir: PathBuf, categories: Vec<String>, bucket: impl Into<String>) -> Self {
        Self {
            dataset_dir,
            categories,
            bucket: bucket.into(),
            label_key: DEFAULT_LABEL_KEY.to_string(),
            job_name: None,
            manifest_file_name: DEFAULT_MANIFEST_FILE_NAME.to_string(),
            missing_category_policy: MissingCategoryPolicy::default(),
            output_policy: OutputPolicy::default(),
            download: true,
            overwrite_archives: false,
        }
    }

    /// Checks that the configuration can drive a run.
    pub fn validate(&self) -> CoreResult<()> {
        if self.categories.is_empty() {
            return Err(CoreError::Config(
                "at least one category is required".to_string(),
            ));
        }
        if let Some(blank) = self.categories.iter().find(|name| name.trim().is_empty()) {
            return Err(CoreError::Config(format!(
                "category names must not be blank, got '{blank}'"
            )));
        }
        // The selection name becomes a file name and a bucket key segment.
        if let Some(bad) = self
            .categories
            .iter()
            .find(|name| name.contains(['/', '\\']) || matches!(name.as_str(), "." | ".."))
        {
            return Err(CoreError::Config(format!(
                "category names must be plain names without path separators, got '{bad}'"
            )));
        }
        if self.bucket.trim().is_empty() {
            return Err(CoreError::Config("bucket name is required".to_string()));
        }
        if self.bucket.contains('/') {
            return Err(CoreError::Config(format!(
                "bucket name must not contain '/', got '{}'",
                self.bucket
            )));
        }
        validate_label_key(&self.label_key)?;
        if self.manifest_file_name.trim().is_empty() {
            return Err(CoreError::Config(
                "manifest file name must not be empty".to_string(),
            ));
        }
        if self.manifest_file_name.contains(['/', '\\'])
            || matches!(self.manifest_file_name.as_str(), "." | "..")
        {
            return Err(CoreError::Config(format!(
                "manifest file name must be a plain file name, got '{}'",
                self.manifest_file_name
            )));
        }
        Ok(())
    }

    /// Name of the category selection: the requested names concatenated.
    pub fn selection_name(&self) -> String {
        selection_name(&self.categories)
    }

    pub fn job_name(&self) -> String {
        self.job_name
            .clone()
            .unwrap_or_else(|| format!("{JOB_NAME_PREFIX}{}", self.selection_name()))
    }

    /// Object key prefix for the selection's images.
    pub fn images_key_prefix(&self) -> String {
        format!("{}/images/", self.selection_name())
    }

    /// Object key of the uploaded manifest.
    pub fn manifest_key(&self) -> String {
        format!("{}/manifest/{}", self.selection_name(), self.manifest_file_name)
    }

    /// Storage path that prefixes every image's `source-ref`.
    pub fn storage_base_path(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.images_key_prefix())
    }

    pub fn manifest_uri(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.manifest_key())
    }

    pub fn manifest_settings(&self) -> ManifestSettings {
        ManifestSettings {
            label_key: self.label_key.clone(),
            job_name: self.job_name(),
            storage_base_path: self.storage_base_path(),
        }
    }
}

/// Joins category names into the selection name used for files and keys.
pub fn selection_name<S: AsRef<str>>(categories: &[S]) -> String {
    categories.iter().map(AsRef::as_ref).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ConversionConfig {
        ConversionConfig::new(
            PathBuf::from("/data/mscoco"),
            vec!["cat".to_string(), "boat".to_string()],
            "bucket",
        )
    }

    #[test]
    fn derived_names_follow_selection() {
        let config = config();
        assert_eq!(config.selection_name(), "catboat");
        assert_eq!(config.job_name(), "Custom Labels job name for catboat");
        assert_eq!(config.storage_base_path(), "s3://bucket/catboat/images/");
        assert_eq!(
            config.manifest_key(),
            "catboat/manifest/custom_labels.manifest"
        );
        assert_eq!(
            config.manifest_uri(),
            "s3://bucket/catboat/manifest/custom_labels.manifest"
        );
    }

    #[test]
    fn job_name_override_wins() {
        let mut config = config();
        config.job_name = Some("nightly".to_string());
        assert_eq!(config.manifest_settings().job_name, "nightly");
    }

    #[test]
    fn validate_rejects_missing_inputs() {
        assert!(config().validate().is_ok());

        let mut no_categories = config();
        no_categories.categories.clear();
        assert!(matches!(no_categories.validate(), Err(CoreError::Config(_))));

        let mut blank_bucket = config();
        blank_bucket.bucket = " ".to_string();
        assert!(matches!(blank_bucket.validate(), Err(CoreError::Config(_))));

        let mut slashed = config();
        slashed.bucket = "a/b".to_string();
        assert!(slashed.validate().is_err());

        let mut no_label = config();
        no_label.label_key.clear();
        assert!(no_label.validate().is_err());
    }

    #[test]
    fn validate_rejects_source_ref_label_key() {
        let mut config = config();
        config.label_key = "source-ref".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, CoreError::Config(msg) if msg.contains("source-ref")));
    }

    #[test]
    fn validate_rejects_category_names_with_separators() {
        for bad in ["../../etc", "cat/dog", "cat\\dog", "/abs", ".."] {
            let mut config = config();
            config.categories = vec!["boat".to_string(), bad.to_string()];
            let err = config.validate().unwrap_err();
            assert!(
                matches!(&err, CoreError::Config(msg) if msg.contains("path separators")),
                "{bad}: {err:?}"
            );
        }

        let mut dotted = config();
        dotted.categories = vec!["st. bernard".to_string()];
        assert!(dotted.validate().is_ok());

        let mut nested_manifest = config();
        nested_manifest.manifest_file_name = "../custom_labels.manifest".to_string();
        assert!(nested_manifest.validate().is_err());
    }
}
