//! On-disk layout of a COCO download directory.

use std::path::{Path, PathBuf};

use crate::config::selection_name;

/// Directory holding the annotation JSON files.
pub const ANNOTATIONS_DIR: &str = "annotations";

/// Directory holding the training images.
pub const TRAIN_IMAGES_DIR: &str = "train2017";

/// Source annotations used for training manifests.
pub const TRAIN_INSTANCES_FILE: &str = "instances_train2017.json";

/// Paths inside a COCO download directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLayout {
    root: PathBuf,
}

impl DatasetLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn annotations_dir(&self) -> PathBuf {
        self.root.join(ANNOTATIONS_DIR)
    }

    pub fn train_images_dir(&self) -> PathBuf {
        self.root.join(TRAIN_IMAGES_DIR)
    }

    pub fn instances_file(&self) -> PathBuf {
        self.annotations_dir().join(TRAIN_INSTANCES_FILE)
    }

    /// Filtered dataset for a category selection: `annotations/<selection>.json`.
    pub fn filtered_file<S: AsRef<str>>(&self, categories: &[S]) -> PathBuf {
        self.annotations_dir()
            .join(format!("{}.json", selection_name(categories)))
    }

    pub fn manifest_file(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    /// True when every directory the fetcher provides is present.
    pub fn is_complete(&self) -> bool {
        self.root.is_dir() && self.annotations_dir().is_dir() && self.train_images_dir().is_dir()
    }
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a leading `~`, or when `HOME` is unset, come back unchanged.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}
