//! Object storage collaborator.
//!
//! The manifest is published by key into a bucket. Cloud object storage is an
//! external service; this module defines the contract and a local
//! implementation that mirrors a bucket into a directory.

use std::fs;
use std::path::{Component, Path, PathBuf};

use log::info;

use crate::error::{CoreError, CoreResult};

/// Accepts local files and stores them under a key.
pub trait ObjectStore {
    /// Uploads `local_path` under `key` and returns the URI of the stored object.
    fn upload(&self, local_path: &Path, key: &str) -> CoreResult<String>;
}

/// Stores objects as files below a root directory, one file per key.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a key to its file path, rejecting keys that escape the root.
    pub fn object_path(&self, key: &str) -> CoreResult<PathBuf> {
        let relative = Path::new(key);
        let well_formed = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !well_formed {
            return Err(CoreError::Storage(format!("invalid object key '{key}'")));
        }
        Ok(self.root.join(relative))
    }
}

impl ObjectStore for LocalObjectStore {
    fn upload(&self, local_path: &Path, key: &str) -> CoreResult<String> {
        if !local_path.is_file() {
            return Err(CoreError::InputNotFound(local_path.to_path_buf()));
        }
        let target = self.object_path(key)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(local_path, &target).map_err(|e| {
            CoreError::Storage(format!(
                "failed to store {} as {}: {e}",
                local_path.display(),
                target.display()
            ))
        })?;
        info!("Uploaded {} to {}", local_path.display(), target.display());
        Ok(format!("file://{}", target.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn upload_copies_under_key() {
        let src_dir = tempdir().unwrap();
        let store_dir = tempdir().unwrap();
        let src = src_dir.path().join("custom_labels.manifest");
        fs::write(&src, "{}\n").unwrap();

        let store = LocalObjectStore::new(store_dir.path());
        let uri = store
            .upload(&src, "boat/manifest/custom_labels.manifest")
            .unwrap();

        let stored = store_dir
            .path()
            .join("boat/manifest/custom_labels.manifest");
        assert_eq!(fs::read_to_string(&stored).unwrap(), "{}\n");
        assert!(uri.starts_with("file://"));
        assert!(uri.ends_with("boat/manifest/custom_labels.manifest"));
    }

    #[test]
    fn keys_cannot_escape_the_root() {
        let store = LocalObjectStore::new("/tmp/bucket");
        for key in ["", "../x", "/etc/passwd", "a/../../b"] {
            assert!(store.object_path(key).is_err(), "accepted {key:?}");
        }
        assert!(store.object_path("a/b/c").is_ok());
    }

    #[test]
    fn missing_source_is_reported() {
        let store_dir = tempdir().unwrap();
        let store = LocalObjectStore::new(store_dir.path());
        let err = store
            .upload(Path::new("/surely/not/here.manifest"), "k")
            .unwrap_err();
        assert!(matches!(err, CoreError::InputNotFound(_)));
    }
}
