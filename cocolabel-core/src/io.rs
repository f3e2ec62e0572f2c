//! Dataset and manifest file I/O.
//!
//! Reading a dataset distinguishes a missing file from a malformed one.
//! Writers check the destination against an [`OutputPolicy`] before touching
//! it, so an existing file is never replaced unless the caller said so.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::{debug, info};
use tempfile::NamedTempFile;

use crate::dataset::CocoDataset;
use crate::error::{CoreError, CoreResult};
use crate::manifest::ManifestLine;

/// What to do when an output file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputPolicy {
    /// Fail with `CoreError::OutputExists`.
    #[default]
    Fail,
    /// Replace the existing file.
    Overwrite,
}

/// Checks `path` against `policy` and creates its parent directory.
pub fn prepare_output(path: &Path, policy: OutputPolicy) -> CoreResult<()> {
    if path.exists() {
        match policy {
            OutputPolicy::Fail => return Err(CoreError::OutputExists(path.to_path_buf())),
            OutputPolicy::Overwrite => {
                info!("Overwriting existing output {}", path.display());
            }
        }
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Loads a COCO dataset from a JSON file.
///
/// # Errors
///
/// * `CoreError::InputNotFound` if `path` does not exist
/// * `CoreError::Parse` if the file is not a COCO instances document
pub fn load_dataset(path: &Path) -> CoreResult<CocoDataset> {
    if !path.exists() {
        return Err(CoreError::InputNotFound(path.to_path_buf()));
    }
    debug!("Loading dataset from {}", path.display());
    let reader = BufReader::new(File::open(path)?);
    serde_json::from_reader(reader).map_err(|source| CoreError::Parse {
        context: path.display().to_string(),
        source,
    })
}

/// Writes a dataset as a single JSON document.
///
/// The document goes to a temporary file next to `path` first and is moved
/// into place once fully written.
pub fn write_dataset(path: &Path, dataset: &CocoDataset, policy: OutputPolicy) -> CoreResult<()> {
    prepare_output(path, policy)?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        serde_json::to_writer(&mut writer, dataset)?;
        writer.flush()?;
    }
    temp.persist(path).map_err(|e| CoreError::Io(e.error))?;
    debug!("Wrote dataset to {}", path.display());
    Ok(())
}

/// Writes manifest lines as JSON Lines, one object per line.
///
/// Returns the number of lines written.
pub fn write_manifest(
    path: &Path,
    lines: &[ManifestLine],
    label_key: &str,
    policy: OutputPolicy,
) -> CoreResult<usize> {
    prepare_output(path, policy)?;
    let mut writer = BufWriter::new(File::create(path)?);
    for line in lines {
        serde_json::to_writer(&mut writer, &line.labeled(label_key))?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    debug!("Wrote {} manifest lines to {}", lines.len(), path.display());
    Ok(lines.len())
}
