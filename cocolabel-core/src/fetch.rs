// ============================================================================
// cocolabel-core/src/fetch.rs
// ============================================================================
//
// DATASET FETCHING: Archive Download, Verification and Extraction
//
// This module provides the dataset download collaborator. A `Fetcher` returns
// a local archive whose contents match a known SHA-1 checksum; the archive is
// then unpacked into the dataset directory with the `zip` crate.
//
// KEY COMPONENTS:
// - ArchiveSpec / COCO_TRAIN2017_ARCHIVES: What to download and its checksum
// - Fetcher: Trait for obtaining a verified local archive
// - HttpFetcher: Blocking HTTP implementation
// - ensure_dataset: Fetch and unpack everything a DatasetLayout needs

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info};
use sha1::{Digest, Sha1};
use zip::ZipArchive;

use crate::error::{CoreError, CoreResult};
use crate::layout::DatasetLayout;

/// A downloadable archive and its expected SHA-1 checksum (lowercase hex).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveSpec {
    pub url: &'static str,
    pub sha1: &'static str,
}

impl ArchiveSpec {
    /// File name of the archive: the last path segment of its URL.
    pub fn file_name(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or(self.url)
    }
}

/// Archives providing the train2017 images and the trainval2017 annotations.
pub const COCO_TRAIN2017_ARCHIVES: &[ArchiveSpec] = &[
    ArchiveSpec {
        url: "http://images.cocodataset.org/zips/train2017.zip",
        sha1: "10ad623668ab00c62c096f0ed636d6aff41faca5",
    },
    ArchiveSpec {
        url: "http://images.cocodataset.org/annotations/annotations_trainval2017.zip",
        sha1: "8551ee4bb5860311e79dace7e79cb91e432e78b3",
    },
];

/// Obtains verified local copies of archives.
pub trait Fetcher {
    /// Returns the path of a local file in `dest_dir` whose contents match
    /// `archive.sha1`. With `overwrite` set, an existing copy is replaced.
    fn fetch(&self, archive: &ArchiveSpec, dest_dir: &Path, overwrite: bool) -> CoreResult<PathBuf>;
}

/// Downloads archives over HTTP with a blocking client.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> CoreResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, archive: &ArchiveSpec, dest_dir: &Path, overwrite: bool) -> CoreResult<PathBuf> {
        fs::create_dir_all(dest_dir)?;
        let target = dest_dir.join(archive.file_name());

        if target.exists() && !overwrite {
            if file_sha1(&target)? == archive.sha1 {
                info!("Reusing verified archive {}", target.display());
                return Ok(target);
            }
            info!("Existing {} failed verification, downloading again", target.display());
        }

        info!("Downloading {} to {}", archive.url, target.display());
        let mut response = self.client.get(archive.url).send()?.error_for_status()?;
        {
            let mut writer = BufWriter::new(File::create(&target)?);
            response.copy_to(&mut writer)?;
            writer.flush()?;
        }

        verify_checksum(&target, archive.sha1)?;
        Ok(target)
    }
}

/// Computes the SHA-1 of a file as lowercase hex.
pub fn file_sha1(path: &Path) -> CoreResult<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha1::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let read = reader.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Fails with `CoreError::ChecksumMismatch` unless `path` hashes to `expected`.
pub fn verify_checksum(path: &Path, expected: &str) -> CoreResult<()> {
    let actual = file_sha1(path)?;
    if actual.eq_ignore_ascii_case(expected) {
        debug!("Checksum verified for {}", path.display());
        Ok(())
    } else {
        Err(CoreError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        })
    }
}

/// Unpacks a zip archive into `dest_dir`, replacing files that already exist.
///
/// Entries whose names would escape `dest_dir` are rejected by the archive
/// reader and surface as `CoreError::Archive`.
pub fn extract_archive(archive: &Path, dest_dir: &Path) -> CoreResult<()> {
    info!("Extracting {} into {}", archive.display(), dest_dir.display());
    let file = File::open(archive).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => CoreError::InputNotFound(archive.to_path_buf()),
        _ => CoreError::Io(e),
    })?;
    let archive_error = |e: zip::result::ZipError| {
        CoreError::Archive(format!("{}: {e}", archive.display()))
    };
    let mut zip = ZipArchive::new(BufReader::new(file)).map_err(archive_error)?;
    debug!("{} entries in {}", zip.len(), archive.display());
    zip.extract(dest_dir).map_err(archive_error)?;
    Ok(())
}

/// Makes sure the dataset directory has everything the pipeline reads.
///
/// Nothing happens when the layout is already complete. Otherwise each
/// archive is fetched, extracted into the dataset root and removed.
pub fn ensure_dataset(
    layout: &DatasetLayout,
    archives: &[ArchiveSpec],
    fetcher: &dyn Fetcher,
    overwrite: bool,
) -> CoreResult<()> {
    if layout.is_complete() {
        debug!("Dataset layout at {} is complete", layout.root().display());
        return Ok(());
    }

    fs::create_dir_all(layout.root())?;
    for archive in archives {
        let local = fetcher.fetch(archive, layout.root(), overwrite)?;
        extract_archive(&local, layout.root())?;
        match fs::remove_file(&local) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
