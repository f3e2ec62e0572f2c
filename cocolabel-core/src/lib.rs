//! Core library for turning COCO instance annotations into object-detection
//! training manifests.
//!
//! This crate provides category filtering with dense id remapping, manifest
//! generation in the ground-truth object-detection schema, and the dataset
//! fetching, file I/O and publishing steps around them.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use cocolabel_core::{ConversionConfig, HttpFetcher, NullReporter, prepare};
//! use std::path::PathBuf;
//!
//! let config = ConversionConfig::new(
//!     PathBuf::from("/data/mscoco"),
//!     vec!["cat".to_string(), "boat".to_string()],
//!     "my-bucket",
//! );
//! config.validate().unwrap();
//!
//! let fetcher = HttpFetcher::new().unwrap();
//! let summary = prepare(&config, Some(&fetcher), None, &NullReporter).unwrap();
//! println!("{} lines in {}", summary.manifest_lines, summary.manifest_path.display());
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod fetch;
pub mod file_logging;
pub mod filter;
pub mod io;
pub mod layout;
pub mod manifest;
pub mod pipeline;
pub mod reporting;
pub mod storage;
pub mod util;

// Re-exports for public API
pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use dataset::{Annotation, Category, CocoDataset, DatasetCounts, Image};
pub use error::{CoreError, CoreResult};
pub use fetch::{ArchiveSpec, COCO_TRAIN2017_ARCHIVES, Fetcher, HttpFetcher};
pub use filter::{CocoFilter, FilterOutcome, FilterStats, MissingCategoryPolicy, filter_dataset};
pub use io::{OutputPolicy, load_dataset, write_dataset, write_manifest};
pub use layout::DatasetLayout;
pub use manifest::{ManifestLine, ManifestSettings, build_manifest};
pub use pipeline::{ManifestReport, PrepareSummary, prepare, run_filter, run_manifest};
pub use reporting::{JsonReporter, NullReporter, Reporter, TerminalReporter};
pub use storage::{LocalObjectStore, ObjectStore};
