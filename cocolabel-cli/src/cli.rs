// cocolabel-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use cocolabel_core::config::{DEFAULT_DOWNLOAD_DIR, DEFAULT_LABEL_KEY, DEFAULT_MANIFEST_FILE_NAME};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "cocolabel: COCO category filter and detection manifest builder",
    long_about = "Filters COCO instance annotations down to selected categories and \
                  writes object-detection training manifests via cocolabel-core."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output for troubleshooting
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Optional: Directory for log files; logs go to the terminal when unset
    #[arg(long, global = true, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Emit progress as JSON lines on stdout instead of styled text
    #[arg(long, global = true)]
    pub progress_json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Downloads COCO train2017 if needed, filters it and writes the manifest
    Prepare(PrepareArgs),
    /// Filters a COCO annotations file down to the given categories
    Filter(FilterArgs),
    /// Builds a manifest from an already filtered annotations file
    Manifest(ManifestArgs),
}

impl Commands {
    /// Short name used in log file names.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Prepare(_) => "prepare",
            Commands::Filter(_) => "filter",
            Commands::Manifest(_) => "manifest",
        }
    }
}

#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Directory holding (or receiving) the COCO download
    #[arg(short = 'd', long, default_value = DEFAULT_DOWNLOAD_DIR, value_name = "DIR")]
    pub download_dir: PathBuf,

    /// Never download; the dataset directory must already be populated
    #[arg(long)]
    pub no_download: bool,

    /// Download archives again even when a verified copy exists
    #[arg(long)]
    pub overwrite: bool,

    /// Category names to keep (e.g. --categories cat boat)
    #[arg(short, long, required = true, num_args = 1.., value_name = "NAME")]
    pub categories: Vec<String>,

    /// Bucket the images and manifest are published to.
    /// Can also be set via the COCOLABEL_BUCKET environment variable.
    #[arg(short, long, env = "COCOLABEL_BUCKET", value_name = "BUCKET")]
    pub bucket: String,

    /// Continue with the known categories when some names are not in the dataset
    #[arg(long)]
    pub allow_missing: bool,

    /// Replace existing filtered dataset and manifest files
    #[arg(short, long)]
    pub force: bool,

    /// Attribute name for the bounding boxes in each manifest line
    #[arg(long, default_value = DEFAULT_LABEL_KEY, value_name = "KEY")]
    pub label_key: String,

    /// Optional: Job name recorded in every line's metadata.
    /// Defaults to one derived from the category selection.
    #[arg(long, value_name = "NAME")]
    pub job_name: Option<String>,

    /// File name of the manifest, in the dataset directory and the bucket
    #[arg(long, default_value = DEFAULT_MANIFEST_FILE_NAME, value_name = "FILE")]
    pub manifest_name: String,

    /// Optional: Copy the manifest into this directory under its bucket key
    #[arg(long, value_name = "DIR")]
    pub publish_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct FilterArgs {
    /// COCO annotations file to read
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Where to write the filtered annotations
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Category names to keep
    #[arg(short, long, required = true, num_args = 1.., value_name = "NAME")]
    pub categories: Vec<String>,

    /// Continue with the known categories when some names are not in the dataset
    #[arg(long)]
    pub allow_missing: bool,

    /// Replace the output file if it exists
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ManifestArgs {
    /// Filtered COCO annotations file to read
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Where to write the manifest (JSON Lines)
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Prefix joined with each image file name, e.g. s3://bucket/catboat/images/
    #[arg(long, value_name = "URI")]
    pub base_path: String,

    /// Job name recorded in every line's metadata
    #[arg(long, value_name = "NAME")]
    pub job_name: String,

    /// Attribute name for the bounding boxes in each manifest line
    #[arg(long, default_value = DEFAULT_LABEL_KEY, value_name = "KEY")]
    pub label_key: String,

    /// Replace the output file if it exists
    #[arg(short, long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn prepare_accepts_several_categories() {
        let cli = Cli::try_parse_from([
            "cocolabel", "prepare", "--categories", "cat", "boat", "--bucket", "b",
        ])
        .unwrap();
        match cli.command {
            Commands::Prepare(args) => {
                assert_eq!(args.categories, vec!["cat", "boat"]);
                assert_eq!(args.download_dir, PathBuf::from(DEFAULT_DOWNLOAD_DIR));
                assert_eq!(args.label_key, DEFAULT_LABEL_KEY);
                assert_eq!(args.manifest_name, DEFAULT_MANIFEST_FILE_NAME);
                assert!(args.job_name.is_none());
                assert!(!args.no_download);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "cocolabel", "filter", "-i", "in.json", "-o", "out.json", "-c", "cat", "--verbose",
            "--progress-json",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(cli.progress_json);
        assert_eq!(cli.command.name(), "filter");
    }
}
