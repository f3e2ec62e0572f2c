//! Progress and result reporting.
//!
//! The pipeline describes what it is doing through the [`Reporter`] trait.
//! [`TerminalReporter`] prints concise styled text, [`JsonReporter`] emits one
//! JSON event per line for machine consumers and [`NullReporter`] discards
//! everything.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::dataset::DatasetCounts;
use crate::filter::FilterStats;
use crate::util::format_count;

/// Generic stage update (fetch, load, filter, manifest, publish).
#[derive(Clone, Debug)]
pub struct StageProgress {
    pub stage: String,
    pub message: String,
}

/// Record counts of a dataset that was just read or written.
#[derive(Clone, Debug)]
pub struct DatasetSummary {
    pub label: String,
    pub path: String,
    pub counts: DatasetCounts,
}

/// Outcome of the category filter.
#[derive(Clone, Debug)]
pub struct FilterSummary {
    pub requested: Vec<String>,
    pub missing: Vec<String>,
    /// `(original id, new id)` pairs.
    pub category_map: Vec<(i64, i64)>,
    pub stats: FilterStats,
}

#[derive(Clone, Debug)]
pub struct ManifestSummary {
    pub path: String,
    pub lines: usize,
    pub annotations: usize,
}

/// Where the manifest went, or where it is meant to go.
#[derive(Clone, Debug)]
pub struct PublishSummary {
    pub manifest_uri: String,
    /// Set when an object store actually received the manifest.
    pub stored_uri: Option<String>,
    /// Command that syncs the selection's images to the bucket.
    pub image_sync_command: String,
}

/// High-level warning/error message.
#[derive(Clone, Debug)]
pub struct ReporterError {
    pub title: String,
    pub message: String,
    pub suggestion: Option<String>,
}

/// Reporter interface implemented by both human-readable and JSON reporters.
pub trait Reporter: Send + Sync {
    fn stage_progress(&self, _update: &StageProgress) {}
    /// A long-running step without measurable progress started.
    fn activity_started(&self, _message: &str) {}
    fn activity_finished(&self) {}
    fn dataset_loaded(&self, _summary: &DatasetSummary) {}
    fn filter_complete(&self, _summary: &FilterSummary) {}
    fn manifest_written(&self, _summary: &ManifestSummary) {}
    fn publish_complete(&self, _summary: &PublishSummary) {}
    fn warning(&self, _message: &str) {}
    fn error(&self, _error: &ReporterError) {}
    fn operation_complete(&self, _message: &str) {}
}

/// No-op reporter that discards all updates.
pub struct NullReporter;

impl Reporter for NullReporter {}

/// Human-friendly reporter that prints concise text output.
pub struct TerminalReporter {
    spinner: Mutex<Option<ProgressBar>>,
    last_stage: Mutex<Option<String>>,
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
            last_stage: Mutex::new(None),
        }
    }

    fn finish_spinner(&self) {
        if let Ok(mut guard) = self.spinner.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }

    fn print_counts(counts: &DatasetCounts) {
        println!(
            "  {:<12} {}",
            style("Categories:").bold(),
            format_count(counts.categories)
        );
        println!("  {:<12} {}", style("Images:").bold(), format_count(counts.images));
        println!(
            "  {:<12} {}",
            style("Annotations:").bold(),
            format_count(counts.annotations)
        );
    }
}

impl Reporter for TerminalReporter {
    fn stage_progress(&self, update: &StageProgress) {
        self.finish_spinner();
        if let Ok(mut last) = self.last_stage.lock() {
            if last.as_deref() != Some(update.stage.as_str()) {
                println!("\n{}", style(update.stage.to_uppercase()).bold().cyan());
                *last = Some(update.stage.clone());
            }
        }
        println!("  {}{}", style("› ").magenta(), update.message);
    }

    fn activity_started(&self, message: &str) {
        self.finish_spinner();
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("  {spinner} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        if let Ok(mut guard) = self.spinner.lock() {
            *guard = Some(pb);
        }
    }

    fn activity_finished(&self) {
        self.finish_spinner();
    }

    fn dataset_loaded(&self, summary: &DatasetSummary) {
        self.finish_spinner();
        println!(
            "  {} {}",
            style(format!("{}:", summary.label)).bold(),
            summary.path
        );
        Self::print_counts(&summary.counts);
    }

    fn filter_complete(&self, summary: &FilterSummary) {
        self.finish_spinner();
        println!("\n{}", style("FILTER").bold().cyan());
        println!(
            "  {:<12} {}",
            style("Requested:").bold(),
            summary.requested.join(", ")
        );
        if !summary.missing.is_empty() {
            println!(
                "  {:<12} {}",
                style("Missing:").bold(),
                style(summary.missing.join(", ")).yellow()
            );
        }
        for (original, new) in &summary.category_map {
            println!("  - category {original} -> {new}");
        }
        let stats = &summary.stats;
        println!(
            "  Kept {} of {} images, {} of {} annotations",
            style(format_count(stats.after.images)).bold(),
            format_count(stats.before.images),
            style(format_count(stats.after.annotations)).bold(),
            format_count(stats.before.annotations)
        );
        if !stats.duplicate_category_ids.is_empty() || !stats.duplicate_image_ids.is_empty() {
            println!(
                "  {}",
                style(format!(
                    "Skipped {} duplicate category id(s), {} duplicate image id(s)",
                    stats.duplicate_category_ids.len(),
                    stats.duplicate_image_ids.len()
                ))
                .yellow()
            );
        }
        if stats.dangling_annotations > 0 {
            println!(
                "  {}",
                style(format!(
                    "Dropped {} annotation(s) without an image record",
                    stats.dangling_annotations
                ))
                .yellow()
            );
        }
    }

    fn manifest_written(&self, summary: &ManifestSummary) {
        self.finish_spinner();
        println!("\n{}", style("MANIFEST").bold().cyan());
        println!("  {:<12} {}", style("File:").bold(), style(&summary.path).bold());
        println!("  {:<12} {}", style("Lines:").bold(), format_count(summary.lines));
        println!(
            "  {:<12} {}",
            style("Objects:").bold(),
            format_count(summary.annotations)
        );
    }

    fn publish_complete(&self, summary: &PublishSummary) {
        println!("\n{}", style("PUBLISH").bold().cyan());
        match &summary.stored_uri {
            Some(uri) => println!("  {} {}", style("Stored at").bold(), style(uri).green()),
            None => println!(
                "  {}",
                style("Manifest not uploaded; publish it to the destination below").dim()
            ),
        }
        println!(
            "  {} {}",
            style("Manifest URI:").bold(),
            style(&summary.manifest_uri).bold()
        );
        println!(
            "  {} {}",
            style("Sync images:").bold(),
            style(&summary.image_sync_command).bold()
        );
    }

    fn warning(&self, message: &str) {
        self.finish_spinner();
        println!("\n{}", style(format!("WARN: {message}")).yellow().bold());
    }

    fn error(&self, error: &ReporterError) {
        self.finish_spinner();
        eprintln!(
            "\n{} {}",
            style("Error:").red().bold().for_stderr(),
            error.message
        );
        eprintln!("  {}", style(&error.title).dim().for_stderr());
        if let Some(suggestion) = &error.suggestion {
            eprintln!("  Suggestion: {suggestion}");
        }
    }

    fn operation_complete(&self, message: &str) {
        self.finish_spinner();
        println!("\n{} {}", style("✓").green().bold(), style(message).bold());
    }
}

/// Emits one JSON object per event.
pub struct JsonReporter {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonReporter {
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    fn timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    fn write_value(&self, value: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{value}");
            let _ = writer.flush();
        }
    }
}

impl Reporter for JsonReporter {
    fn stage_progress(&self, update: &StageProgress) {
        self.write_value(json!({
            "type": "stage_progress",
            "stage": update.stage,
            "message": update.message,
            "timestamp": Self::timestamp(),
        }));
    }

    fn dataset_loaded(&self, summary: &DatasetSummary) {
        self.write_value(json!({
            "type": "dataset_loaded",
            "label": summary.label,
            "path": summary.path,
            "counts": summary.counts,
            "timestamp": Self::timestamp(),
        }));
    }

    fn filter_complete(&self, summary: &FilterSummary) {
        let category_map: Vec<_> = summary
            .category_map
            .iter()
            .map(|(original, new)| json!({"original_id": original, "new_id": new}))
            .collect();
        self.write_value(json!({
            "type": "filter_complete",
            "requested": summary.requested,
            "missing": summary.missing,
            "category_map": category_map,
            "stats": summary.stats,
            "timestamp": Self::timestamp(),
        }));
    }

    fn manifest_written(&self, summary: &ManifestSummary) {
        self.write_value(json!({
            "type": "manifest_written",
            "path": summary.path,
            "lines": summary.lines,
            "annotations": summary.annotations,
            "timestamp": Self::timestamp(),
        }));
    }

    fn publish_complete(&self, summary: &PublishSummary) {
        self.write_value(json!({
            "type": "publish_complete",
            "manifest_uri": summary.manifest_uri,
            "stored_uri": summary.stored_uri,
            "image_sync_command": summary.image_sync_command,
            "timestamp": Self::timestamp(),
        }));
    }

    fn warning(&self, message: &str) {
        self.write_value(json!({
            "type": "warning",
            "message": message,
            "timestamp": Self::timestamp(),
        }));
    }

    fn error(&self, error: &ReporterError) {
        self.write_value(json!({
            "type": "error",
            "title": error.title,
            "message": error.message,
            "suggestion": error.suggestion,
            "timestamp": Self::timestamp(),
        }));
    }

    fn operation_complete(&self, message: &str) {
        self.write_value(json!({
            "type": "operation_complete",
            "message": message,
            "timestamp": Self::timestamp(),
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn json_reporter_writes_one_event_per_line() {
        let buffer = SharedBuffer::default();
        let reporter = JsonReporter::with_writer(Box::new(buffer.clone()));

        reporter.dataset_loaded(&DatasetSummary {
            label: "Source".to_string(),
            path: "/data/instances.json".to_string(),
            counts: DatasetCounts {
                categories: 3,
                images: 1,
                annotations: 2,
            },
        });
        reporter.warning("careful");

        let text = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let events: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["type"], "dataset_loaded");
        assert_eq!(events[0]["counts"]["annotations"], 2);
        assert_eq!(events[1]["type"], "warning");
        assert_eq!(events[1]["message"], "careful");
    }
}
