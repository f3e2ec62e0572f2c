mod common;

use cocolabel_core::{
    CoreError, ManifestSettings, MissingCategoryPolicy, OutputPolicy, build_manifest,
    filter_dataset, load_dataset, write_dataset, write_manifest,
};
use common::{sample_dataset, sample_value};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_load_missing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let err = load_dataset(&path).unwrap_err();
    assert!(matches!(err, CoreError::InputNotFound(p) if p == path));
}

#[test]
fn test_load_malformed_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, r#"{"images": [], "annotations": ["#).unwrap();
    let err = load_dataset(&path).unwrap_err();
    assert!(matches!(err, CoreError::Parse { .. }));
    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn test_load_requires_record_arrays() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("no_categories.json");
    fs::write(&path, r#"{"images": [], "annotations": []}"#).unwrap();
    assert!(matches!(
        load_dataset(&path).unwrap_err(),
        CoreError::Parse { .. }
    ));
}

#[test]
fn test_written_dataset_loads_back_unchanged() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("annotations").join("catboat.json");
    let filtered = filter_dataset(&sample_dataset(), &["cat", "boat"], MissingCategoryPolicy::Abort)
        .unwrap()
        .dataset;

    write_dataset(&path, &filtered, OutputPolicy::Fail).unwrap();
    assert_eq!(load_dataset(&path).unwrap(), filtered);
}

#[test]
fn test_existing_dataset_is_kept_without_overwrite() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("catboat.json");
    fs::write(&path, "previous").unwrap();

    let err = write_dataset(&path, &sample_dataset(), OutputPolicy::Fail).unwrap_err();
    assert!(matches!(err, CoreError::OutputExists(_)));
    assert_eq!(fs::read_to_string(&path).unwrap(), "previous");

    write_dataset(&path, &sample_dataset(), OutputPolicy::Overwrite).unwrap();
    let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written, sample_value());
}

#[test]
fn test_manifest_is_written_as_json_lines() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom_labels.manifest");
    let filtered = filter_dataset(&sample_dataset(), &["cat", "boat"], MissingCategoryPolicy::Abort)
        .unwrap()
        .dataset;
    let settings = ManifestSettings {
        label_key: "bounding-box".to_string(),
        job_name: "job".to_string(),
        storage_base_path: "s3://b/catboat/images/".to_string(),
    };
    let lines = build_manifest(&filtered, &settings).unwrap();

    let written = write_manifest(&path, &lines, "bounding-box", OutputPolicy::Fail).unwrap();
    assert_eq!(written, 3);

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.ends_with('\n'));
    let parsed: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(parsed.len(), 3);
    assert_eq!(parsed[0]["source-ref"], "s3://b/catboat/images/000000000010.jpg");
    assert!(parsed.iter().all(|line| line["bounding-box-metadata"].is_object()));

    let err = write_manifest(&path, &lines, "bounding-box", OutputPolicy::Fail).unwrap_err();
    assert!(matches!(err, CoreError::OutputExists(_)));
}
