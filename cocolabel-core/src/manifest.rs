//! Detection manifest construction.
//!
//! Turns a filtered dataset into one [`ManifestLine`] per image. A line is a
//! plain structured record; the label key that names its annotation and
//! metadata attributes is applied only when the line is serialized, through
//! [`ManifestLine::labeled`].

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;
use log::debug;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Number;

use crate::dataset::{CocoDataset, Image};
use crate::error::{CoreError, CoreResult};

/// Format of `date_captured` in COCO image records.
pub const CAPTURE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format of `creation-date` in manifest metadata.
pub const CREATION_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Metadata `type` value for object-detection ground truth.
pub const GROUND_TRUTH_TYPE: &str = "groundtruth/object-detection";

/// Color depth reported for every image.
pub const IMAGE_DEPTH: u32 = 3;

/// Attribute holding the image location on every line.
pub const SOURCE_REF_KEY: &str = "source-ref";

/// Naming and location parameters for manifest lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestSettings {
    /// Field name of the annotation attribute; metadata uses `<key>-metadata`.
    pub label_key: String,
    pub job_name: String,
    /// Prefix joined with each image file name to form `source-ref`.
    pub storage_base_path: String,
}

impl ManifestSettings {
    /// Checks that the label key yields three distinct attributes per line.
    pub fn validate(&self) -> CoreResult<()> {
        validate_label_key(&self.label_key)
    }
}

/// Rejects label keys that are empty or collide with `source-ref`.
pub fn validate_label_key(label_key: &str) -> CoreResult<()> {
    if label_key.trim().is_empty() {
        return Err(CoreError::Config("label key must not be empty".to_string()));
    }
    if label_key == SOURCE_REF_KEY || metadata_key(label_key) == SOURCE_REF_KEY {
        return Err(CoreError::Config(format!(
            "label key must not be '{SOURCE_REF_KEY}'"
        )));
    }
    Ok(())
}

/// Name of the metadata attribute for a label key.
#[must_use]
pub fn metadata_key(label_key: &str) -> String {
    format!("{label_key}-metadata")
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct BoundingBox {
    pub left: Number,
    pub top: Number,
    pub width: Number,
    pub height: Number,
    pub class_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

/// Per-object confidence placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ObjectConfidence {
    pub confidence: u8,
}

/// The attribute stored under the label key.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AnnotationBlock {
    pub annotations: Vec<BoundingBox>,
    pub image_size: Vec<ImageSize>,
}

/// The attribute stored under `<label key>-metadata`.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MetadataBlock {
    #[serde(rename = "job-name")]
    pub job_name: String,
    #[serde(rename = "class-map")]
    pub class_map: BTreeMap<i64, String>,
    #[serde(rename = "human-annotated")]
    pub human_annotated: String,
    pub objects: Vec<ObjectConfidence>,
    #[serde(rename = "creation-date")]
    pub creation_date: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// One image's labels in the training manifest schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestLine {
    pub image_id: i64,
    pub source_ref: String,
    pub annotation_block: AnnotationBlock,
    pub metadata_block: MetadataBlock,
}

impl ManifestLine {
    fn seed(image: &Image, settings: &ManifestSettings) -> CoreResult<Self> {
        Ok(Self {
            image_id: image.id,
            source_ref: format!("{}{}", settings.storage_base_path, image.file_name),
            annotation_block: AnnotationBlock {
                annotations: Vec::new(),
                image_size: vec![ImageSize {
                    width: image.width,
                    height: image.height,
                    depth: IMAGE_DEPTH,
                }],
            },
            metadata_block: MetadataBlock {
                job_name: settings.job_name.clone(),
                class_map: BTreeMap::new(),
                human_annotated: "yes".to_string(),
                objects: Vec::new(),
                creation_date: creation_date(image)?,
                kind: GROUND_TRUTH_TYPE.to_string(),
            },
        })
    }

    /// Binds the line to a label key for serialization.
    #[must_use]
    pub fn labeled<'a>(&'a self, label_key: &'a str) -> LabeledLine<'a> {
        LabeledLine {
            line: self,
            label_key,
        }
    }

    /// Serializes the line as a single compact JSON object.
    pub fn to_json_line(&self, label_key: &str) -> CoreResult<String> {
        Ok(serde_json::to_string(&self.labeled(label_key))?)
    }
}

/// A manifest line paired with the label key that names its attributes.
pub struct LabeledLine<'a> {
    line: &'a ManifestLine,
    label_key: &'a str,
}

impl Serialize for LabeledLine<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry(SOURCE_REF_KEY, &self.line.source_ref)?;
        map.serialize_entry(self.label_key, &self.line.annotation_block)?;
        map.serialize_entry(&metadata_key(self.label_key), &self.line.metadata_block)?;
        map.end()
    }
}

/// Reformats an image's capture date as `YYYY-MM-DDTHH:MM:SS`.
pub fn creation_date(image: &Image) -> CoreResult<String> {
    NaiveDateTime::parse_from_str(&image.date_captured, CAPTURE_DATE_FORMAT)
        .map(|captured| captured.format(CREATION_DATE_FORMAT).to_string())
        .map_err(|_| CoreError::TimestampFormat {
            image_id: image.id,
            value: image.date_captured.clone(),
        })
}

/// Builds one manifest line per image of a filtered dataset.
///
/// Lines come back in ascending image id order. Every annotation must point at
/// an image and a category of `dataset`; anything else means the filter stage
/// produced inconsistent output and is reported as
/// `CoreError::InternalConsistency`.
pub fn build_manifest(
    dataset: &CocoDataset,
    settings: &ManifestSettings,
) -> CoreResult<Vec<ManifestLine>> {
    settings.validate()?;
    let mut lines: BTreeMap<i64, ManifestLine> = BTreeMap::new();
    for image in &dataset.images {
        if lines.contains_key(&image.id) {
            return Err(CoreError::InternalConsistency(format!(
                "image id {} appears more than once in the filtered dataset",
                image.id
            )));
        }
        lines.insert(image.id, ManifestLine::seed(image, settings)?);
    }

    let category_names: HashMap<i64, &str> = dataset
        .categories
        .iter()
        .map(|category| (category.id, category.name.as_str()))
        .collect();

    for annotation in &dataset.annotations {
        let line = lines.get_mut(&annotation.image_id).ok_or_else(|| {
            CoreError::InternalConsistency(format!(
                "annotation references image id {} which is not in the filtered dataset",
                annotation.image_id
            ))
        })?;
        let name = category_names.get(&annotation.category_id).ok_or_else(|| {
            CoreError::InternalConsistency(format!(
                "annotation on image {} references category id {} which is not in the filtered dataset",
                annotation.image_id, annotation.category_id
            ))
        })?;

        line.annotation_block.annotations.push(BoundingBox {
            left: annotation.left().clone(),
            top: annotation.top().clone(),
            width: annotation.width().clone(),
            height: annotation.height().clone(),
            class_id: annotation.category_id,
        });
        line.metadata_block
            .class_map
            .insert(annotation.category_id, (*name).to_string());
        line.metadata_block
            .objects
            .push(ObjectConfidence { confidence: 1 });
    }

    debug!(
        "Built {} manifest lines from {} annotations",
        lines.len(),
        dataset.annotations.len()
    );
    Ok(lines.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value, json};

    fn image(id: i64, date: &str) -> Image {
        Image {
            id,
            file_name: format!("{id:012}.jpg"),
            width: 640,
            height: 480,
            date_captured: date.to_string(),
            extra: Map::new(),
        }
    }

    fn settings() -> ManifestSettings {
        ManifestSettings {
            label_key: "bounding-box".to_string(),
            job_name: "job".to_string(),
            storage_base_path: "s3://bucket/boat/images/".to_string(),
        }
    }

    #[test]
    fn creation_date_is_iso_seconds() {
        let img = image(1, "2013-11-14 16:28:13");
        assert_eq!(creation_date(&img).unwrap(), "2013-11-14T16:28:13");
    }

    #[test]
    fn creation_date_rejects_other_formats() {
        for bad in ["2013-11-14T16:28:13", "2013-11-14", "", "14/11/2013 16:28:13"] {
            let err = creation_date(&image(9, bad)).unwrap_err();
            assert!(matches!(err, CoreError::TimestampFormat { image_id: 9, .. }));
        }
    }

    #[test]
    fn label_key_names_both_attributes() {
        let line = ManifestLine::seed(&image(3, "2020-01-02 03:04:05"), &settings()).unwrap();
        let value: Value = serde_json::from_str(&line.to_json_line("boxes").unwrap()).unwrap();
        let object = value.as_object().unwrap();
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["boxes", "boxes-metadata", "source-ref"]);
        assert_eq!(
            value["source-ref"],
            json!("s3://bucket/boat/images/000000000003.jpg")
        );
        assert_eq!(
            value["boxes"]["image_size"],
            json!([{"width": 640, "height": 480, "depth": 3}])
        );
        assert_eq!(value["boxes-metadata"]["human-annotated"], json!("yes"));
        assert_eq!(value["boxes-metadata"]["type"], json!(GROUND_TRUTH_TYPE));
        assert_eq!(value["boxes-metadata"]["creation-date"], json!("2020-01-02T03:04:05"));
    }

    #[test]
    fn class_map_keys_serialize_as_strings() {
        let mut line = ManifestLine::seed(&image(3, "2020-01-02 03:04:05"), &settings()).unwrap();
        line.metadata_block.class_map.insert(2, "boat".to_string());
        let value: Value = serde_json::from_str(&line.to_json_line("bounding-box").unwrap()).unwrap();
        assert_eq!(value["bounding-box-metadata"]["class-map"], json!({"2": "boat"}));
    }

    #[test]
    fn label_key_must_not_shadow_source_ref() {
        let mut settings = settings();
        assert!(settings.validate().is_ok());

        settings.label_key = "source-ref".to_string();
        let empty = CocoDataset {
            info: Value::Null,
            licenses: Value::Null,
            images: vec![image(1, "2020-01-02 03:04:05")],
            annotations: Vec::new(),
            categories: Vec::new(),
        };
        let err = build_manifest(&empty, &settings).unwrap_err();
        assert!(matches!(err, CoreError::Config(msg) if msg.contains("source-ref")));

        settings.label_key = " ".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn metadata_key_appends_suffix() {
        assert_eq!(metadata_key("bounding-box"), "bounding-box-metadata");
    }
}
