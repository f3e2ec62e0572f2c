//! COCO annotation dataset model.
//!
//! Only the fields the filter and manifest stages read are typed. Everything
//! else on a record (segmentation polygons, areas, URLs, ...) is kept in the
//! record's `extra` map so that a filtered dataset is a faithful copy of the
//! source with only category ids rewritten.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Top-level COCO "instances" document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CocoDataset {
    /// Dataset-level info block, passed through untouched.
    #[serde(default)]
    pub info: Value,
    /// License table, passed through untouched.
    #[serde(default)]
    pub licenses: Value,
    pub images: Vec<Image>,
    pub annotations: Vec<Annotation>,
    pub categories: Vec<Category>,
}

/// A named object class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub supercategory: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: i64,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    /// Capture time as `YYYY-MM-DD HH:MM:SS`.
    pub date_captured: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single labeled region tying one image to one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub image_id: i64,
    pub category_id: i64,
    /// `[x, y, width, height]`. Kept as JSON numbers so integer boxes stay integers.
    pub bbox: [Number; 4],
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Annotation {
    pub fn left(&self) -> &Number {
        &self.bbox[0]
    }

    pub fn top(&self) -> &Number {
        &self.bbox[1]
    }

    pub fn width(&self) -> &Number {
        &self.bbox[2]
    }

    pub fn height(&self) -> &Number {
        &self.bbox[3]
    }
}

/// Record counts for one dataset document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DatasetCounts {
    pub categories: usize,
    pub images: usize,
    pub annotations: usize,
}

impl CocoDataset {
    /// Parses a dataset from a JSON string.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn counts(&self) -> DatasetCounts {
        DatasetCounts {
            categories: self.categories.len(),
            images: self.images.len(),
            annotations: self.annotations.len(),
        }
    }
}
