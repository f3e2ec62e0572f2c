// Shared fixtures for the cocolabel-core integration tests.
#![allow(dead_code)]

use cocolabel_core::CocoDataset;
use serde_json::{Value, json};

/// Four categories, four images and seven annotations.
///
/// Image 30 only carries a "person" annotation; annotation groups are
/// encountered in the order 40, 10, 20, 30.
pub fn sample_value() -> Value {
    json!({
        "info": {"description": "sample", "year": 2017},
        "licenses": [{"id": 1, "name": "CC BY 4.0", "url": "http://example.org"}],
        "images": [
            {"id": 10, "file_name": "000000000010.jpg", "width": 640, "height": 480,
             "date_captured": "2013-11-14 11:18:45", "license": 1},
            {"id": 20, "file_name": "000000000020.jpg", "width": 500, "height": 375,
             "date_captured": "2013-11-15 08:00:01", "license": 1},
            {"id": 30, "file_name": "000000000030.jpg", "width": 427, "height": 640,
             "date_captured": "2013-11-16 12:30:00", "license": 1},
            {"id": 40, "file_name": "000000000040.jpg", "width": 640, "height": 427,
             "date_captured": "2013-11-17 23:59:59", "license": 1}
        ],
        "annotations": [
            {"id": 1, "image_id": 40, "category_id": 2, "bbox": [1, 2, 3, 4],
             "area": 12, "iscrowd": 0, "segmentation": [[1, 2, 4, 2, 4, 6]]},
            {"id": 2, "image_id": 10, "category_id": 2, "bbox": [10.5, 20.25, 30, 40],
             "area": 1200.0, "iscrowd": 0},
            {"id": 3, "image_id": 20, "category_id": 1, "bbox": [0, 0, 50, 100],
             "area": 5000, "iscrowd": 0},
            {"id": 4, "image_id": 20, "category_id": 3, "bbox": [5, 6, 7, 8],
             "area": 56, "iscrowd": 0},
            {"id": 5, "image_id": 30, "category_id": 1, "bbox": [9, 9, 9, 9],
             "area": 81, "iscrowd": 0},
            {"id": 6, "image_id": 40, "category_id": 3, "bbox": [100, 120, 60, 30],
             "area": 1800, "iscrowd": 1},
            {"id": 7, "image_id": 10, "category_id": 2, "bbox": [200, 210, 15.5, 16],
             "area": 248.0, "iscrowd": 0}
        ],
        "categories": [
            {"id": 1, "name": "person", "supercategory": "person"},
            {"id": 2, "name": "cat", "supercategory": "animal"},
            {"id": 3, "name": "boat", "supercategory": "vehicle"},
            {"id": 17, "name": "dog", "supercategory": "animal"}
        ]
    })
}

pub fn sample_dataset() -> CocoDataset {
    serde_json::from_value(sample_value()).expect("sample dataset must parse")
}
