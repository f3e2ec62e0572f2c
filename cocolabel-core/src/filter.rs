// ============================================================================
// cocolabel-core/src/filter.rs
// ============================================================================
//
// DATASET FILTER: Category Filtering and Dense Re-indexing
//
// This module reduces a full COCO dataset to a caller-selected subset of
// categories. It indexes the source records, assigns the selected categories
// new contiguous ids starting at 1, rewrites the surviving annotations to the
// new ids and keeps only the images that still have at least one annotation.
//
// KEY COMPONENTS:
// - CocoFilter: Lookup indexes built once over a borrowed dataset
// - MissingCategoryPolicy: Caller decision for requested names the source lacks
// - FilterOutcome / FilterStats: The filtered document plus what happened
//
// ORDERING:
// - Categories keep their source storage order (first occurrence of each id)
// - Annotations are grouped by image in order of first appearance, and keep
//   their encounter order within each group
// - Images are emitted in ascending id order

use std::collections::{BTreeSet, HashMap, HashSet};

use log::{debug, info, warn};
use serde::Serialize;

use crate::dataset::{Annotation, Category, CocoDataset, DatasetCounts, Image};
use crate::error::{CoreError, CoreResult};

/// What to do when requested category names are absent from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingCategoryPolicy {
    /// Fail with `CoreError::UnknownCategories`.
    #[default]
    Abort,
    /// Report the missing names and continue with the ones that exist.
    ProceedWithSubset,
}

/// Statistics gathered while indexing and filtering.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterStats {
    pub before: DatasetCounts,
    pub after: DatasetCounts,
    /// Category ids seen more than once (later records were skipped).
    pub duplicate_category_ids: Vec<i64>,
    /// Image ids seen more than once (later records were skipped).
    pub duplicate_image_ids: Vec<i64>,
    /// Matching annotations dropped because their image id has no image record.
    pub dangling_annotations: usize,
}

/// Result of filtering a dataset.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    /// The filtered document, same shape as the source.
    pub dataset: CocoDataset,
    /// `(original id, new id)` pairs in assignment order.
    pub category_map: Vec<(i64, i64)>,
    /// Requested names the source does not define, sorted.
    pub missing_categories: Vec<String>,
    pub stats: FilterStats,
}

/// Lookup indexes over a source dataset.
///
/// Building the filter indexes the dataset once; [`CocoFilter::filter`] can
/// then be called for any number of category selections.
pub struct CocoFilter<'a> {
    dataset: &'a CocoDataset,
    categories: Vec<&'a Category>,
    category_names: HashSet<&'a str>,
    images: HashMap<i64, &'a Image>,
    segmentations: Vec<(i64, Vec<&'a Annotation>)>,
    duplicate_category_ids: Vec<i64>,
    duplicate_image_ids: Vec<i64>,
}

impl<'a> CocoFilter<'a> {
    /// Indexes categories, images and annotations of `dataset`.
    ///
    /// Duplicate category and image ids are logged and skipped; the first
    /// occurrence wins.
    pub fn new(dataset: &'a CocoDataset) -> Self {
        let mut categories = Vec::with_capacity(dataset.categories.len());
        let mut category_names = HashSet::new();
        let mut seen_categories = HashSet::new();
        let mut duplicate_category_ids = Vec::new();

        for category in &dataset.categories {
            if seen_categories.insert(category.id) {
                categories.push(category);
                category_names.insert(category.name.as_str());
            } else {
                warn!(
                    "Skipping duplicate category id {} ('{}')",
                    category.id, category.name
                );
                duplicate_category_ids.push(category.id);
            }
        }

        let mut images = HashMap::with_capacity(dataset.images.len());
        let mut duplicate_image_ids = Vec::new();
        for image in &dataset.images {
            if images.contains_key(&image.id) {
                warn!(
                    "Skipping duplicate image id {} ('{}')",
                    image.id, image.file_name
                );
                duplicate_image_ids.push(image.id);
            } else {
                images.insert(image.id, image);
            }
        }

        let mut segmentations: Vec<(i64, Vec<&Annotation>)> = Vec::new();
        let mut group_index: HashMap<i64, usize> = HashMap::new();
        for annotation in &dataset.annotations {
            let slot = *group_index.entry(annotation.image_id).or_insert_with(|| {
                segmentations.push((annotation.image_id, Vec::new()));
                segmentations.len() - 1
            });
            segmentations[slot].1.push(annotation);
        }

        debug!(
            "Indexed {} categories, {} images, {} annotation groups",
            categories.len(),
            images.len(),
            segmentations.len()
        );

        Self {
            dataset,
            categories,
            category_names,
            images,
            segmentations,
            duplicate_category_ids,
            duplicate_image_ids,
        }
    }

    /// Returns the requested names that no source category carries, sorted.
    pub fn missing_categories<S: AsRef<str>>(&self, requested: &[S]) -> Vec<String> {
        requested
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| !self.category_names.contains(name))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Filters the indexed dataset down to the categories named in `requested`.
    pub fn filter<S: AsRef<str>>(
        &self,
        requested: &[S],
        policy: MissingCategoryPolicy,
    ) -> CoreResult<FilterOutcome> {
        if requested.is_empty() {
            return Err(CoreError::Config(
                "at least one category name is required".to_string(),
            ));
        }
        let wanted: HashSet<&str> = requested.iter().map(AsRef::as_ref).collect();

        let missing_categories = self.missing_categories(requested);
        if !missing_categories.is_empty() {
            match policy {
                MissingCategoryPolicy::Abort => {
                    return Err(CoreError::UnknownCategories(missing_categories));
                }
                MissingCategoryPolicy::ProceedWithSubset => {
                    warn!(
                        "Did not find categories: {}; continuing with the rest",
                        missing_categories.join(", ")
                    );
                }
            }
        }

        let category_map = self.remap_categories(&wanted);
        if category_map.is_empty() {
            return Err(CoreError::UnknownCategories(missing_categories));
        }
        let new_ids: HashMap<i64, i64> = category_map.iter().copied().collect();

        let mut annotations = Vec::new();
        let mut kept_image_ids = BTreeSet::new();
        let mut dangling_annotations = 0;
        for (image_id, group) in &self.segmentations {
            let has_image = self.images.contains_key(image_id);
            for annotation in group {
                let Some(&new_id) = new_ids.get(&annotation.category_id) else {
                    continue;
                };
                if !has_image {
                    dangling_annotations += 1;
                    continue;
                }
                let mut remapped = (*annotation).clone();
                remapped.category_id = new_id;
                annotations.push(remapped);
                kept_image_ids.insert(*image_id);
            }
        }
        if dangling_annotations > 0 {
            warn!(
                "Dropped {dangling_annotations} matching annotation(s) whose image id has no image record"
            );
        }

        let images: Vec<Image> = kept_image_ids
            .iter()
            .filter_map(|id| self.images.get(id).map(|image| (*image).clone()))
            .collect();

        let categories: Vec<Category> = category_map
            .iter()
            .filter_map(|(original_id, new_id)| {
                self.categories
                    .iter()
                    .find(|category| category.id == *original_id)
                    .map(|category| {
                        let mut renumbered = (*category).clone();
                        renumbered.id = *new_id;
                        renumbered
                    })
            })
            .collect();

        let dataset = CocoDataset {
            info: self.dataset.info.clone(),
            licenses: self.dataset.licenses.clone(),
            images,
            annotations,
            categories,
        };

        let stats = FilterStats {
            before: self.dataset.counts(),
            after: dataset.counts(),
            duplicate_category_ids: self.duplicate_category_ids.clone(),
            duplicate_image_ids: self.duplicate_image_ids.clone(),
            dangling_annotations,
        };
        info!(
            "Filtered to {} categories, {} images, {} annotations",
            stats.after.categories, stats.after.images, stats.after.annotations
        );

        Ok(FilterOutcome {
            dataset,
            category_map,
            missing_categories,
            stats,
        })
    }

    /// Assigns ids `1..=K` to wanted categories in source storage order.
    fn remap_categories(&self, wanted: &HashSet<&str>) -> Vec<(i64, i64)> {
        self.categories
            .iter()
            .filter(|category| wanted.contains(category.name.as_str()))
            .zip(1..)
            .map(|(category, new_id)| (category.id, new_id))
            .collect()
    }
}

/// Indexes `dataset` and filters it in one call.
pub fn filter_dataset<S: AsRef<str>>(
    dataset: &CocoDataset,
    categories: &[S],
    policy: MissingCategoryPolicy,
) -> CoreResult<FilterOutcome> {
    CocoFilter::new(dataset).filter(categories, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dataset(value: serde_json::Value) -> CocoDataset {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn duplicate_category_ids_keep_first_record() {
        let ds = dataset(json!({
            "images": [],
            "annotations": [],
            "categories": [
                {"id": 1, "name": "dog", "supercategory": "animal"},
                {"id": 1, "name": "wolf", "supercategory": "animal"}
            ]
        }));
        let filter = CocoFilter::new(&ds);
        assert_eq!(filter.duplicate_category_ids, vec![1]);
        assert_eq!(filter.missing_categories(&["wolf"]), vec!["wolf".to_string()]);
        assert!(filter.missing_categories(&["dog"]).is_empty());
    }

    #[test]
    fn annotation_groups_follow_first_appearance() {
        let ds = dataset(json!({
            "images": [],
            "annotations": [
                {"image_id": 5, "category_id": 1, "bbox": [0, 0, 1, 1]},
                {"image_id": 2, "category_id": 1, "bbox": [0, 0, 1, 1]},
                {"image_id": 5, "category_id": 2, "bbox": [0, 0, 1, 1]}
            ],
            "categories": []
        }));
        let filter = CocoFilter::new(&ds);
        let order: Vec<(i64, usize)> = filter
            .segmentations
            .iter()
            .map(|(id, group)| (*id, group.len()))
            .collect();
        assert_eq!(order, vec![(5, 2), (2, 1)]);
    }

    #[test]
    fn empty_request_is_a_configuration_error() {
        let ds = dataset(json!({"images": [], "annotations": [], "categories": []}));
        let names: [&str; 0] = [];
        let err = filter_dataset(&ds, &names, MissingCategoryPolicy::Abort).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }
}
