//! Joins that turn stored records into display rows.
//!
//! The `build_*` functions are pure: they take already-queried records and
//! aggregate counts and return freshly constructed rows, never touching the
//! inputs. The `*_view` helpers run the queries against a [`Store`] first.

mod size;

pub use size::convert_size;

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::error::YolodexError;
use crate::record::{
    ClassId, ClassRecord, DatasetId, DatasetRecord, ExtraData, ImageRecord, ImageSet, LabelRecord,
    TaskKind,
};
use crate::store::Store;

/// A dataset with its class and image counts.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub id: DatasetId,
    pub task: TaskKind,
    pub name: String,
    pub description: String,
    pub upload_time: DateTime<Utc>,
    pub size: u64,
    pub classes_count: usize,
    pub images_count: usize,
    /// `size` formatted by [`convert_size`].
    pub dataset_size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_data: Option<ExtraData>,
}

/// A class with the number of labels using it in one split.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClassCount {
    pub class_id: ClassId,
    pub class_name: String,
    pub count: usize,
}

/// An image with its labels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImageWithLabels {
    pub image_set: ImageSet,
    pub image_name: String,
    pub source: String,
    /// Distinct class ids in first-seen order.
    pub labels: Vec<ClassId>,
    /// Class names of `labels`, joined with `", "`.
    pub label_names: String,
    /// Every label as `(class id, raw line)`, duplicates included.
    pub label_data: Vec<(ClassId, String)>,
}

/// Attach class and image counts to each dataset. Missing counts are 0.
pub fn build_datasets_info(
    datasets: &[DatasetRecord],
    class_counts: &HashMap<DatasetId, usize>,
    image_counts: &HashMap<DatasetId, usize>,
) -> Vec<DatasetSummary> {
    datasets
        .iter()
        .map(|dataset| DatasetSummary {
            id: dataset.id.clone(),
            task: dataset.task.clone(),
            name: dataset.name.clone(),
            description: dataset.description.clone(),
            upload_time: dataset.upload_time,
            size: dataset.size,
            classes_count: class_counts.get(&dataset.id).copied().unwrap_or(0),
            images_count: image_counts.get(&dataset.id).copied().unwrap_or(0),
            dataset_size: convert_size(dataset.size),
            extra_data: dataset.extra_data.clone(),
        })
        .collect()
}

/// Attach per-class label counts. Classes without labels count 0.
pub fn build_classes_counts(
    classes: &[ClassRecord],
    label_counts: &BTreeMap<ClassId, usize>,
) -> Vec<ClassCount> {
    classes
        .iter()
        .map(|class| ClassCount {
            class_id: class.class_id.clone(),
            class_name: class.class_name.clone(),
            count: label_counts.get(&class.class_id).copied().unwrap_or(0),
        })
        .collect()
}

/// Group labels under their images.
///
/// Images keep the order of `images`. With `class_filter` set, only images
/// that have at least one label of that class are returned. Labels naming an
/// image that is not in `images` are dropped with a warning. Class ids with
/// no entry in `class_names` (such as fallback tokens) display as the id.
pub fn build_images_with_labels(
    images: &[ImageRecord],
    labels: &[LabelRecord],
    class_filter: Option<&ClassId>,
    class_names: &BTreeMap<ClassId, String>,
) -> Vec<ImageWithLabels> {
    let mut rows: Vec<ImageWithLabels> = Vec::with_capacity(images.len());
    let mut seen: Vec<HashSet<ClassId>> = Vec::with_capacity(images.len());
    let mut position: HashMap<&str, usize> = HashMap::with_capacity(images.len());

    for image in images {
        if position.contains_key(image.image_name.as_str()) {
            continue;
        }
        position.insert(image.image_name.as_str(), rows.len());
        rows.push(ImageWithLabels {
            image_set: image.image_set,
            image_name: image.image_name.clone(),
            source: image.source.clone(),
            labels: Vec::new(),
            label_names: String::new(),
            label_data: Vec::new(),
        });
        seen.push(HashSet::new());
    }

    for label in labels {
        let Some(&index) = position.get(label.image_name.as_str()) else {
            warn!(image = %label.image_name, "label references an unknown image");
            continue;
        };

        let row = &mut rows[index];
        if seen[index].insert(label.class_id.clone()) {
            if !row.label_names.is_empty() {
                row.label_names.push_str(", ");
            }
            match class_names.get(&label.class_id) {
                Some(name) => row.label_names.push_str(name),
                None => row.label_names.push_str(&label.class_id.to_string()),
            }
            row.labels.push(label.class_id.clone());
        }
        row.label_data
            .push((label.class_id.clone(), label.label_data.clone()));
    }

    match class_filter {
        None => rows,
        Some(class_id) => rows
            .into_iter()
            .zip(seen)
            .filter(|(_, classes)| classes.contains(class_id))
            .map(|(row, _)| row)
            .collect(),
    }
}

/// All datasets with counts, newest first.
pub fn datasets_view<S: Store + ?Sized>(store: &S) -> Result<Vec<DatasetSummary>, YolodexError> {
    let datasets = store.datasets()?;
    let class_counts = store.class_counts()?;
    let image_counts = store.image_counts()?;
    Ok(build_datasets_info(&datasets, &class_counts, &image_counts))
}

/// One dataset with counts.
pub fn dataset_view<S: Store + ?Sized>(
    store: &S,
    id: &DatasetId,
) -> Result<DatasetSummary, YolodexError> {
    let dataset = store
        .dataset(id)?
        .ok_or_else(|| YolodexError::DatasetNotFound { id: id.clone() })?;
    let class_counts = store.class_counts()?;
    let image_counts = store.image_counts()?;

    build_datasets_info(std::slice::from_ref(&dataset), &class_counts, &image_counts)
        .pop()
        .ok_or_else(|| YolodexError::DatasetNotFound { id: id.clone() })
}

/// Classes of a dataset with label counts for one split.
pub fn classes_view<S: Store + ?Sized>(
    store: &S,
    id: &DatasetId,
    set: ImageSet,
) -> Result<Vec<ClassCount>, YolodexError> {
    let classes = store.classes(id)?;
    let label_counts = store.label_counts(id, set)?;
    Ok(build_classes_counts(&classes, &label_counts))
}

/// Images of one split with their labels, optionally filtered by class.
pub fn images_view<S: Store + ?Sized>(
    store: &S,
    id: &DatasetId,
    set: ImageSet,
    class_filter: Option<&ClassId>,
) -> Result<Vec<ImageWithLabels>, YolodexError> {
    let images = store.images(id, set)?;
    let labels = store.labels(id, set)?;
    let class_names = store.class_names(id)?;
    Ok(build_images_with_labels(
        &images,
        &labels,
        class_filter,
        &class_names,
    ))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn dataset(id: &str, size: u64) -> DatasetRecord {
        DatasetRecord {
            id: DatasetId::new(id),
            task: TaskKind::Detect,
            name: format!("{} dataset", id),
            description: String::new(),
            upload_time: Utc
                .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
                .single()
                .expect("valid time"),
            size,
            extra_data: None,
        }
    }

    fn image(name: &str) -> ImageRecord {
        ImageRecord {
            dataset_id: DatasetId::new("ds"),
            image_set: ImageSet::Train,
            image_name: name.to_string(),
            source: format!("images/train/{}", name),
        }
    }

    fn label(image: &str, class_id: ClassId, line: &str) -> LabelRecord {
        LabelRecord {
            dataset_id: DatasetId::new("ds"),
            image_set: ImageSet::Train,
            image_name: image.to_string(),
            class_id,
            label_data: line.to_string(),
        }
    }

    fn names() -> BTreeMap<ClassId, String> {
        BTreeMap::from([
            (ClassId::Index(0), "person".to_string()),
            (ClassId::Index(1), "car".to_string()),
        ])
    }

    #[test]
    fn dataset_counts_default_to_zero() {
        let datasets = vec![dataset("a", 0), dataset("b", 1536)];
        let class_counts = HashMap::from([(DatasetId::new("b"), 3)]);
        let image_counts = HashMap::from([(DatasetId::new("b"), 10)]);

        let info = build_datasets_info(&datasets, &class_counts, &image_counts);
        assert_eq!(info[0].classes_count, 0);
        assert_eq!(info[0].images_count, 0);
        assert_eq!(info[0].dataset_size, "0.0 B");
        assert_eq!(info[1].classes_count, 3);
        assert_eq!(info[1].images_count, 10);
        assert_eq!(info[1].dataset_size, "1.5 KB");
    }

    #[test]
    fn dataset_join_does_not_alias_inputs() {
        let datasets = vec![dataset("a", 1024)];
        let first = build_datasets_info(&datasets, &HashMap::new(), &HashMap::new());
        let second = build_datasets_info(
            &datasets,
            &HashMap::from([(DatasetId::new("a"), 2)]),
            &HashMap::new(),
        );

        assert_eq!(first[0].classes_count, 0);
        assert_eq!(second[0].classes_count, 2);
        assert_eq!(datasets[0].size, 1024);
    }

    #[test]
    fn class_counts_default_to_zero() {
        let classes = vec![
            ClassRecord {
                dataset_id: DatasetId::new("ds"),
                class_id: ClassId::Index(0),
                class_name: "person".into(),
            },
            ClassRecord {
                dataset_id: DatasetId::new("ds"),
                class_id: ClassId::Index(1),
                class_name: "car".into(),
            },
        ];
        let counts = BTreeMap::from([(ClassId::Index(1), 4)]);

        let rows = build_classes_counts(&classes, &counts);
        assert_eq!(rows[0].count, 0);
        assert_eq!(rows[1].count, 4);
        assert_eq!(rows[1].class_name, "car");
    }

    #[test]
    fn image_join_dedupes_class_ids_in_first_seen_order() {
        let images = vec![image("a.jpg"), image("b.jpg")];
        let labels = vec![
            label("a.jpg", ClassId::Index(1), "1 0.1 0.1 0.1 0.1"),
            label("a.jpg", ClassId::Index(0), "0 0.2 0.2 0.2 0.2"),
            label("a.jpg", ClassId::Index(1), "1 0.3 0.3 0.3 0.3"),
        ];

        let rows = build_images_with_labels(&images, &labels, None, &names());
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].labels, vec![ClassId::Index(1), ClassId::Index(0)]);
        assert_eq!(rows[0].label_names, "car, person");
        assert_eq!(rows[0].label_data.len(), 3);
        assert_eq!(rows[0].label_data[2].1, "1 0.3 0.3 0.3 0.3");

        assert!(rows[1].labels.is_empty());
        assert_eq!(rows[1].label_names, "");
        assert!(rows[1].label_data.is_empty());
    }

    #[test]
    fn image_join_filters_by_class() {
        let images = vec![image("a.jpg"), image("b.jpg"), image("c.jpg")];
        let labels = vec![
            label("a.jpg", ClassId::Index(0), "0"),
            label("b.jpg", ClassId::Index(1), "1"),
            label("c.jpg", ClassId::Index(1), "1"),
            label("c.jpg", ClassId::Index(0), "0"),
        ];

        let rows =
            build_images_with_labels(&images, &labels, Some(&ClassId::Index(1)), &names());
        let names: Vec<&str> = rows.iter().map(|row| row.image_name.as_str()).collect();
        assert_eq!(names, vec!["b.jpg", "c.jpg"]);
    }

    #[test]
    fn image_join_shows_fallback_tokens_verbatim() {
        let images = vec![image("a.jpg")];
        let labels = vec![label("a.jpg", ClassId::Token("car".into()), "car 0.5 0.5 1 1")];

        let rows = build_images_with_labels(&images, &labels, None, &names());
        assert_eq!(rows[0].label_names, "car");
        assert_eq!(rows[0].labels, vec![ClassId::Token("car".into())]);
    }

    #[test]
    fn image_join_ignores_labels_for_unknown_images() {
        let images = vec![image("a.jpg")];
        let labels = vec![label("ghost.jpg", ClassId::Index(0), "0")];

        let rows = build_images_with_labels(&images, &labels, None, &names());
        assert_eq!(rows.len(), 1);
        assert!(rows[0].label_data.is_empty());
    }

    #[test]
    fn views_read_through_the_store() {
        use crate::store::Catalog;

        let mut catalog = Catalog::new();
        catalog.insert_dataset(dataset("ds", 2048)).expect("insert");
        catalog
            .insert_images(vec![image("b.jpg"), image("a.jpg")])
            .expect("insert images");
        catalog
            .insert_labels(vec![label("b.jpg", ClassId::Index(0), "0 1 1 1 1")])
            .expect("insert labels");

        let id = DatasetId::new("ds");
        let summary = dataset_view(&catalog, &id).expect("dataset view");
        assert_eq!(summary.images_count, 2);
        assert_eq!(summary.classes_count, 0);
        assert_eq!(summary.dataset_size, "2.0 KB");

        let rows = images_view(&catalog, &id, ImageSet::Train, None).expect("images view");
        assert_eq!(rows[0].image_name, "a.jpg");
        assert_eq!(rows[1].label_names, "0");

        assert!(classes_view(&catalog, &id, ImageSet::Train)
            .expect("classes view")
            .is_empty());

        let missing = dataset_view(&catalog, &DatasetId::new("nope")).unwrap_err();
        assert!(matches!(missing, YolodexError::DatasetNotFound { .. }));
    }
}
