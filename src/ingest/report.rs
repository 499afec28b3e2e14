//! Ingestion summary types and terminal formatting.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use super::RecordBatch;
use crate::record::{DatasetId, ImageSet, TaskKind};

/// Counts describing one finished ingestion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub dataset_id: DatasetId,
    pub task: TaskKind,
    pub classes: usize,
    pub images: usize,
    pub labels: usize,
    /// Images with no label record.
    pub unlabeled_images: usize,
    /// Image count per split; splits with no images are omitted.
    pub images_per_set: BTreeMap<ImageSet, usize>,
}

impl IngestReport {
    pub fn from_batch(batch: &RecordBatch) -> Self {
        let labelled: HashSet<(ImageSet, &str)> = batch
            .labels
            .iter()
            .map(|label| (label.image_set, label.image_name.as_str()))
            .collect();

        let mut images_per_set = BTreeMap::new();
        let mut unlabeled_images = 0;
        for image in &batch.images {
            *images_per_set.entry(image.image_set).or_insert(0) += 1;
            if !labelled.contains(&(image.image_set, image.image_name.as_str())) {
                unlabeled_images += 1;
            }
        }

        Self {
            dataset_id: batch.dataset_id.clone(),
            task: batch.task.clone(),
            classes: batch.classes.len(),
            images: batch.images.len(),
            labels: batch.labels.len(),
            unlabeled_images,
            images_per_set,
        }
    }
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ingested dataset {} ({})", self.dataset_id, self.task)?;
        writeln!(f, "  classes: {}", self.classes)?;

        let per_set: Vec<String> = self
            .images_per_set
            .iter()
            .map(|(set, count)| format!("{}: {}", set, count))
            .collect();
        if per_set.is_empty() {
            writeln!(f, "  images:  {}", self.images)?;
        } else {
            writeln!(f, "  images:  {} ({})", self.images, per_set.join(", "))?;
        }

        writeln!(f, "  labels:  {}", self.labels)?;
        writeln!(f, "  unlabeled images: {}", self.unlabeled_images)
    }
}
