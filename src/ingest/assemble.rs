//! Stamping extracted entries with their dataset id.

use super::Extracted;
use crate::record::{ClassRecord, DatasetId, ExtraData, ImageRecord, LabelRecord, TaskKind};

/// Write-ready records for one ingested dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordBatch {
    pub dataset_id: DatasetId,
    pub task: TaskKind,
    pub classes: Vec<ClassRecord>,
    pub images: Vec<ImageRecord>,
    pub labels: Vec<LabelRecord>,
    /// Manifest metadata; `None` for classification archives.
    pub extra_data: Option<ExtraData>,
}

/// Turn extractor output into flat records for `dataset_id`.
///
/// No validation happens here. Order is preserved from the extractor.
pub fn assemble(dataset_id: &DatasetId, task: &TaskKind, extracted: Extracted) -> RecordBatch {
    let Extracted {
        classes,
        images,
        labels,
        extra_data,
    } = extracted;

    RecordBatch {
        dataset_id: dataset_id.clone(),
        task: task.clone(),
        classes: classes
            .into_iter()
            .map(|class| ClassRecord {
                dataset_id: dataset_id.clone(),
                class_id: class.class_id,
                class_name: class.class_name,
            })
            .collect(),
        images: images
            .into_iter()
            .map(|image| ImageRecord {
                dataset_id: dataset_id.clone(),
                image_set: image.image_set,
                image_name: image.image_name,
                source: image.source,
            })
            .collect(),
        labels: labels
            .into_iter()
            .map(|label| LabelRecord {
                dataset_id: dataset_id.clone(),
                image_set: label.image_set,
                image_name: label.image_name,
                class_id: label.class_id,
                label_data: label.label_data,
            })
            .collect(),
        extra_data,
    }
}
