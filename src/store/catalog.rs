use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Store;
use crate::error::YolodexError;
use crate::record::{
    ClassId, ClassRecord, DatasetId, DatasetRecord, ExtraData, ImageRecord, ImageSet, LabelRecord,
};

/// In-memory catalog holding all four collections.
///
/// This is also the on-disk shape used by [`super::JsonStore`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub datasets: Vec<DatasetRecord>,
    #[serde(default)]
    pub classes: Vec<ClassRecord>,
    #[serde(default)]
    pub images: Vec<ImageRecord>,
    #[serde(default)]
    pub labels: Vec<LabelRecord>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn has_dataset(&self, id: &DatasetId) -> bool {
        self.datasets.iter().any(|dataset| &dataset.id == id)
    }
}

impl Store for Catalog {
    fn allocate_dataset_id(&mut self) -> DatasetId {
        loop {
            let id = DatasetId::new(Uuid::new_v4().simple().to_string());
            if !self.has_dataset(&id) {
                return id;
            }
        }
    }

    fn insert_dataset(&mut self, dataset: DatasetRecord) -> Result<(), YolodexError> {
        if self.has_dataset(&dataset.id) {
            return Err(YolodexError::DatasetExists { id: dataset.id });
        }
        self.datasets.push(dataset);
        Ok(())
    }

    fn insert_classes(&mut self, classes: Vec<ClassRecord>) -> Result<(), YolodexError> {
        self.classes.extend(classes);
        Ok(())
    }

    fn insert_images(&mut self, images: Vec<ImageRecord>) -> Result<(), YolodexError> {
        self.images.extend(images);
        Ok(())
    }

    fn insert_labels(&mut self, labels: Vec<LabelRecord>) -> Result<(), YolodexError> {
        self.labels.extend(labels);
        Ok(())
    }

    fn set_extra_data(&mut self, id: &DatasetId, extra: ExtraData) -> Result<(), YolodexError> {
        let dataset = self
            .datasets
            .iter_mut()
            .find(|dataset| &dataset.id == id)
            .ok_or_else(|| YolodexError::DatasetNotFound { id: id.clone() })?;
        dataset.extra_data = Some(extra);
        Ok(())
    }

    fn datasets(&self) -> Result<Vec<DatasetRecord>, YolodexError> {
        let mut datasets = self.datasets.clone();
        datasets.sort_by(|a, b| b.upload_time.cmp(&a.upload_time));
        Ok(datasets)
    }

    fn dataset(&self, id: &DatasetId) -> Result<Option<DatasetRecord>, YolodexError> {
        Ok(self
            .datasets
            .iter()
            .find(|dataset| &dataset.id == id)
            .cloned())
    }

    fn classes(&self, id: &DatasetId) -> Result<Vec<ClassRecord>, YolodexError> {
        let mut classes: Vec<ClassRecord> = self
            .classes
            .iter()
            .filter(|class| &class.dataset_id == id)
            .cloned()
            .collect();
        classes.sort_by(|a, b| a.class_id.cmp(&b.class_id));
        Ok(classes)
    }

    fn class_counts(&self) -> Result<HashMap<DatasetId, usize>, YolodexError> {
        let mut counts = HashMap::new();
        for class in &self.classes {
            *counts.entry(class.dataset_id.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    fn image_counts(&self) -> Result<HashMap<DatasetId, usize>, YolodexError> {
        let mut counts = HashMap::new();
        for image in &self.images {
            *counts.entry(image.dataset_id.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    fn label_counts(
        &self,
        id: &DatasetId,
        set: ImageSet,
    ) -> Result<BTreeMap<ClassId, usize>, YolodexError> {
        let mut counts = BTreeMap::new();
        for label in &self.labels {
            if &label.dataset_id == id && label.image_set == set {
                *counts.entry(label.class_id.clone()).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    fn images(&self, id: &DatasetId, set: ImageSet) -> Result<Vec<ImageRecord>, YolodexError> {
        let mut images: Vec<ImageRecord> = self
            .images
            .iter()
            .filter(|image| &image.dataset_id == id && image.image_set == set)
            .cloned()
            .collect();
        images.sort_by(|a, b| a.image_name.cmp(&b.image_name));
        Ok(images)
    }

    fn labels(&self, id: &DatasetId, set: ImageSet) -> Result<Vec<LabelRecord>, YolodexError> {
        let mut labels: Vec<LabelRecord> = self
            .labels
            .iter()
            .filter(|label| &label.dataset_id == id && label.image_set == set)
            .cloned()
            .collect();
        labels.sort_by(|a, b| {
            a.image_name
                .cmp(&b.image_name)
                .then_with(|| a.class_id.cmp(&b.class_id))
        });
        Ok(labels)
    }
}
