//! Persistence for ingested datasets.
//!
//! Ingestion writes through the [`Store`] trait and the display joins read
//! through it. The handle is always passed in explicitly; whoever opens it
//! (the CLI, a test, a server) owns its lifecycle.
//!
//! There is no transaction across collections. If a write fails halfway
//! through a batch, what was already written stays written.

mod catalog;
mod json;

pub use catalog::Catalog;
pub use json::JsonStore;

use std::collections::{BTreeMap, HashMap};

use crate::error::YolodexError;
use crate::record::{
    ClassId, ClassRecord, DatasetId, DatasetRecord, ExtraData, ImageRecord, ImageSet, LabelRecord,
};

/// Read and write access to the dataset catalog.
pub trait Store {
    /// Reserve a fresh, unused dataset id.
    fn allocate_dataset_id(&mut self) -> DatasetId;

    fn insert_dataset(&mut self, dataset: DatasetRecord) -> Result<(), YolodexError>;

    fn insert_classes(&mut self, classes: Vec<ClassRecord>) -> Result<(), YolodexError>;

    fn insert_images(&mut self, images: Vec<ImageRecord>) -> Result<(), YolodexError>;

    fn insert_labels(&mut self, labels: Vec<LabelRecord>) -> Result<(), YolodexError>;

    /// Attach manifest metadata to an existing dataset.
    fn set_extra_data(&mut self, id: &DatasetId, extra: ExtraData) -> Result<(), YolodexError>;

    /// All datasets, newest upload first.
    fn datasets(&self) -> Result<Vec<DatasetRecord>, YolodexError>;

    fn dataset(&self, id: &DatasetId) -> Result<Option<DatasetRecord>, YolodexError>;

    /// Class table of a dataset, ordered by class id.
    fn classes(&self, id: &DatasetId) -> Result<Vec<ClassRecord>, YolodexError>;

    /// Number of classes per dataset. Datasets without classes are absent.
    fn class_counts(&self) -> Result<HashMap<DatasetId, usize>, YolodexError>;

    /// Number of images per dataset. Datasets without images are absent.
    fn image_counts(&self) -> Result<HashMap<DatasetId, usize>, YolodexError>;

    /// Number of labels per class id within one split.
    fn label_counts(
        &self,
        id: &DatasetId,
        set: ImageSet,
    ) -> Result<BTreeMap<ClassId, usize>, YolodexError>;

    /// Images of one split, ordered by image name.
    fn images(&self, id: &DatasetId, set: ImageSet) -> Result<Vec<ImageRecord>, YolodexError>;

    /// Labels of one split, ordered by image name then class id.
    fn labels(&self, id: &DatasetId, set: ImageSet) -> Result<Vec<LabelRecord>, YolodexError>;

    /// Class id to name lookup for a dataset.
    fn class_names(&self, id: &DatasetId) -> Result<BTreeMap<ClassId, String>, YolodexError> {
        Ok(self
            .classes(id)?
            .into_iter()
            .map(|class| (class.class_id, class.class_name))
            .collect())
    }
}
