use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Catalog, Store};
use crate::error::YolodexError;
use crate::record::{
    ClassId, ClassRecord, DatasetId, DatasetRecord, ExtraData, ImageRecord, ImageSet, LabelRecord,
};

/// A [`Catalog`] persisted as one pretty-printed JSON file.
///
/// The file is rewritten after every write call. A missing file reads as an
/// empty catalog and is created on the first write.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    catalog: Catalog,
}

impl JsonStore {
    pub fn open(path: &Path) -> Result<Self, YolodexError> {
        let catalog = match fs::read_to_string(path) {
            Ok(text) => {
                serde_json::from_str(&text).map_err(|source| YolodexError::StoreRead {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Catalog::default(),
            Err(err) => return Err(YolodexError::Io(err)),
        };

        Ok(Self {
            path: path.to_path_buf(),
            catalog,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn save(&self) -> Result<(), YolodexError> {
        let text =
            serde_json::to_string_pretty(&self.catalog).map_err(|source| {
                YolodexError::StoreWrite {
                    path: self.path.clone(),
                    source,
                }
            })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, text)?;
        debug!(path = %self.path.display(), "saved catalog");
        Ok(())
    }
}

impl Store for JsonStore {
    fn allocate_dataset_id(&mut self) -> DatasetId {
        self.catalog.allocate_dataset_id()
    }

    fn insert_dataset(&mut self, dataset: DatasetRecord) -> Result<(), YolodexError> {
        self.catalog.insert_dataset(dataset)?;
        self.save()
    }

    fn insert_classes(&mut self, classes: Vec<ClassRecord>) -> Result<(), YolodexError> {
        self.catalog.insert_classes(classes)?;
        self.save()
    }

    fn insert_images(&mut self, images: Vec<ImageRecord>) -> Result<(), YolodexError> {
        self.catalog.insert_images(images)?;
        self.save()
    }

    fn insert_labels(&mut self, labels: Vec<LabelRecord>) -> Result<(), YolodexError> {
        self.catalog.insert_labels(labels)?;
        self.save()
    }

    fn set_extra_data(&mut self, id: &DatasetId, extra: ExtraData) -> Result<(), YolodexError> {
        self.catalog.set_extra_data(id, extra)?;
        self.save()
    }

    fn datasets(&self) -> Result<Vec<DatasetRecord>, YolodexError> {
        self.catalog.datasets()
    }

    fn dataset(&self, id: &DatasetId) -> Result<Option<DatasetRecord>, YolodexError> {
        self.catalog.dataset(id)
    }

    fn classes(&self, id: &DatasetId) -> Result<Vec<ClassRecord>, YolodexError> {
        self.catalog.classes(id)
    }

    fn class_counts(&self) -> Result<HashMap<DatasetId, usize>, YolodexError> {
        self.catalog.class_counts()
    }

    fn image_counts(&self) -> Result<HashMap<DatasetId, usize>, YolodexError> {
        self.catalog.image_counts()
    }

    fn label_counts(
        &self,
        id: &DatasetId,
        set: ImageSet,
    ) -> Result<BTreeMap<ClassId, usize>, YolodexError> {
        self.catalog.label_counts(id, set)
    }

    fn images(&self, id: &DatasetId, set: ImageSet) -> Result<Vec<ImageRecord>, YolodexError> {
        self.catalog.images(id, set)
    }

    fn labels(&self, id: &DatasetId, set: ImageSet) -> Result<Vec<LabelRecord>, YolodexError> {
        self.catalog.labels(id, set)
    }
}
