//! Archive ingestion.
//!
//! An upload is read in one synchronous pass:
//!
//! 1. the task kind picks a [`Layout`] once, up front;
//! 2. the layout's extractor turns the archive into [`Extracted`] entries
//!    (this is the only step that can reject an archive);
//! 3. [`assemble`] stamps the dataset id onto every entry;
//! 4. the [`RecordBatch`] is written to the store as classes, images,
//!    labels, then the manifest extra-data.
//!
//! Nothing is written when steps 1-3 fail. Step 4 is not transactional.

mod assemble;
pub mod classify;
pub mod manifest_layout;
mod report;

pub use assemble::{assemble, RecordBatch};
pub use report::IngestReport;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::archive::{ArchiveReader, ZipArchiveReader};
use crate::error::YolodexError;
use crate::record::{ClassId, DatasetId, DatasetRecord, ExtraData, ImageSet, TaskKind};
use crate::store::Store;

/// How an archive's entries map onto classes, images, and labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    /// `<split>/<class>/<file>` directories.
    Classification,
    /// A `data.yaml` manifest with `images/` and `labels/` trees.
    Manifest,
}

impl Layout {
    pub fn for_task(task: &TaskKind) -> Self {
        match task {
            TaskKind::Classify => Layout::Classification,
            _ => Layout::Manifest,
        }
    }
}

/// A class found by an extractor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassEntry {
    pub class_id: ClassId,
    pub class_name: String,
}

/// An image found by an extractor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageEntry {
    pub image_set: ImageSet,
    pub image_name: String,
    pub source: String,
}

/// A label found by an extractor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelEntry {
    pub image_set: ImageSet,
    pub image_name: String,
    pub class_id: ClassId,
    pub label_data: String,
}

/// Extractor output, not yet tied to a dataset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Extracted {
    pub classes: Vec<ClassEntry>,
    pub images: Vec<ImageEntry>,
    pub labels: Vec<LabelEntry>,
    pub extra_data: Option<ExtraData>,
}

/// Run the extractor selected by `task`.
pub fn extract<A: ArchiveReader + ?Sized>(
    archive: &mut A,
    task: &TaskKind,
) -> Result<Extracted, YolodexError> {
    match Layout::for_task(task) {
        Layout::Classification => Ok(classify::extract_classification(&*archive)),
        Layout::Manifest => manifest_layout::extract_manifest_layout(archive),
    }
}

/// Ingest an archive into a dataset that already exists in the store.
///
/// An unknown `dataset_id` is rejected before anything is read or written.
pub fn ingest_archive<S, A>(
    store: &mut S,
    dataset_id: &DatasetId,
    task: &TaskKind,
    archive: &mut A,
) -> Result<IngestReport, YolodexError>
where
    S: Store + ?Sized,
    A: ArchiveReader + ?Sized,
{
    if store.dataset(dataset_id)?.is_none() {
        return Err(YolodexError::DatasetNotFound {
            id: dataset_id.clone(),
        });
    }

    let extracted = extract(archive, task)?;
    persist(store, dataset_id, task, extracted)
}

/// Details supplied with an upload.
#[derive(Clone, Debug, Default)]
pub struct UploadRequest {
    pub task: TaskKind,
    pub name: String,
    pub description: String,
    /// Defaults to the time the dataset record is created.
    pub upload_time: Option<DateTime<Utc>>,
}

/// Full upload flow for raw zip bytes.
///
/// The dataset record is only created once the archive has been opened and
/// extracted, so a rejected archive leaves nothing behind in the store.
pub fn upload<S: Store + ?Sized>(
    store: &mut S,
    archive_bytes: Vec<u8>,
    request: UploadRequest,
) -> Result<IngestReport, YolodexError> {
    let size = archive_bytes.len() as u64;
    let mut archive = ZipArchiveReader::from_bytes(archive_bytes)?;
    upload_from(store, &mut archive, size, request)
}

/// Upload flow for any archive source. `size` is the stored byte size.
pub fn upload_from<S, A>(
    store: &mut S,
    archive: &mut A,
    size: u64,
    request: UploadRequest,
) -> Result<IngestReport, YolodexError>
where
    S: Store + ?Sized,
    A: ArchiveReader + ?Sized,
{
    let extracted = extract(archive, &request.task)?;

    let dataset_id = store.allocate_dataset_id();
    store.insert_dataset(DatasetRecord {
        id: dataset_id.clone(),
        task: request.task.clone(),
        name: request.name,
        description: request.description,
        upload_time: request.upload_time.unwrap_or_else(Utc::now),
        size,
        extra_data: None,
    })?;

    persist(store, &dataset_id, &request.task, extracted)
}

fn persist<S: Store + ?Sized>(
    store: &mut S,
    dataset_id: &DatasetId,
    task: &TaskKind,
    extracted: Extracted,
) -> Result<IngestReport, YolodexError> {
    let batch = assemble(dataset_id, task, extracted);
    let report = IngestReport::from_batch(&batch);

    store.insert_classes(batch.classes)?;
    store.insert_images(batch.images)?;
    store.insert_labels(batch.labels)?;
    if let Some(extra) = batch.extra_data {
        store.set_extra_data(dataset_id, extra)?;
    }

    info!(
        dataset = %dataset_id,
        task = %task,
        classes = report.classes,
        images = report.images,
        labels = report.labels,
        "ingested dataset"
    );
    Ok(report)
}
