//! Catalog records for ingested datasets.
//!
//! Ingestion normalizes both archive layouts into three flat collections
//! (classes, images, labels) plus one [`DatasetRecord`] per upload. The
//! records here are what the store persists and the display joins read.
//!
//! # Example
//!
//! ```
//! use yolodex::record::{ClassId, ClassRecord, DatasetId, ImageRecord, ImageSet};
//!
//! let dataset_id = DatasetId::new("ds-1");
//! let class = ClassRecord {
//!     dataset_id: dataset_id.clone(),
//!     class_id: ClassId::Index(0),
//!     class_name: "person".into(),
//! };
//! let image = ImageRecord {
//!     dataset_id,
//!     image_set: ImageSet::Train,
//!     image_name: "x.jpg".into(),
//!     source: "images/train/x.jpg".into(),
//! };
//! assert_eq!(class.dataset_id, image.dataset_id);
//! ```

mod ids;
mod model;

pub use ids::{ClassId, DatasetId, ImageSet, TaskKind};
pub use model::{ClassRecord, DatasetRecord, ExtraData, ImageRecord, LabelRecord};
