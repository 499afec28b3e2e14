//! Flat records written to and read back from the catalog.
//!
//! Every record carries its dataset id so the three collections can be
//! stored side by side and filtered per dataset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ClassId, DatasetId, ImageSet, TaskKind};

/// An uploaded dataset.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub id: DatasetId,

    pub task: TaskKind,

    /// Display name given at upload time.
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub upload_time: DateTime<Utc>,

    /// Raw size of the uploaded archive in bytes.
    pub size: u64,

    /// Manifest metadata, set once after a manifest-driven ingestion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_data: Option<ExtraData>,
}

/// Subset of manifest keys kept alongside a dataset.
///
/// The passthrough values are opaque and stored exactly as parsed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtraData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kpt_shape: Option<serde_yaml::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flip_idx: Option<serde_yaml::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download: Option<serde_yaml::Value>,
}

/// One entry of a dataset's class table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub dataset_id: DatasetId,
    pub class_id: ClassId,
    pub class_name: String,
}

/// One image of one split.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub dataset_id: DatasetId,
    pub image_set: ImageSet,

    /// Path relative to the split directory.
    pub image_name: String,

    /// Full path of the image inside the uploaded archive.
    pub source: String,
}

/// One labelled object on an image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRecord {
    pub dataset_id: DatasetId,
    pub image_set: ImageSet,
    pub image_name: String,
    pub class_id: ClassId,

    /// The trimmed label line, or empty for classification labels.
    #[serde(default)]
    pub label_data: String,
}
