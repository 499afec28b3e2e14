//! Identifier and tag types shared by every record kind.
//!
//! Using newtypes keeps dataset keys, class ids, and split names from being
//! mixed up with the plain strings that flow through the archive walkers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque key of a dataset, allocated by the store.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(String);

impl DatasetId {
    /// Creates a new DatasetId.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the underlying key.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DatasetId({})", self.0)
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DatasetId {
    fn from(id: &str) -> Self {
        DatasetId::new(id)
    }
}

/// Class identifier as it appears in label files.
///
/// Class tables only ever hold [`ClassId::Index`]. A label line whose first
/// token is not purely numeric keeps that token verbatim as
/// [`ClassId::Token`]; such ids are not reconciled against the class table.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassId {
    Index(u64),
    Token(String),
}

impl ClassId {
    /// Parses a label token: digits-only tokens become an index, anything
    /// else (including values that overflow `u64`) is kept as a token.
    pub fn parse(token: &str) -> Self {
        if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = token.parse::<u64>() {
                return ClassId::Index(index);
            }
        }
        ClassId::Token(token.to_string())
    }

    /// Returns the numeric index, if this is not a fallback token.
    pub fn as_index(&self) -> Option<u64> {
        match self {
            ClassId::Index(index) => Some(*index),
            ClassId::Token(_) => None,
        }
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassId::Index(index) => write!(f, "ClassId({})", index),
            ClassId::Token(token) => write!(f, "ClassId({:?})", token),
        }
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassId::Index(index) => write!(f, "{}", index),
            ClassId::Token(token) => f.write_str(token),
        }
    }
}

impl From<u64> for ClassId {
    fn from(index: u64) -> Self {
        ClassId::Index(index)
    }
}

/// A dataset partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSet {
    Train,
    Val,
    Test,
}

impl ImageSet {
    /// All splits in canonical order.
    pub const ALL: [ImageSet; 3] = [ImageSet::Train, ImageSet::Val, ImageSet::Test];

    pub fn as_str(self) -> &'static str {
        match self {
            ImageSet::Train => "train",
            ImageSet::Val => "val",
            ImageSet::Test => "test",
        }
    }
}

impl fmt::Display for ImageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train" => Ok(ImageSet::Train),
            "val" => Ok(ImageSet::Val),
            "test" => Ok(ImageSet::Test),
            other => Err(format!(
                "'{}' is not an image set (expected train, val, or test)",
                other
            )),
        }
    }
}

/// The task a dataset was annotated for.
///
/// Only `classify` changes how an archive is read; every other task,
/// including unknown ones, uses the manifest-driven layout.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskKind {
    #[default]
    Detect,
    Segment,
    Classify,
    Pose,
    Obb,
    Other(String),
}

impl TaskKind {
    pub fn as_str(&self) -> &str {
        match self {
            TaskKind::Detect => "detect",
            TaskKind::Segment => "segment",
            TaskKind::Classify => "classify",
            TaskKind::Pose => "pose",
            TaskKind::Obb => "obb",
            TaskKind::Other(name) => name,
        }
    }
}

impl From<&str> for TaskKind {
    fn from(raw: &str) -> Self {
        match raw.trim() {
            "detect" => TaskKind::Detect,
            "segment" => TaskKind::Segment,
            "classify" => TaskKind::Classify,
            "pose" => TaskKind::Pose,
            "obb" => TaskKind::Obb,
            other => TaskKind::Other(other.to_string()),
        }
    }
}

impl From<String> for TaskKind {
    fn from(raw: String) -> Self {
        TaskKind::from(raw.as_str())
    }
}

impl From<TaskKind> for String {
    fn from(task: TaskKind) -> Self {
        task.as_str().to_string()
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
