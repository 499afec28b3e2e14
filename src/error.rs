use std::path::PathBuf;
use thiserror::Error;

use crate::record::DatasetId;

/// The main error type for yolodex operations.
#[derive(Debug, Error)]
pub enum YolodexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to open archive: {source}")]
    ArchiveOpen {
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to locate archive entry '{entry}': {source}")]
    ArchiveEntry {
        entry: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to read archive entry '{entry}': {source}")]
    ArchiveRead {
        entry: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Archive entry '{entry}' does not exist")]
    ArchiveEntryMissing { entry: String },

    #[error("Failed to scan dataset directory {path}: {message}")]
    DirectoryScan { path: PathBuf, message: String },

    #[error("No manifest (.yaml/.yml) found in archive")]
    ManifestMissing,

    #[error("Multiple manifests found in archive: {}", candidates.join(", "))]
    ManifestAmbiguous { candidates: Vec<String> },

    #[error("Failed to parse manifest '{entry}': {source}")]
    ManifestParse {
        entry: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to read manifest '{entry}': {source}")]
    ManifestUnreadable {
        entry: String,
        #[source]
        source: Box<YolodexError>,
    },

    #[error("Invalid manifest '{entry}': {message}")]
    ManifestInvalid { entry: String, message: String },

    #[error("Failed to read catalog from {path}: {source}")]
    StoreRead {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write catalog to {path}: {source}")]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Dataset '{id}' not found")]
    DatasetNotFound { id: DatasetId },

    #[error("Dataset '{id}' already exists")]
    DatasetExists { id: DatasetId },

    #[error("Failed to render JSON output: {0}")]
    JsonOutput(#[source] serde_json::Error),

    #[error("Unsupported output format: {0}")]
    UnsupportedOutput(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl YolodexError {
    /// True when the container itself could not be opened or read.
    pub fn is_archive_error(&self) -> bool {
        matches!(
            self,
            YolodexError::ArchiveOpen { .. }
                | YolodexError::ArchiveEntry { .. }
                | YolodexError::ArchiveRead { .. }
                | YolodexError::ArchiveEntryMissing { .. }
                | YolodexError::DirectoryScan { .. }
        )
    }

    /// True when the manifest was missing, duplicated, unreadable, or malformed.
    pub fn is_manifest_error(&self) -> bool {
        matches!(
            self,
            YolodexError::ManifestMissing
                | YolodexError::ManifestAmbiguous { .. }
                | YolodexError::ManifestParse { .. }
                | YolodexError::ManifestUnreadable { .. }
                | YolodexError::ManifestInvalid { .. }
        )
    }
}
