//! In-memory archive used by tests, benches, and fuzz targets.

use std::collections::HashMap;

use super::{ArchiveReader, EntryIndex};
use crate::error::YolodexError;

/// An [`ArchiveReader`] backed by a map of entry path to contents.
#[derive(Clone, Debug, Default)]
pub struct MemoryArchive {
    index: EntryIndex,
    files: HashMap<String, Vec<u8>>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file entry.
    pub fn with_file(mut self, path: impl Into<String>, contents: impl AsRef<[u8]>) -> Self {
        self.insert_file(path, contents);
        self
    }

    /// Adds an explicit directory entry.
    pub fn with_dir(mut self, path: impl Into<String>) -> Self {
        self.index.push(path.into(), true);
        self
    }

    pub fn insert_file(&mut self, path: impl Into<String>, contents: impl AsRef<[u8]>) {
        let path = path.into();
        self.index.push(path.clone(), false);
        self.files.insert(path, contents.as_ref().to_vec());
    }
}

impl ArchiveReader for MemoryArchive {
    fn list_entries(&self) -> Vec<String> {
        self.index.names()
    }

    fn entry_exists(&self, path: &str) -> bool {
        self.index.contains(path)
    }

    fn is_directory(&self, path: &str) -> bool {
        self.index.is_directory(path)
    }

    fn read(&mut self, path: &str) -> Result<Vec<u8>, YolodexError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| YolodexError::ArchiveEntryMissing {
                entry: path.to_string(),
            })
    }
}
