//! Zip archives held fully in memory.

use std::io::{Cursor, Read};

use tracing::debug;
use zip::ZipArchive;

use super::{ArchiveReader, EntryIndex};
use crate::error::YolodexError;

/// Upper bound for the read buffer reserved from an entry's declared size.
const MAX_PREALLOCATION: u64 = 1 << 20;

/// [`ArchiveReader`] over an uploaded zip file.
pub struct ZipArchiveReader {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    index: EntryIndex,
}

impl ZipArchiveReader {
    /// Open a zip archive from its raw bytes.
    ///
    /// The central directory is read eagerly, so a corrupt container fails
    /// here rather than halfway through extraction.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, YolodexError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|source| YolodexError::ArchiveOpen { source })?;

        let mut index = EntryIndex::default();
        for i in 0..archive.len() {
            let entry = archive
                .by_index(i)
                .map_err(|source| YolodexError::ArchiveOpen { source })?;
            index.push(entry.name().to_string(), entry.is_dir());
        }

        debug!(entries = index.len(), "opened zip archive");
        Ok(Self { archive, index })
    }
}

impl ArchiveReader for ZipArchiveReader {
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
        if !self.index.contains(path) {
            return Err(YolodexError::ArchiveEntryMissing {
                entry: path.to_string(),
            });
        }

        let mut entry = self
            .archive
            .by_name(path)
            .map_err(|source| YolodexError::ArchiveEntry {
                entry: path.to_string(),
                source,
            })?;

        // The declared size comes from the container and is not trusted.
        let mut bytes = Vec::with_capacity(entry.size().min(MAX_PREALLOCATION) as usize);
        entry
            .read_to_end(&mut bytes)
            .map_err(|source| YolodexError::ArchiveRead {
                entry: path.to_string(),
                source,
            })?;
        Ok(bytes)
    }
}
