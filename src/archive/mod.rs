//! Read access to uploaded dataset containers.
//!
//! Extractors only see the [`ArchiveReader`] contract: a flat list of
//! `/`-separated entry paths, existence and directory checks, and on-demand
//! reads. The zip reader is what uploads go through; [`MemoryArchive`] and
//! [`DirArchive`] implement the same contract for tests and for datasets that
//! were already unpacked on disk.

mod dir;
mod memory;
mod zip_reader;

pub use dir::DirArchive;
pub use memory::MemoryArchive;
pub use zip_reader::ZipArchiveReader;

use std::collections::HashMap;

use crate::error::YolodexError;

/// Minimal read-only view of an archive.
pub trait ArchiveReader {
    /// All entry paths in container order, directories included.
    fn list_entries(&self) -> Vec<String>;

    /// True if an entry with exactly this path was stored.
    fn entry_exists(&self, path: &str) -> bool;

    /// True if `path` was stored as a directory or ends with `/`.
    fn is_directory(&self, path: &str) -> bool;

    /// Read the full contents of a stored file entry.
    fn read(&mut self, path: &str) -> Result<Vec<u8>, YolodexError>;
}

/// Entry listing shared by the concrete readers.
#[derive(Clone, Debug, Default)]
pub(crate) struct EntryIndex {
    names: Vec<String>,
    is_dir: HashMap<String, bool>,
}

impl EntryIndex {
    pub(crate) fn push(&mut self, name: String, is_dir: bool) {
        let is_dir = is_dir || name.ends_with('/');
        if self.is_dir.insert(name.clone(), is_dir).is_none() {
            self.names.push(name);
        }
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.names.clone()
    }

    pub(crate) fn contains(&self, path: &str) -> bool {
        self.is_dir.contains_key(path)
    }

    pub(crate) fn is_directory(&self, path: &str) -> bool {
        path.ends_with('/') || self.is_dir.get(path).copied().unwrap_or(false)
    }

    pub(crate) fn len(&self) -> usize {
        self.names.len()
    }
}

/// Entries under these prefixes are packaging noise, not dataset content.
const IGNORED_PREFIXES: [&str; 1] = ["__MACOSX/"];

/// True if `path` can hold dataset content (images, labels, manifests).
pub fn is_relevant_entry(path: &str) -> bool {
    !IGNORED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// Non-directory, relevant entries of an archive in container order.
pub fn file_entries<A: ArchiveReader + ?Sized>(archive: &A) -> Vec<String> {
    archive
        .list_entries()
        .into_iter()
        .filter(|path| is_relevant_entry(path) && !archive.is_directory(path))
        .collect()
}
