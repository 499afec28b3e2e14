//! Datasets that were already unpacked into a directory.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{ArchiveReader, EntryIndex};
use crate::error::YolodexError;

/// [`ArchiveReader`] over a directory tree.
///
/// Entry paths are relative to the root, `/`-separated, and directories are
/// listed with a trailing `/` the way zip tools store them.
#[derive(Clone, Debug)]
pub struct DirArchive {
    root: PathBuf,
    index: EntryIndex,
    total_size: u64,
}

impl DirArchive {
    /// Scan `root` recursively. Entries are listed in file-name order.
    pub fn open(root: &Path) -> Result<Self, YolodexError> {
        if !root.is_dir() {
            return Err(YolodexError::DirectoryScan {
                path: root.to_path_buf(),
                message: "input must be a directory".to_string(),
            });
        }

        let mut index = EntryIndex::default();
        let mut total_size = 0u64;

        for entry in WalkDir::new(root)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|source| YolodexError::DirectoryScan {
                path: root.to_path_buf(),
                message: format!("failed while traversing directory: {source}"),
            })?;

            let rel = rel_string(root, entry.path());
            if entry.file_type().is_dir() {
                index.push(format!("{}/", rel), true);
            } else if entry.file_type().is_file() {
                let len = entry
                    .metadata()
                    .map(|meta| meta.len())
                    .map_err(|source| YolodexError::DirectoryScan {
                        path: entry.path().to_path_buf(),
                        message: format!("failed reading metadata: {source}"),
                    })?;
                total_size += len;
                index.push(rel, false);
            }
        }

        Ok(Self {
            root: root.to_path_buf(),
            index,
            total_size,
        })
    }

    /// Sum of all file sizes, the directory's stand-in for an upload size.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }
}

impl ArchiveReader for DirArchive {
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
        if !self.index.contains(path) || self.index.is_directory(path) {
            return Err(YolodexError::ArchiveEntryMissing {
                entry: path.to_string(),
            });
        }

        fs::read(self.root.join(path)).map_err(|source| YolodexError::ArchiveRead {
            entry: path.to_string(),
            source,
        })
    }
}

fn rel_string(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}
