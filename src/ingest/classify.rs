//! Classification layout: `<split>/<class>/<file>`.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::debug;

use super::{ClassEntry, Extracted, ImageEntry, LabelEntry};
use crate::archive::{file_entries, ArchiveReader};
use crate::record::{ClassId, ImageSet};

struct ClassifiedEntry {
    image_set: ImageSet,
    class_name: String,
    file: String,
    source: String,
}

/// Extract classes, images, and labels from a classification archive.
///
/// Class ids are the rank of the class directory name in sorted order, so
/// identical archive contents always produce the same assignment. Entries
/// outside `train`/`val`/`test` are ignored.
pub fn extract_classification<A: ArchiveReader + ?Sized>(archive: &A) -> Extracted {
    let mut rows = Vec::new();
    for path in file_entries(archive) {
        match split_entry(&path) {
            Some(row) => rows.push(row),
            None => debug!(entry = %path, "skipping entry outside <split>/<class>/<file>"),
        }
    }

    let class_names: BTreeSet<&str> = rows.iter().map(|row| row.class_name.as_str()).collect();
    let class_ids: BTreeMap<&str, u64> = class_names
        .iter()
        .enumerate()
        .map(|(rank, name)| (*name, rank as u64))
        .collect();

    let classes = class_ids
        .iter()
        .map(|(name, id)| ClassEntry {
            class_id: ClassId::Index(*id),
            class_name: (*name).to_string(),
        })
        .collect();

    let mut images = Vec::new();
    let mut labels = Vec::with_capacity(rows.len());
    let mut seen_images: HashSet<(ImageSet, &str)> = HashSet::new();

    for row in &rows {
        // The same file name under two classes is one image with two labels.
        if seen_images.insert((row.image_set, row.file.as_str())) {
            images.push(ImageEntry {
                image_set: row.image_set,
                image_name: row.file.clone(),
                source: row.source.clone(),
            });
        }

        labels.push(LabelEntry {
            image_set: row.image_set,
            image_name: row.file.clone(),
            class_id: ClassId::Index(class_ids[row.class_name.as_str()]),
            label_data: String::new(),
        });
    }

    Extracted {
        classes,
        images,
        labels,
        extra_data: None,
    }
}

fn split_entry(path: &str) -> Option<ClassifiedEntry> {
    let mut parts = path.splitn(3, '/');
    let split = parts.next()?;
    let class_name = parts.next()?;
    let file = parts.next()?;

    if class_name.is_empty() || file.is_empty() {
        return None;
    }
    let image_set = split.parse::<ImageSet>().ok()?;

    Some(ClassifiedEntry {
        image_set,
        class_name: class_name.to_string(),
        file: file.to_string(),
        source: path.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::MemoryArchive;

    fn class_table(extracted: &Extracted) -> Vec<(u64, &str)> {
        extracted
            .classes
            .iter()
            .map(|class| {
                (
                    class.class_id.as_index().expect("index class id"),
                    class.class_name.as_str(),
                )
            })
            .collect()
    }

    #[test]
    fn assigns_ids_by_sorted_class_name() {
        let archive = MemoryArchive::new()
            .with_file("train/dog/1.jpg", b"x")
            .with_file("train/cat/2.jpg", b"x")
            .with_file("val/bird/3.jpg", b"x");

        let extracted = extract_classification(&archive);
        assert_eq!(
            class_table(&extracted),
            vec![(0, "bird"), (1, "cat"), (2, "dog")]
        );
    }

    #[test]
    fn builds_one_image_and_label_per_file() {
        let archive = MemoryArchive::new()
            .with_file("train/cat/a.jpg", b"x")
            .with_file("train/dog/b.jpg", b"x");

        let extracted = extract_classification(&archive);
        assert_eq!(class_table(&extracted), vec![(0, "cat"), (1, "dog")]);

        assert_eq!(extracted.images.len(), 2);
        assert_eq!(extracted.images[0].image_set, ImageSet::Train);
        assert_eq!(extracted.images[0].image_name, "a.jpg");
        assert_eq!(extracted.images[0].source, "train/cat/a.jpg");
        assert_eq!(extracted.images[1].image_name, "b.jpg");

        assert_eq!(extracted.labels.len(), 2);
        assert_eq!(extracted.labels[0].image_name, "a.jpg");
        assert_eq!(extracted.labels[0].class_id, ClassId::Index(0));
        assert_eq!(extracted.labels[0].label_data, "");
        assert_eq!(extracted.labels[1].image_name, "b.jpg");
        assert_eq!(extracted.labels[1].class_id, ClassId::Index(1));
        assert!(extracted.extra_data.is_none());
    }

    #[test]
    fn keeps_nested_paths_in_file_name() {
        let archive = MemoryArchive::new().with_file("test/cat/sub/dir/a.png", b"x");

        let extracted = extract_classification(&archive);
        assert_eq!(extracted.images[0].image_name, "sub/dir/a.png");
        assert_eq!(extracted.images[0].source, "test/cat/sub/dir/a.png");
    }

    #[test]
    fn ignores_unknown_splits_shallow_paths_and_directories() {
        let archive = MemoryArchive::new()
            .with_dir("train/")
            .with_dir("train/cat/")
            .with_file("train/cat/a.jpg", b"x")
            .with_file("valid/dog/b.jpg", b"x")
            .with_file("train/readme.txt", b"x")
            .with_file("mnist/train/cat/c.jpg", b"x");

        let extracted = extract_classification(&archive);
        assert_eq!(class_table(&extracted), vec![(0, "cat")]);
        assert_eq!(extracted.images.len(), 1);
        assert_eq!(extracted.labels.len(), 1);
    }

    #[test]
    fn same_file_under_two_classes_is_one_image() {
        let archive = MemoryArchive::new()
            .with_file("train/cat/a.jpg", b"x")
            .with_file("train/dog/a.jpg", b"x");

        let extracted = extract_classification(&archive);
        assert_eq!(extracted.images.len(), 1);
        assert_eq!(extracted.labels.len(), 2);
        assert_eq!(extracted.labels[1].class_id, ClassId::Index(1));
    }

    #[test]
    fn assignment_is_stable_across_runs() {
        let archive = MemoryArchive::new()
            .with_file("val/zebra/1.jpg", b"x")
            .with_file("train/ant/2.jpg", b"x")
            .with_file("test/moose/3.jpg", b"x");

        let first = extract_classification(&archive);
        let second = extract_classification(&archive);
        assert_eq!(first.classes, second.classes);
        assert_eq!(first.labels, second.labels);
    }

    #[test]
    fn empty_archive_yields_nothing() {
        let extracted = extract_classification(&MemoryArchive::new());
        assert!(extracted.classes.is_empty());
        assert!(extracted.images.is_empty());
        assert!(extracted.labels.is_empty());
    }
}
