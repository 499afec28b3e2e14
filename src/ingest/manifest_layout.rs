//! Manifest-driven layout: a `data.yaml` naming split image directories,
//! with one `.txt` label file per image under the matching `labels` tree.

use tracing::debug;

use super::{ClassEntry, Extracted, ImageEntry, LabelEntry};
use crate::archive::{file_entries, ArchiveReader};
use crate::error::YolodexError;
use crate::manifest::{parse_manifest, Manifest};
use crate::record::{ClassId, ImageSet};

const MANIFEST_EXTENSIONS: [&str; 2] = ["yaml", "yml"];
const LABEL_EXTENSION: &str = "txt";

/// Extract classes, images, and labels from a manifest-driven archive.
///
/// Fails only when the manifest cannot be located or parsed, or when the
/// container cannot be read. Missing label files and odd label lines are
/// absorbed: the image is kept with whatever labels could be read.
pub fn extract_manifest_layout<A: ArchiveReader + ?Sized>(
    archive: &mut A,
) -> Result<Extracted, YolodexError> {
    let manifest_entry = locate_manifest(archive)?;
    let bytes = archive
        .read(&manifest_entry)
        .map_err(|source| YolodexError::ManifestUnreadable {
            entry: manifest_entry.clone(),
            source: Box::new(source),
        })?;
    let manifest = parse_manifest(&bytes, &manifest_entry)?;
    debug!(entry = %manifest_entry, "parsed manifest");

    extract_with_manifest(archive, &manifest, dir_prefix(&manifest_entry))
}

/// Extract against an already parsed manifest located at `prefix`.
pub fn extract_with_manifest<A: ArchiveReader + ?Sized>(
    archive: &mut A,
    manifest: &Manifest,
    prefix: &str,
) -> Result<Extracted, YolodexError> {
    let classes = manifest
        .names
        .iter()
        .flatten()
        .map(|(index, name)| ClassEntry {
            class_id: ClassId::Index(*index),
            class_name: name.clone(),
        })
        .collect();

    let files = file_entries(archive);
    let mut images = Vec::new();
    let mut labels = Vec::new();

    for set in ImageSet::ALL {
        let Some(dir_value) = manifest.split_dir(set) else {
            continue;
        };

        let image_dir = resolve_dir(prefix, dir_value);
        let label_dir = resolve_dir(prefix, &dir_value.replacen("images", "labels", 1));
        debug!(split = %set, image_dir = %image_dir, label_dir = %label_dir, "resolved split");

        for path in &files {
            let Some(image_name) = path.strip_prefix(image_dir.as_str()) else {
                continue;
            };
            if image_name.is_empty() {
                continue;
            }

            images.push(ImageEntry {
                image_set: set,
                image_name: image_name.to_string(),
                source: path.clone(),
            });

            let label_path = format!("{}{}", label_dir, label_file_name(image_name));
            if !archive.entry_exists(&label_path) || archive.is_directory(&label_path) {
                debug!(image = %path, label = %label_path, "no label file; image is unlabeled");
                continue;
            }

            let contents = archive.read(&label_path)?;
            let text = String::from_utf8_lossy(&contents);
            labels.extend(
                text.lines()
                    .filter_map(parse_label_line)
                    .map(|(class_id, label_data)| LabelEntry {
                        image_set: set,
                        image_name: image_name.to_string(),
                        class_id,
                        label_data,
                    }),
            );
        }
    }

    Ok(Extracted {
        classes,
        images,
        labels,
        extra_data: Some(manifest.extra_data()),
    })
}

/// Find the single top-level manifest of an archive.
///
/// Candidates are `.yaml`/`.yml` files; only the shallowest ones count, so
/// configs nested inside the image tree do not compete with the dataset's
/// own manifest.
pub fn locate_manifest<A: ArchiveReader + ?Sized>(archive: &A) -> Result<String, YolodexError> {
    let candidates: Vec<String> = file_entries(archive)
        .into_iter()
        .filter(|path| has_manifest_extension(path))
        .collect();

    let Some(top_depth) = candidates.iter().map(|path| depth(path)).min() else {
        return Err(YolodexError::ManifestMissing);
    };

    let mut top_level: Vec<String> = candidates
        .into_iter()
        .filter(|path| depth(path) == top_depth)
        .collect();

    if top_level.len() > 1 {
        top_level.sort();
        return Err(YolodexError::ManifestAmbiguous {
            candidates: top_level,
        });
    }

    top_level.pop().ok_or(YolodexError::ManifestMissing)
}

/// Parse one label line into its class id and trimmed raw text.
///
/// Blank lines yield `None`. The first token is the class id; everything
/// after it is opaque payload kept in the raw text.
fn parse_label_line(line: &str) -> Option<(ClassId, String)> {
    let trimmed = line.trim();
    let token = trimmed.split_whitespace().next()?;
    Some((ClassId::parse(token), trimmed.to_string()))
}

/// Fuzz-only entrypoint for label line parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_label_line(input: &str) -> Option<String> {
    parse_label_line(input).map(|(class_id, _)| class_id.to_string())
}

fn has_manifest_extension(path: &str) -> bool {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let Some((stem, ext)) = file_name.rsplit_once('.') else {
        return false;
    };
    !stem.is_empty()
        && MANIFEST_EXTENSIONS
            .iter()
            .any(|allowed| ext.eq_ignore_ascii_case(allowed))
}

fn depth(path: &str) -> usize {
    path.matches('/').count()
}

/// Directory part of an entry path, including the trailing `/`.
fn dir_prefix(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[..=pos],
        None => "",
    }
}

/// Join a manifest directory value onto the manifest's prefix.
///
/// `.` segments and empty segments are dropped and `..` pops a segment
/// (never above the archive root). The result ends with `/`, or is empty
/// for the archive root.
fn resolve_dir(prefix: &str, value: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in prefix.split('/').chain(value.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        String::new()
    } else {
        format!("{}/", segments.join("/"))
    }
}

/// Label file name for an image: extension replaced by `.txt`, or `.txt`
/// appended when the file has no extension.
fn label_file_name(image_name: &str) -> String {
    let file_start = image_name.rfind('/').map_or(0, |pos| pos + 1);
    let stem = match image_name[file_start..].rfind('.') {
        Some(dot) if dot > 0 => &image_name[..file_start + dot],
        _ => image_name,
    };
    format!("{}.{}", stem, LABEL_EXTENSION)
}
