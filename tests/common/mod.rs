#![allow(dead_code)]

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Build an in-memory zip with the given directory entries and files.
pub fn zip_bytes(files: &[(&str, &[u8])], dirs: &[&str]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for dir in dirs {
        writer.add_directory(*dir, options).expect("add directory");
    }
    for (name, data) in files {
        writer.start_file(*name, options).expect("start file");
        writer.write_all(data).expect("write file");
    }
    writer.finish().expect("finish zip").into_inner()
}

pub fn write_zip(path: &Path, files: &[(&str, &[u8])]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, zip_bytes(files, &[])).expect("write zip file");
}

/// A small detection dataset in the manifest layout.
pub const DETECT_DATASET: &[(&str, &[u8])] = &[
    (
        "data.yaml",
        b"train: images/train\nval: images/val\nnames:\n  0: person\n  1: car\n",
    ),
    ("images/train/x.jpg", b"jpeg"),
    ("images/train/y.jpg", b"jpeg"),
    ("images/val/z.jpg", b"jpeg"),
    (
        "labels/train/x.txt",
        b"0 0.5 0.5 0.2 0.2\n1 0.1 0.1 0.05 0.05\n",
    ),
    ("labels/val/z.txt", b"1 0.3 0.3 0.1 0.1\n"),
];

/// A small classification dataset.
pub const CLASSIFY_DATASET: &[(&str, &[u8])] = &[
    ("train/cat/a.jpg", b"jpeg"),
    ("train/dog/b.jpg", b"jpeg"),
    ("val/bird/c.jpg", b"jpeg"),
];
