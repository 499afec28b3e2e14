use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;

mod common;

fn yolodex(store: &Path) -> Command {
    let mut cmd = Command::cargo_bin("yolodex").unwrap();
    cmd.env_remove("YOLODEX_STORE").arg("--store").arg(store);
    cmd
}

fn ingest_json(store: &Path, archive: &Path, task: &str) -> serde_json::Value {
    let output = yolodex(store)
        .args(["ingest", "--task", task, "--output", "json"])
        .arg(archive)
        .output()
        .expect("run ingest");
    assert!(
        output.status.success(),
        "ingest failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("parse ingest report")
}

#[test]
fn runs() {
    let mut cmd = Command::cargo_bin("yolodex").unwrap();
    cmd.assert().success().stdout(contains("yolodex 0.1.0"));
}

#[test]
fn outputs_tool_name() {
    let mut cmd = Command::cargo_bin("yolodex").unwrap();
    cmd.arg("-V");
    cmd.assert().success().stdout("yolodex 0.1.0\n");
}

#[test]
fn ingest_zip_prints_text_report() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let archive = temp.path().join("street.zip");
    common::write_zip(&archive, common::DETECT_DATASET);

    yolodex(&temp.path().join("catalog.json"))
        .args(["ingest", "--name", "street"])
        .arg(&archive)
        .assert()
        .success()
        .stdout(contains("Ingested dataset"))
        .stdout(contains("classes: 2"))
        .stdout(contains("unlabeled images: 1"));

    assert!(temp.path().join("catalog.json").is_file());
}

#[test]
fn ingested_dataset_is_browsable() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let store = temp.path().join("catalog.json");
    let archive = temp.path().join("street.zip");
    common::write_zip(&archive, common::DETECT_DATASET);

    let report = ingest_json(&store, &archive, "detect");
    let id = report["dataset_id"].as_str().expect("dataset id").to_string();
    assert_eq!(report["images"], 3);
    assert_eq!(report["labels"], 3);

    let output = yolodex(&store)
        .args(["list", "--output", "json"])
        .output()
        .expect("run list");
    assert!(output.status.success());
    let list: serde_json::Value = serde_json::from_slice(&output.stdout).expect("parse list");
    assert_eq!(list[0]["id"], id.as_str());
    assert_eq!(list[0]["name"], "street.zip");
    assert_eq!(list[0]["classes_count"], 2);
    assert_eq!(list[0]["images_count"], 3);

    yolodex(&store)
        .args(["classes", &id, "--set", "val"])
        .assert()
        .success()
        .stdout(contains("person"))
        .stdout(contains("car"));

    yolodex(&store)
        .args(["images", &id, "--class", "1"])
        .assert()
        .success()
        .stdout(contains("x.jpg"))
        .stdout(contains("person, car"))
        .stdout(contains("y.jpg").not());

    yolodex(&store)
        .args(["show", &id])
        .assert()
        .success()
        .stdout(contains("train:"))
        .stdout(contains("images/train"));
}

#[test]
fn ingest_directory_uses_same_layout_rules() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let root = temp.path().join("animals");
    for (name, data) in common::CLASSIFY_DATASET {
        let path = root.join(name);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
        std::fs::write(&path, data).expect("write file");
    }

    let report = ingest_json(&temp.path().join("catalog.json"), &root, "classify");
    assert_eq!(report["task"], "classify");
    assert_eq!(report["classes"], 3);
    assert_eq!(report["images"], 3);
    assert_eq!(report["labels"], 3);
}

#[test]
fn corrupt_archive_is_rejected() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let archive = temp.path().join("broken.zip");
    std::fs::write(&archive, b"definitely not a zip").expect("write file");

    yolodex(&temp.path().join("catalog.json"))
        .arg("ingest")
        .arg(&archive)
        .assert()
        .failure()
        .stderr(contains("archive was rejected"));
}

#[test]
fn missing_manifest_is_rejected() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let archive = temp.path().join("bare.zip");
    common::write_zip(&archive, &[("images/train/x.jpg", b"jpeg")]);

    yolodex(&temp.path().join("catalog.json"))
        .arg("ingest")
        .arg(&archive)
        .assert()
        .failure()
        .stderr(contains("manifest"));
}

#[test]
fn unknown_dataset_fails() {
    let temp = tempfile::tempdir().expect("create temp dir");

    yolodex(&temp.path().join("catalog.json"))
        .args(["classes", "does-not-exist"])
        .assert()
        .failure()
        .stderr(contains("not found"));
}

#[test]
fn invalid_image_set_fails() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let store = temp.path().join("catalog.json");
    let archive = temp.path().join("street.zip");
    common::write_zip(&archive, common::DETECT_DATASET);
    let report = ingest_json(&store, &archive, "detect");
    let id = report["dataset_id"].as_str().expect("dataset id").to_string();

    yolodex(&store)
        .args(["images", &id, "--set", "holdout"])
        .assert()
        .failure()
        .stderr(contains("not an image set"));
}

#[test]
fn unsupported_output_format_fails() {
    let temp = tempfile::tempdir().expect("create temp dir");

    yolodex(&temp.path().join("catalog.json"))
        .args(["list", "--output", "yaml"])
        .assert()
        .failure()
        .stderr(contains("Unsupported output format"));
}

#[test]
fn empty_catalog_lists_nothing() {
    let temp = tempfile::tempdir().expect("create temp dir");

    yolodex(&temp.path().join("catalog.json"))
        .arg("list")
        .assert()
        .success()
        .stdout(contains("No datasets."));
}
