#![allow(dead_code)]

use std::collections::BTreeSet;

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Lowercase class directory names; always at least one.
pub fn arb_class_names(max: usize) -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set("[a-z]{1,8}", 1..=max)
}

/// One YOLO label line: a class index and four normalized coordinates.
pub fn arb_label_line(max_class: u64) -> impl Strategy<Value = String> {
    (
        0..=max_class,
        prop::array::uniform4(0.0f64..1.0),
    )
        .prop_map(|(class, coords)| {
            format!(
                "{} {:.4} {:.4} {:.4} {:.4}",
                class, coords[0], coords[1], coords[2], coords[3]
            )
        })
}

/// Label file text mixing label lines with blank and whitespace-only lines.
///
/// Returns the text together with the number of non-blank lines.
pub fn arb_label_file(max_lines: usize) -> impl Strategy<Value = (String, usize)> {
    prop::collection::vec(
        prop_oneof![
            3 => arb_label_line(9).prop_map(Some),
            1 => Just(None),
        ],
        0..=max_lines,
    )
    .prop_map(|lines| {
        let count = lines.iter().filter(|line| line.is_some()).count();
        let text = lines
            .into_iter()
            .map(|line| line.unwrap_or_else(|| "   ".to_string()))
            .collect::<Vec<_>>()
            .join("\n");
        (text, count)
    })
}
