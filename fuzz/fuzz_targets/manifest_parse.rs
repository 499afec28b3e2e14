//! Fuzz target for data.yaml manifest parsing.
//!
//! Arbitrary bytes go through YAML decoding and manifest validation;
//! malformed input must come back as an error, never a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use yolodex::manifest::fuzz_parse_manifest;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    let _ = fuzz_parse_manifest(data);
});
