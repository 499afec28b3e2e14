//! Ultralytics-style dataset manifest (`data.yaml`) parsing.
//!
//! The manifest is read permissively: unknown keys are ignored, `names` may
//! be a mapping or a sequence, and class ids may be written as integers or
//! integer-like strings. Anything that does not fit the recognized shapes is
//! a manifest error, which aborts ingestion before any extractor runs.

use std::collections::BTreeMap;

use serde_yaml::{Mapping, Value};

use crate::error::YolodexError;
use crate::record::{ExtraData, ImageSet};

/// Recognized keys of a parsed manifest.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Manifest {
    pub train: Option<String>,
    pub val: Option<String>,
    pub test: Option<String>,
    /// Class index to name. `None` when the manifest has no `names` key.
    pub names: Option<BTreeMap<u64, String>>,
    pub kpt_shape: Option<Value>,
    pub flip_idx: Option<Value>,
    pub download: Option<Value>,
}

impl Manifest {
    /// The manifest's directory value for a split, if present and non-null.
    pub fn split_dir(&self, set: ImageSet) -> Option<&str> {
        match set {
            ImageSet::Train => self.train.as_deref(),
            ImageSet::Val => self.val.as_deref(),
            ImageSet::Test => self.test.as_deref(),
        }
    }

    /// The subset of keys stored with the dataset record.
    pub fn extra_data(&self) -> ExtraData {
        ExtraData {
            train: self.train.clone(),
            val: self.val.clone(),
            test: self.test.clone(),
            kpt_shape: self.kpt_shape.clone(),
            flip_idx: self.flip_idx.clone(),
            download: self.download.clone(),
        }
    }
}

/// Parse manifest bytes. `entry` is the archive path, used in errors.
pub fn parse_manifest(bytes: &[u8], entry: &str) -> Result<Manifest, YolodexError> {
    let value: Value =
        serde_yaml::from_slice(bytes).map_err(|source| YolodexError::ManifestParse {
            entry: entry.to_string(),
            source,
        })?;

    let invalid = |message: String| YolodexError::ManifestInvalid {
        entry: entry.to_string(),
        message,
    };

    let Value::Mapping(map) = value else {
        return Err(invalid("expected a mapping at the top level".to_string()));
    };

    let split = |key: &str| -> Result<Option<String>, YolodexError> {
        match map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(dir)) => Ok(Some(dir.clone())),
            Some(other) => Err(invalid(format!(
                "'{}' must be a directory path or null, found {}",
                key,
                describe(other)
            ))),
        }
    };

    let train = split("train")?;
    let val = split("val")?;
    let test = split("test")?;

    let names = match map.get("names") {
        None | Some(Value::Null) => None,
        Some(Value::Mapping(mapping)) => Some(names_from_mapping(mapping).map_err(invalid)?),
        Some(Value::Sequence(items)) => Some(names_from_sequence(items).map_err(invalid)?),
        Some(other) => {
            return Err(invalid(format!(
                "'names' must be a mapping or a sequence, found {}",
                describe(other)
            )))
        }
    };

    Ok(Manifest {
        train,
        val,
        test,
        names,
        kpt_shape: passthrough(&map, "kpt_shape"),
        flip_idx: passthrough(&map, "flip_idx"),
        download: passthrough(&map, "download"),
    })
}

/// Fuzz-only entrypoint for manifest parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_manifest(input: &[u8]) -> Result<(), YolodexError> {
    let _ = parse_manifest(input, "<fuzz>")?;
    Ok(())
}

fn passthrough(map: &Mapping, key: &str) -> Option<Value> {
    map.get(key).filter(|value| !value.is_null()).cloned()
}

fn names_from_mapping(mapping: &Mapping) -> Result<BTreeMap<u64, String>, String> {
    let mut names = BTreeMap::new();
    for (key, value) in mapping {
        let index = class_index(key)?;
        let name = class_name(index, value)?;
        if names.insert(index, name).is_some() {
            return Err(format!("class id {} is declared more than once", index));
        }
    }
    Ok(names)
}

fn names_from_sequence(items: &[Value]) -> Result<BTreeMap<u64, String>, String> {
    items
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let index = index as u64;
            class_name(index, value).map(|name| (index, name))
        })
        .collect()
}

fn class_index(key: &Value) -> Result<u64, String> {
    match key {
        Value::Number(number) => number
            .as_u64()
            .ok_or_else(|| format!("class id {} is not a non-negative integer", number)),
        Value::String(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| format!("class id '{}' is not a non-negative integer", raw)),
        other => Err(format!(
            "class id must be an integer, found {}",
            describe(other)
        )),
    }
}

fn class_name(index: u64, value: &Value) -> Result<String, String> {
    let name = match value {
        Value::Null => String::new(),
        Value::String(name) => name.trim().to_string(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        other => {
            return Err(format!(
                "name of class {} must be a scalar, found {}",
                index,
                describe(other)
            ))
        }
    };

    if name.is_empty() {
        Ok(format!("class_{}", index))
    } else {
        Ok(name)
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
