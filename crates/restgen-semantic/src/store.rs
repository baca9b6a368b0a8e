//! Persisted valid/invalid values, one pair of files per experiment,
//! operation and parameter.
//!
//! Layout: `{root}/{experiment}/{operation}/{parameter}_valid.csv` and
//! `..._invalid.csv`. Operation and parameter names are percent-encoded
//! except for ASCII letters, digits and `-`, so distinct names never share
//! a file. Each file holds one CSV record per value; every field
//! is double-quoted with embedded quotes doubled, so values may contain
//! commas and line breaks.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use restgen_core::SemanticParameter;

use crate::error::StoreError;

/// Which of the two value lists a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Valid,
    Invalid,
}

impl ValueKind {
    fn suffix(self) -> &'static str {
        match self {
            ValueKind::Valid => "valid",
            ValueKind::Invalid => "invalid",
        }
    }
}

/// Valid and invalid value sets loaded from disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredValues {
    pub valid: BTreeSet<String>,
    pub invalid: BTreeSet<String>,
}

#[derive(Debug, Clone)]
pub struct ValueStore {
    root: PathBuf,
    experiment: String,
}

impl ValueStore {
    pub fn new(root: impl Into<PathBuf>, experiment: impl Into<String>) -> Self {
        ValueStore {
            root: root.into(),
            experiment: experiment.into(),
        }
    }

    fn operation_dir(&self, operation_id: &str) -> PathBuf {
        self.root.join(&self.experiment).join(file_component(operation_id))
    }

    pub fn path(&self, operation_id: &str, parameter: &str, kind: ValueKind) -> PathBuf {
        self.operation_dir(operation_id)
            .join(format!("{}_{}.csv", file_component(parameter), kind.suffix()))
    }

    /// Loads the stored values. Missing files are empty sets.
    pub fn try_load(&self, operation_id: &str, parameter: &str) -> Result<StoredValues, StoreError> {
        let valid = read_values(&self.path(operation_id, parameter, ValueKind::Valid))?;
        let mut invalid = read_values(&self.path(operation_id, parameter, ValueKind::Invalid))?;
        invalid.retain(|v| !valid.contains(v));
        Ok(StoredValues { valid, invalid })
    }

    /// Like [`ValueStore::try_load`], but failures are logged and yield
    /// empty sets.
    pub fn load(&self, operation_id: &str, parameter: &str) -> StoredValues {
        self.try_load(operation_id, parameter).unwrap_or_else(|err| {
            warn!(operation = operation_id, parameter, "value store read failed: {}", err);
            StoredValues::default()
        })
    }

    /// Merges `parameter`'s values with what is already stored and writes
    /// the union back, keeping the two files disjoint.
    pub fn try_save(&self, operation_id: &str, parameter: &SemanticParameter) -> Result<(), StoreError> {
        let stored = self.try_load(operation_id, parameter.name())?;
        let mut merged = SemanticParameter::new(parameter.index, parameter.parameter.clone());
        merged.merge(stored.valid, stored.invalid);
        merged.merge(
            parameter.valid_values().clone(),
            parameter.invalid_values().clone(),
        );

        let dir = self.operation_dir(operation_id);
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io { path: dir, source })?;
        write_values(
            &self.path(operation_id, parameter.name(), ValueKind::Valid),
            merged.valid_values(),
        )?;
        write_values(
            &self.path(operation_id, parameter.name(), ValueKind::Invalid),
            merged.invalid_values(),
        )?;
        debug!(
            operation = operation_id,
            parameter = parameter.name(),
            valid = merged.valid_values().len(),
            invalid = merged.invalid_values().len(),
            "persisted semantic values"
        );
        Ok(())
    }

    /// Like [`ValueStore::try_save`], but failures are logged and ignored.
    pub fn save(&self, operation_id: &str, parameter: &SemanticParameter) {
        if let Err(err) = self.try_save(operation_id, parameter) {
            warn!(operation = operation_id, parameter = parameter.name(), "value store write failed: {}", err);
        }
    }
}

/// Replaces path separators and other awkward characters.
fn file_component(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}

fn read_values(path: &Path) -> Result<BTreeSet<String>, StoreError> {
    match fs::read_to_string(path) {
        Ok(content) => parse_records(&content).ok_or_else(|| StoreError::Unterminated {
            path: path.to_path_buf(),
        }),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeSet::new()),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_values(path: &Path, values: &BTreeSet<String>) -> Result<(), StoreError> {
    let mut content = String::new();
    for value in values {
        content.push('"');
        content.push_str(&value.replace('"', "\"\""));
        content.push_str("\"\n");
    }
    fs::write(path, content).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses single-field CSV records. Unquoted records run to the end of the
/// line. Returns `None` on an unterminated quote.
fn parse_records(content: &str) -> Option<BTreeSet<String>> {
    let mut values = BTreeSet::new();
    let mut chars = content.chars().peekable();
    loop {
        match chars.peek() {
            None => return Some(values),
            Some('\n') | Some('\r') => {
                chars.next();
            }
            Some('"') => {
                chars.next();
                let mut field = String::new();
                loop {
                    match chars.next()? {
                        '"' if chars.peek() == Some(&'"') => {
                            chars.next();
                            field.push('"');
                        }
                        '"' => break,
                        c => field.push(c),
                    }
                }
                // Anything after the closing quote up to the line end is ignored.
                while chars.peek().is_some_and(|c| *c != '\n') {
                    chars.next();
                }
                values.insert(field);
            }
            Some(_) => {
                let mut field = String::new();
                while let Some(c) = chars.next_if(|c| *c != '\n' && *c != '\r') {
                    field.push(c);
                }
                values.insert(field);
            }
        }
    }
}
