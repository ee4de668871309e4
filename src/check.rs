//! Content check: validate every JSON document under a content root.
//!
//! Each collection directory is read one level deep. Every `*.json` file is
//! parsed and run through both the record validator and the strict schema,
//! collecting all problems instead of stopping at the first.
//!
//! `index.json` gets special treatment: it must be an array, record arrays
//! are checked record by record, and an array of ids must point at existing
//! `{id}.json` documents.

use crate::schema;
use crate::types::{Collection, is_safe_key};
use crate::validate;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Result of checking one file. No problems means the file is valid.
#[derive(Debug, Clone, PartialEq)]
pub struct FileCheck {
    pub path: PathBuf,
    pub collection: Collection,
    pub problems: Vec<String>,
}

impl FileCheck {
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckReport {
    pub files: Vec<FileCheck>,
    /// Problems that are not tied to a file, such as a missing directory.
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl CheckReport {
    pub fn total(&self) -> usize {
        self.files.len()
    }

    pub fn valid(&self) -> usize {
        self.files.iter().filter(|f| f.is_valid()).count()
    }

    pub fn invalid(&self) -> usize {
        self.total() - self.valid()
    }

    pub fn count(&self, collection: Collection) -> usize {
        self.files.iter().filter(|f| f.collection == collection).count()
    }

    /// Percentage of valid files; `None` when nothing was checked.
    pub fn success_rate(&self) -> Option<f64> {
        if self.files.is_empty() {
            None
        } else {
            Some(self.valid() as f64 / self.total() as f64 * 100.0)
        }
    }

    pub fn passed(&self) -> bool {
        self.invalid() == 0 && self.errors.is_empty()
    }

    pub fn exit_code(&self) -> i32 {
        if self.passed() { 0 } else { 1 }
    }
}

pub fn check_content(root: &Path) -> CheckReport {
    let mut report = CheckReport::default();
    for collection in Collection::ALL {
        check_directory(&root.join(collection.dir_name()), collection, &mut report);
    }
    report
}

fn check_directory(dir: &Path, collection: Collection, report: &mut CheckReport) {
    if !dir.is_dir() {
        warn!(path = %dir.display(), "content directory missing");
        report
            .errors
            .push(format!("{}: directory not found", dir.display()));
        return;
    }

    let mut json_files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if entry.file_type().is_file() && path.extension().is_some_and(|e| e == "json") {
                    json_files.push(path.to_path_buf());
                }
            }
            Err(e) => report.errors.push(format!("{}: {e}", dir.display())),
        }
    }

    if json_files.is_empty() {
        report
            .warnings
            .push(format!("No JSON files found in {}", dir.display()));
        return;
    }

    debug!(collection = %collection, files = json_files.len(), "checking directory");
    for path in json_files {
        let problems = check_file(&path, collection);
        debug!(path = %path.display(), problems = problems.len(), "checked");
        report.files.push(FileCheck {
            path,
            collection,
            problems,
        });
    }
}

fn check_file(path: &Path, collection: Collection) -> Vec<String> {
    let raw = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => return vec![format!("failed to read: {e}")],
    };
    let value: Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => return vec![format!("invalid JSON: {e}")],
    };

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    if stem == "index" {
        let dir = path.parent().unwrap_or(path);
        check_index(&value, collection, dir)
    } else {
        let mut problems = check_record(&value, collection, "");
        let key = collection.key_field();
        match value.get(key).and_then(Value::as_str) {
            Some(actual) if actual != stem => problems.push(format!(
                "file name does not match {key} \"{actual}\""
            )),
            _ => {}
        }
        problems
    }
}

/// Validator message (first problem only) plus every schema violation.
fn check_record(value: &Value, collection: Collection, prefix: &str) -> Vec<String> {
    let mut problems = Vec::new();
    let validated = match collection {
        Collection::Projects => validate::validate_project(value).map(|_| ()),
        Collection::Knowledge => validate::validate_knowledge_entry(value).map(|_| ()),
    };
    if let Err(e) = validated {
        problems.push(format!("{prefix}{e}"));
    }

    let violations = match collection {
        Collection::Projects => schema::check_project(value),
        Collection::Knowledge => schema::check_knowledge_entry(value),
    };
    problems.extend(violations.iter().map(|v| format!("{prefix}{v}")));
    problems
}

fn check_index(value: &Value, collection: Collection, dir: &Path) -> Vec<String> {
    let Some(items) = value.as_array() else {
        return vec!["index must be a JSON array".to_string()];
    };

    if !items.is_empty() && items.iter().all(Value::is_string) {
        let key = collection.key_field();
        return items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(|id| {
                if !is_safe_key(id) {
                    Some(format!("indexed {key} \"{id}\" is not a plain file name"))
                } else if !dir.join(format!("{id}.json")).is_file() {
                    Some(format!("indexed {key} \"{id}\" has no {id}.json"))
                } else {
                    None
                }
            })
            .collect();
    }

    items
        .iter()
        .enumerate()
        .flat_map(|(i, item)| check_record(item, collection, &format!("[{i}] ")))
        .collect()
}
