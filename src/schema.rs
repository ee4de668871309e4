//! Strict content schema used by `folio check`.
//!
//! Unlike the record validators in [`crate::validate`], which stop at the
//! first problem, the schema reports every violation. It is also stricter:
//! authoring fields such as `description`, `content` and `publishedAt` are
//! required, summaries are capped at 200 characters, URLs must be absolute,
//! and unknown properties are rejected.
//!
//! The schemas are JSON Schema (draft 7) documents under `schemas/`,
//! compiled once on first use.

use jsonschema::Validator;
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;

pub const SUMMARY_MAX_CHARS: usize = 200;
pub const PROJECT_MAX_TAGS: usize = 10;
pub const KNOWLEDGE_MAX_TAGS: usize = 8;

static PROJECT_SCHEMA: LazyLock<Validator> =
    LazyLock::new(|| compile(include_str!("../schemas/project.schema.json")));

static KNOWLEDGE_SCHEMA: LazyLock<Validator> =
    LazyLock::new(|| compile(include_str!("../schemas/knowledge-entry.schema.json")));

fn compile(source: &str) -> Validator {
    let schema: Value = serde_json::from_str(source).expect("bundled schema is valid JSON");
    jsonschema::options()
        .should_validate_formats(true)
        .build(&schema)
        .expect("bundled schema compiles")
}

/// One schema violation. `path` is the JSON pointer of the offending value
/// (`/tags/2`), empty for the record itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub path: String,
    pub message: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

fn violations(validator: &Validator, raw: &Value) -> Vec<SchemaViolation> {
    validator
        .iter_errors(raw)
        .map(|e| SchemaViolation {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect()
}

/// Check a project record against the strict schema. Empty means valid.
pub fn check_project(raw: &Value) -> Vec<SchemaViolation> {
    violations(&PROJECT_SCHEMA, raw)
}

/// Check a knowledge record against the strict schema. Empty means valid.
///
/// Besides the authoring fields, the data-model fields (`experienceLevel`,
/// `yearsOfExperience`, `relatedProjects`, `certifications`,
/// `learningResources`) are known properties and type-checked.
pub fn check_knowledge_entry(raw: &Value) -> Vec<SchemaViolation> {
    violations(&KNOWLEDGE_SCHEMA, raw)
}
