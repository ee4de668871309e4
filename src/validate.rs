//! Record validators.
//!
//! Each loaded JSON record goes through exactly one of these before it joins
//! a collection. They check the minimal structural rules and then narrow the
//! untyped value to [`Project`] or [`KnowledgeEntry`]:
//!
//! - `id`, `title`, `summary` (and `category` for knowledge): present,
//!   non-empty strings; `title` at most 100 and `summary` at most 280 chars
//! - `featured`: strictly a boolean (projects only)
//! - `slug`: matches `^[a-z0-9-]+$`
//! - `externalUrl`: starts with `https://`
//! - `tags`: an array of strings (optional for projects)
//!
//! Rules run in a fixed order and the first failure is returned. The
//! stricter, collect-everything schema used by `folio check` lives in
//! [`crate::schema`].

use crate::types::{KnowledgeEntry, Project};
use regex::Regex;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

pub const TITLE_MAX_CHARS: usize = 100;
pub const SUMMARY_MAX_CHARS: usize = 280;

static SLUG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").expect("slug pattern compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Project,
    KnowledgeEntry,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Project => f.write_str("Project"),
            Entity::KnowledgeEntry => f.write_str("KnowledgeEntry"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{entity} validation failed: record is not a JSON object")]
    NotAnObject { entity: Entity },
    #[error("{entity} validation failed: invalid or missing {field}")]
    Missing { entity: Entity, field: &'static str },
    #[error("{entity} validation failed: {field} is {actual} characters (max {max})")]
    TooLong {
        entity: Entity,
        field: &'static str,
        max: usize,
        actual: usize,
    },
    #[error("{entity} validation failed: {field} must be a boolean")]
    NotABoolean { entity: Entity, field: &'static str },
    #[error("{entity} validation failed: invalid slug {slug:?}")]
    InvalidSlug { entity: Entity, slug: String },
    #[error("{entity} validation failed: {field} must start with https:// (got {url:?})")]
    InsecureUrl {
        entity: Entity,
        field: &'static str,
        url: String,
    },
    #[error("{entity} validation failed: tags must be an array of strings")]
    InvalidTags { entity: Entity },
    #[error("{entity} validation failed: {message}")]
    Malformed { entity: Entity, message: String },
}

impl ValidationError {
    pub fn entity(&self) -> Entity {
        match self {
            ValidationError::NotAnObject { entity }
            | ValidationError::Missing { entity, .. }
            | ValidationError::TooLong { entity, .. }
            | ValidationError::NotABoolean { entity, .. }
            | ValidationError::InvalidSlug { entity, .. }
            | ValidationError::InsecureUrl { entity, .. }
            | ValidationError::InvalidTags { entity }
            | ValidationError::Malformed { entity, .. } => *entity,
        }
    }

    /// The offending field, or `"record"` when the problem is not tied to one.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Missing { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::NotABoolean { field, .. }
            | ValidationError::InsecureUrl { field, .. } => field,
            ValidationError::InvalidSlug { .. } => "slug",
            ValidationError::InvalidTags { .. } => "tags",
            ValidationError::NotAnObject { .. } | ValidationError::Malformed { .. } => "record",
        }
    }
}

/// Validate a raw project record and narrow it to [`Project`].
pub fn validate_project(raw: &Value) -> Result<Project, ValidationError> {
    let entity = Entity::Project;
    let record = as_object(raw, entity)?;

    required_str(record, entity, "id", None)?;
    required_str(record, entity, "title", Some(TITLE_MAX_CHARS))?;
    required_str(record, entity, "summary", Some(SUMMARY_MAX_CHARS))?;

    if !matches!(record.get("featured"), Some(Value::Bool(_))) {
        return Err(ValidationError::NotABoolean {
            entity,
            field: "featured",
        });
    }

    let slug = required_str(record, entity, "slug", None)?;
    if !SLUG_PATTERN.is_match(slug) {
        return Err(ValidationError::InvalidSlug {
            entity,
            slug: slug.to_string(),
        });
    }

    let url = required_str(record, entity, "externalUrl", None)?;
    if !url.starts_with("https://") {
        return Err(ValidationError::InsecureUrl {
            entity,
            field: "externalUrl",
            url: url.to_string(),
        });
    }

    if let Some(tags) = record.get("tags") {
        string_array(tags, entity)?;
    }

    narrow(raw, entity)
}

/// Validate a raw knowledge record and narrow it to [`KnowledgeEntry`].
pub fn validate_knowledge_entry(raw: &Value) -> Result<KnowledgeEntry, ValidationError> {
    let entity = Entity::KnowledgeEntry;
    let record = as_object(raw, entity)?;

    required_str(record, entity, "id", None)?;
    required_str(record, entity, "title", Some(TITLE_MAX_CHARS))?;
    required_str(record, entity, "summary", Some(SUMMARY_MAX_CHARS))?;
    required_str(record, entity, "category", None)?;

    match record.get("tags") {
        Some(tags) => string_array(tags, entity)?,
        None => return Err(ValidationError::InvalidTags { entity }),
    }

    narrow(raw, entity)
}

fn as_object(raw: &Value, entity: Entity) -> Result<&Map<String, Value>, ValidationError> {
    raw.as_object()
        .ok_or(ValidationError::NotAnObject { entity })
}

/// A present, non-empty string field, optionally capped in length.
fn required_str<'a>(
    record: &'a Map<String, Value>,
    entity: Entity,
    field: &'static str,
    max: Option<usize>,
) -> Result<&'a str, ValidationError> {
    let value = match record.get(field) {
        Some(Value::String(s)) if !s.is_empty() => s.as_str(),
        _ => return Err(ValidationError::Missing { entity, field }),
    };
    if let Some(max) = max {
        let actual = value.chars().count();
        if actual > max {
            return Err(ValidationError::TooLong {
                entity,
                field,
                max,
                actual,
            });
        }
    }
    Ok(value)
}

fn string_array(value: &Value, entity: Entity) -> Result<(), ValidationError> {
    match value {
        Value::Array(items) if items.iter().all(Value::is_string) => Ok(()),
        _ => Err(ValidationError::InvalidTags { entity }),
    }
}

fn narrow<T: serde::de::DeserializeOwned>(
    raw: &Value,
    entity: Entity,
) -> Result<T, ValidationError> {
    serde_json::from_value(raw.clone()).map_err(|e| ValidationError::Malformed {
        entity,
        message: e.to_string(),
    })
}
