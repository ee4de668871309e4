//! Content loading: read, parse and validate whole collections or single
//! entities from a [`ContentSource`].
//!
//! Two failure policies sit side by side:
//!
//! - `try_load_*` return a [`LoadError`]. The first bad record aborts the
//!   whole collection; no partial collection is ever returned.
//! - `load_*` log the error and degrade: an empty collection for listings,
//!   `None` for single-entity lookups.
//!
//! An index file is either an array of full records or an array of ids, each
//! resolved through the source's per-entity document.
//!
//! Single-entity lookups try the per-entity document first. If that fails for
//! any reason (missing, unreachable, invalid) they fall back to loading the
//! whole collection and scanning it for the key.

use crate::query::{ContentFilters, filter_knowledge_entries};
use crate::source::{ContentSource, SourceError};
use crate::types::{Collection, KnowledgeEntry, Project, RelatedProject};
use crate::validate::{ValidationError, validate_knowledge_entry, validate_project};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to load {collection}: {source}")]
    Source {
        collection: Collection,
        source: SourceError,
    },
    #[error("invalid JSON in {collection}/{document}: {source}")]
    Json {
        collection: Collection,
        document: String,
        source: serde_json::Error,
    },
    #[error("{collection}/index.json must contain a JSON array")]
    NotAnArray { collection: Collection },
    #[error("{collection} record #{position}: {source}")]
    Validation {
        collection: Collection,
        /// Zero-based position in the index.
        position: usize,
        source: ValidationError,
    },
}

/// Loads content from one source. Holds no cache: every call reads the
/// source again and returns a fresh collection.
pub struct ContentStore<S> {
    source: S,
}

impl<S: ContentSource> ContentStore<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn try_load_projects(&self) -> Result<Vec<Project>, LoadError> {
        self.try_load(Collection::Projects, validate_project)
    }

    pub fn try_load_knowledge_entries(&self) -> Result<Vec<KnowledgeEntry>, LoadError> {
        self.try_load(Collection::Knowledge, validate_knowledge_entry)
    }

    /// All projects, or an empty list if the collection cannot be loaded.
    pub fn load_projects(&self) -> Vec<Project> {
        self.try_load_projects().unwrap_or_else(|e| {
            error!(source = %self.source.describe(), error = %e, "error loading projects");
            Vec::new()
        })
    }

    /// All knowledge entries, optionally filtered, or an empty list if the
    /// collection cannot be loaded.
    pub fn load_knowledge_entries(&self, filters: Option<&ContentFilters>) -> Vec<KnowledgeEntry> {
        let entries = self.try_load_knowledge_entries().unwrap_or_else(|e| {
            error!(source = %self.source.describe(), error = %e, "error loading knowledge entries");
            Vec::new()
        });
        match filters {
            Some(filters) => filter_knowledge_entries(&entries, filters),
            None => entries,
        }
    }

    pub fn load_project_by_slug(&self, slug: &str) -> Option<Project> {
        self.load_one(
            Collection::Projects,
            slug,
            validate_project,
            || self.try_load_projects(),
            |p| p.slug == slug,
        )
    }

    pub fn load_knowledge_entry_by_id(&self, id: &str) -> Option<KnowledgeEntry> {
        self.load_one(
            Collection::Knowledge,
            id,
            validate_knowledge_entry,
            || self.try_load_knowledge_entries(),
            |e| e.id == id,
        )
    }

    /// Resolve an entry's `relatedProjects` against the current project
    /// collection. See [`resolve_related_projects`].
    pub fn resolve_related_projects(&self, entry: &KnowledgeEntry) -> Vec<RelatedProject> {
        match &entry.related_projects {
            Some(slugs) if !slugs.is_empty() => {
                resolve_related_projects(entry, &self.load_projects())
            }
            _ => Vec::new(),
        }
    }

    fn try_load<T>(
        &self,
        collection: Collection,
        validate: fn(&Value) -> Result<T, ValidationError>,
    ) -> Result<Vec<T>, LoadError> {
        let text = self
            .source
            .read_index(collection)
            .map_err(|source| LoadError::Source { collection, source })?;
        let index: Value = serde_json::from_str(&text).map_err(|source| LoadError::Json {
            collection,
            document: "index.json".to_string(),
            source,
        })?;
        let Value::Array(items) = index else {
            return Err(LoadError::NotAnArray { collection });
        };

        let by_id = !items.is_empty() && items.iter().all(Value::is_string);
        let mut loaded = Vec::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            let record = match item.as_str() {
                Some(key) if by_id => self.read_entity(collection, key)?,
                _ => item.clone(),
            };
            let valid = validate(&record).map_err(|source| LoadError::Validation {
                collection,
                position,
                source,
            })?;
            loaded.push(valid);
        }
        debug!(%collection, count = loaded.len(), by_id, "loaded collection");
        Ok(loaded)
    }

    fn read_entity(&self, collection: Collection, key: &str) -> Result<Value, LoadError> {
        let text = self
            .source
            .read_entity(collection, key)
            .map_err(|source| LoadError::Source { collection, source })?;
        serde_json::from_str(&text).map_err(|source| LoadError::Json {
            collection,
            document: format!("{key}.json"),
            source,
        })
    }

    fn load_one<T>(
        &self,
        collection: Collection,
        key: &str,
        validate: fn(&Value) -> Result<T, ValidationError>,
        load_all: impl FnOnce() -> Result<Vec<T>, LoadError>,
        matches: impl Fn(&T) -> bool,
    ) -> Option<T> {
        let direct = self.read_entity(collection, key).and_then(|record| {
            validate(&record).map_err(|source| LoadError::Validation {
                collection,
                position: 0,
                source,
            })
        });
        match direct {
            Ok(found) => return Some(found),
            Err(e) => {
                warn!(%collection, key, error = %e, "per-entity document unavailable, scanning index");
            }
        }

        match load_all() {
            Ok(all) => {
                let found = all.into_iter().find(|item| matches(item));
                if found.is_none() {
                    debug!(%collection, key, "not found after index scan");
                }
                found
            }
            Err(e) => {
                error!(%collection, key, error = %e, "index fallback failed");
                None
            }
        }
    }
}

/// Resolve `relatedProjects` slugs against `projects`, preserving order.
/// Slugs with no matching project become [`RelatedProject::Missing`].
pub fn resolve_related_projects(
    entry: &KnowledgeEntry,
    projects: &[Project],
) -> Vec<RelatedProject> {
    entry
        .related_projects
        .iter()
        .flatten()
        .map(|slug| match projects.iter().find(|p| &p.slug == slug) {
            Some(project) => RelatedProject::Resolved(project.clone()),
            None => {
                debug!(entry = %entry.id, slug = %slug, "related project not found, using stub");
                RelatedProject::Missing { slug: slug.clone() }
            }
        })
        .collect()
}
