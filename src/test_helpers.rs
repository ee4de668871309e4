//! Shared test utilities for the folio test suite.
//!
//! Provides fixture setup, raw-record builders, and lookup helpers that work
//! with loaded collections (`Project`, `KnowledgeEntry`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let store = ContentStore::new(LocalSource::new(tmp.path()));
//! let projects = store.load_projects();
//!
//! let project = find_project(&projects, "ci-pipeline");
//! assert!(project.featured);
//! ```

use serde_json::{Value, json};
use std::path::Path;
use tempfile::TempDir;

use crate::types::{KnowledgeEntry, Project};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write a JSON value to `{root}/{rel}`, creating parent directories.
pub fn write_json(root: &Path, rel: &str, value: &Value) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

// =========================================================================
// Raw records
// =========================================================================

/// A raw project record that passes the record validator.
///
/// `id` and `slug` are both set to `slug`.
pub fn raw_project(slug: &str) -> Value {
    json!({
        "id": slug,
        "title": format!("Project {slug}"),
        "summary": format!("Summary of {slug}"),
        "tags": ["Docker", "CI/CD"],
        "featured": false,
        "slug": slug,
        "externalUrl": format!("https://gitlab.com/dev/{slug}")
    })
}

/// A raw knowledge record that passes the record validator.
pub fn raw_knowledge_entry(id: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Entry {id}"),
        "summary": format!("Summary of {id}"),
        "category": "DevOps",
        "tags": ["automation"]
    })
}

/// A validated project built from [`raw_project`].
pub fn project(slug: &str) -> Project {
    serde_json::from_value(raw_project(slug)).unwrap()
}

/// A validated knowledge entry with the given category and tags.
pub fn knowledge_entry(id: &str, category: &str, tags: &[&str]) -> KnowledgeEntry {
    let mut raw = raw_knowledge_entry(id);
    raw["category"] = json!(category);
    raw["tags"] = json!(tags);
    serde_json::from_value(raw).unwrap()
}

/// `count` projects with slugs `p01`, `p02`, ...
pub fn numbered_projects(count: usize) -> Vec<Project> {
    (1..=count).map(|i| project(&format!("p{i:02}"))).collect()
}

// =========================================================================
// Collection lookups, panicking with a clear message on miss
// =========================================================================

/// Find a project by slug. Panics if not found.
pub fn find_project<'a>(projects: &'a [Project], slug: &str) -> &'a Project {
    projects.iter().find(|p| p.slug == slug).unwrap_or_else(|| {
        let slugs: Vec<&str> = projects.iter().map(|p| p.slug.as_str()).collect();
        panic!("project '{slug}' not found. Available: {slugs:?}")
    })
}

/// Find a knowledge entry by id. Panics if not found.
pub fn find_entry<'a>(entries: &'a [KnowledgeEntry], id: &str) -> &'a KnowledgeEntry {
    entries.iter().find(|e| e.id == id).unwrap_or_else(|| {
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        panic!("knowledge entry '{id}' not found. Available: {ids:?}")
    })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All project slugs in collection order.
pub fn project_slugs(projects: &[Project]) -> Vec<&str> {
    projects.iter().map(|p| p.slug.as_str()).collect()
}

/// All knowledge entry ids in collection order.
pub fn entry_ids(entries: &[KnowledgeEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.id.as_str()).collect()
}
