//! Filtering, pagination and set extraction over loaded collections.
//!
//! Everything here is pure and works on slices that are already in memory.
//! Matching is case-insensitive throughout:
//!
//! - **category**: exact match
//! - **tags**: every requested tag must be present (AND)
//! - **search**: substring of the title, summary, category or any tag (OR)
//!
//! The three conditions are ANDed. An absent condition matches everything.

use crate::types::{KnowledgeEntry, Project};
use serde::Serialize;
use std::collections::BTreeSet;
use std::num::NonZeroUsize;

/// Featured projects shown on the home page.
pub const FEATURED_LIMIT: usize = 3;

/// Default page size for project listings.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Knowledge listing filters, as accepted in the listing's query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFilters {
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub search: Option<String>,
}

impl ContentFilters {
    /// Parse `category=..&tags=a,b&search=..`. Unknown keys are ignored and
    /// empty values mean "no filter".
    pub fn from_query(query: &str) -> Self {
        let mut filters = Self::default();
        let query = query.strip_prefix('?').unwrap_or(query);
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = value.trim();
            match &*key {
                "category" if !value.is_empty() => filters.category = Some(value.to_string()),
                "search" if !value.is_empty() => filters.search = Some(value.to_string()),
                "tags" => filters.tags = split_tags(value),
                _ => {}
            }
        }
        filters
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.tags.is_empty() && self.search.is_none()
    }

    pub fn matches(&self, entry: &KnowledgeEntry) -> bool {
        if let Some(category) = &self.category {
            if entry.category.to_lowercase() != category.to_lowercase() {
                return false;
            }
        }

        if !self.tags.is_empty() {
            let entry_tags: Vec<String> = entry.tags.iter().map(|t| t.to_lowercase()).collect();
            let all_present = self
                .tags
                .iter()
                .all(|wanted| entry_tags.contains(&wanted.to_lowercase()));
            if !all_present {
                return false;
            }
        }

        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let hit = |field: &str| field.to_lowercase().contains(&needle);
            let found = hit(&entry.title)
                || hit(&entry.summary)
                || hit(&entry.category)
                || entry.tags.iter().any(|t| hit(t));
            if !found {
                return false;
            }
        }

        true
    }
}

/// Comma-separated tag list: items trimmed, empty items dropped.
fn split_tags(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn filter_knowledge_entries(
    entries: &[KnowledgeEntry],
    filters: &ContentFilters,
) -> Vec<KnowledgeEntry> {
    entries
        .iter()
        .filter(|e| filters.matches(e))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationOptions {
    /// 1-indexed.
    pub page: NonZeroUsize,
    pub limit: NonZeroUsize,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            page: NonZeroUsize::MIN,
            limit: NonZeroUsize::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl PaginationOptions {
    /// `None` if either value is zero.
    pub fn new(page: usize, limit: usize) -> Option<Self> {
        Some(Self {
            page: NonZeroUsize::new(page)?,
            limit: NonZeroUsize::new(limit)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    pub data: Vec<T>,
    /// Size of the collection before slicing.
    pub total: usize,
    /// The requested page, even when it lies past the last one.
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

impl<T> PaginatedResult<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Slice `[(page-1)*limit, page*limit)` out of `items`. A page past the end
/// yields empty data; the page number is never clamped.
pub fn paginate<T: Clone>(items: &[T], options: PaginationOptions) -> PaginatedResult<T> {
    let page = options.page.get();
    let limit = options.limit.get();
    let total = items.len();
    let start = (page - 1).saturating_mul(limit);

    PaginatedResult {
        data: items.iter().skip(start).take(limit).cloned().collect(),
        total,
        page,
        limit,
        total_pages: total.div_ceil(limit),
    }
}

/// The first [`FEATURED_LIMIT`] featured projects, in collection order.
pub fn featured_projects(projects: &[Project]) -> Vec<Project> {
    projects
        .iter()
        .filter(|p| p.featured)
        .take(FEATURED_LIMIT)
        .cloned()
        .collect()
}

/// Distinct categories, sorted.
pub fn unique_categories(entries: &[KnowledgeEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|e| e.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct tags across all entries, sorted.
pub fn unique_tags(entries: &[KnowledgeEntry]) -> Vec<String> {
    entries
        .iter()
        .flat_map(|e| e.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
