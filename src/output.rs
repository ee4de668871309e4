//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every entity (project, knowledge entry, page) is its semantic identity:
//! positional index and title. Slugs, paths, and problems follow as indented
//! context lines. The output reads as a content inventory while still letting
//! users trace data back to specific files.
//!
//! # Entity Display Contract
//!
//! Every entity follows the same two-level pattern:
//!
//! 1. **Header line**: positional index + title (+ optional marker)
//! 2. **Context lines**: indented `Slug:`, `Tags:`, `Category:`, problems, etc.
//!
//! # Output Format
//!
//! ## Projects
//!
//! ```text
//! Projects (page 1 of 2, 3 total)
//! 001 GitLab CI Pipeline Templates ★
//!     Slug: ci-pipeline
//!     Tags: GitLab CI, Docker, CI/CD
//! 002 Kubernetes Cluster Bootstrap
//!     Slug: k8s-cluster
//! ```
//!
//! ## Build
//!
//! ```text
//! Home → index.html
//! GitLab CI Pipeline Templates → projects/ci-pipeline/index.html
//! ...
//! Assets
//!     assets/site-3f2a9c1e0b4d.css
//!
//! Generated 9 pages from 3 projects, 3 knowledge entries
//! ```
//!
//! ## Check
//!
//! ```text
//! projects
//!     ✓ ci-pipeline.json
//!     ✗ broken.json
//!         invalid JSON: EOF while parsing an object at line 1 column 1
//!
//! Summary
//!     Total files: 8
//!     ...
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::check::CheckReport;
use crate::generate::GenerateReport;
use crate::query::{ContentFilters, PaginatedResult};
use crate::types::{Collection, KnowledgeEntry, Project, RelatedProject};
use crate::verify::VerifyReport;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    }
}

/// `1536` -> `1.5 KB`
fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

fn project_header(index: usize, project: &Project) -> String {
    if project.featured {
        format!("{} {} \u{2605}", format_index(index), project.title)
    } else {
        format!("{} {}", format_index(index), project.title)
    }
}

fn tags_line(depth: usize, tags: &[String]) -> Option<String> {
    if tags.is_empty() {
        None
    } else {
        Some(format!("{}Tags: {}", indent(depth), tags.join(", ")))
    }
}

// ============================================================================
// Listings
// ============================================================================

pub fn format_project_list(page: &PaginatedResult<Project>) -> Vec<String> {
    let mut lines = vec![format!(
        "Projects (page {} of {}, {} total)",
        page.page,
        page.total_pages.max(1),
        page.total
    )];
    if page.data.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
        return lines;
    }

    let offset = (page.page - 1) * page.limit;
    for (i, project) in page.data.iter().enumerate() {
        lines.push(project_header(offset + i + 1, project));
        lines.push(format!("{}Slug: {}", indent(1), project.slug));
        lines.extend(tags_line(1, &project.tags));
    }
    lines
}

pub fn print_project_list(page: &PaginatedResult<Project>) {
    print_lines(format_project_list(page));
}

pub fn format_knowledge_list(entries: &[KnowledgeEntry], filters: &ContentFilters) -> Vec<String> {
    let mut header = format!("Knowledge ({} entries", entries.len());
    if let Some(category) = &filters.category {
        header.push_str(&format!(", category: {category}"));
    }
    if !filters.tags.is_empty() {
        header.push_str(&format!(", tags: {}", filters.tags.join(",")));
    }
    if let Some(search) = &filters.search {
        header.push_str(&format!(", search: \"{search}\""));
    }
    header.push(')');

    let mut lines = vec![header];
    if entries.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
        return lines;
    }

    for (i, entry) in entries.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), entry.title));
        lines.push(format!("{}Id: {}", indent(1), entry.id));
        lines.push(format!("{}Category: {}", indent(1), entry.category));
        lines.extend(tags_line(1, &entry.tags));
    }
    lines
}

pub fn print_knowledge_list(entries: &[KnowledgeEntry], filters: &ContentFilters) {
    print_lines(format_knowledge_list(entries, filters));
}

// ============================================================================
// Details
// ============================================================================

pub fn format_project_detail(project: &Project) -> Vec<String> {
    let mut lines = vec![project.title.clone()];
    let ctx = indent(1);
    lines.push(format!("{ctx}Slug: {}", project.slug));
    lines.push(format!("{ctx}Summary: {}", project.summary));
    lines.push(format!(
        "{ctx}Featured: {}",
        if project.featured { "yes" } else { "no" }
    ));
    lines.extend(tags_line(1, &project.tags));
    lines.push(format!("{ctx}URL: {}", project.external_url));
    if let Some(published) = &project.published_at {
        lines.push(format!("{ctx}Published: {published}"));
    }
    if let Some(description) = &project.description {
        lines.push(format!("{ctx}Description: {}", truncate_desc(description, 80)));
    }
    lines
}

pub fn print_project_detail(project: &Project) {
    print_lines(format_project_detail(project));
}

pub fn format_knowledge_detail(entry: &KnowledgeEntry, related: &[RelatedProject]) -> Vec<String> {
    let mut lines = vec![entry.title.clone()];
    let ctx = indent(1);
    lines.push(format!("{ctx}Id: {}", entry.id));
    lines.push(format!("{ctx}Category: {}", entry.category));
    lines.push(format!("{ctx}Summary: {}", entry.summary));
    lines.extend(tags_line(1, &entry.tags));
    if let Some(level) = entry.experience_level {
        lines.push(format!("{ctx}Level: {level}"));
    }
    if let Some(years) = &entry.years_of_experience {
        lines.push(format!("{ctx}Experience: {years} years"));
    }
    if let Some(certs) = entry.certifications.as_ref().filter(|c| !c.is_empty()) {
        lines.push(format!("{ctx}Certifications: {}", certs.join(", ")));
    }
    if let Some(updated) = &entry.last_updated {
        lines.push(format!("{ctx}Updated: {updated}"));
    }

    if !related.is_empty() {
        lines.push(format!("{ctx}Related projects"));
        for (i, project) in related.iter().enumerate() {
            let marker = if project.is_resolved() { "" } else { " (missing)" };
            lines.push(format!(
                "{}{} {}{marker}",
                indent(2),
                format_index(i + 1),
                project.title()
            ));
        }
    }
    lines
}

pub fn print_knowledge_detail(entry: &KnowledgeEntry, related: &[RelatedProject]) {
    print_lines(format_knowledge_detail(entry, related));
}

// ============================================================================
// Build output
// ============================================================================

/// Format build output: each page as title → path, then assets and totals.
pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .pages
        .iter()
        .map(|page| format!("{} \u{2192} {}", page.label, page.path))
        .collect();

    if !report.assets.is_empty() {
        lines.push(String::new());
        lines.push("Assets".to_string());
        for asset in &report.assets {
            lines.push(format!("{}{asset}", indent(1)));
        }
    }

    if !report.skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        for key in &report.skipped {
            lines.push(format!("{}{key} (detail unavailable)", indent(1)));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {} pages from {} projects, {} knowledge entries ({} content files)",
        report.pages.len(),
        report.project_count,
        report.knowledge_count,
        report.content_files.len()
    ));
    lines
}

pub fn print_generate_output(report: &GenerateReport) {
    print_lines(format_generate_output(report));
}

pub fn format_copy_output(files: &[String]) -> Vec<String> {
    let mut lines: Vec<String> = files.iter().map(|f| format!("{}{f}", indent(1))).collect();
    lines.insert(0, "Copied".to_string());
    lines.push(format!("Copied {} content files", files.len()));
    lines
}

pub fn print_copy_output(files: &[String]) {
    print_lines(format_copy_output(files));
}

// ============================================================================
// Check output
// ============================================================================

/// Format check output grouped by collection, followed by a summary.
///
/// Paths are shown relative to the content root.
pub fn format_check_output(report: &CheckReport, root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    for collection in Collection::ALL {
        let files: Vec<_> = report
            .files
            .iter()
            .filter(|f| f.collection == collection)
            .collect();
        if files.is_empty() {
            continue;
        }
        lines.push(collection.dir_name().to_string());
        for file in files {
            let name = file
                .path
                .strip_prefix(root.join(collection.dir_name()))
                .unwrap_or(file.path.as_path())
                .display();
            let mark = if file.is_valid() { "\u{2713}" } else { "\u{2717}" };
            lines.push(format!("{}{mark} {name}", indent(1)));
            for problem in &file.problems {
                lines.push(format!("{}{problem}", indent(2)));
            }
        }
        lines.push(String::new());
    }

    if !report.errors.is_empty() {
        lines.push("Errors".to_string());
        for error in &report.errors {
            lines.push(format!("{}{error}", indent(1)));
        }
        lines.push(String::new());
    }

    if !report.warnings.is_empty() {
        lines.push("Warnings".to_string());
        for warning in &report.warnings {
            lines.push(format!("{}{warning}", indent(1)));
        }
        lines.push(String::new());
    }

    let ctx = indent(1);
    lines.push("Summary".to_string());
    lines.push(format!("{ctx}Total files: {}", report.total()));
    lines.push(format!("{ctx}Valid: {}", report.valid()));
    lines.push(format!("{ctx}Invalid: {}", report.invalid()));
    lines.push(format!("{ctx}Projects: {}", report.count(Collection::Projects)));
    lines.push(format!("{ctx}Knowledge: {}", report.count(Collection::Knowledge)));
    lines.push(match report.success_rate() {
        Some(rate) => format!("{ctx}Success rate: {rate:.1}%"),
        None => format!("{ctx}Success rate: n/a"),
    });
    lines.push(String::new());
    lines.push(if report.passed() {
        "All content files are valid".to_string()
    } else {
        "Content check failed".to_string()
    });
    lines
}

pub fn print_check_output(report: &CheckReport, root: &Path) {
    print_lines(format_check_output(report, root));
}

// ============================================================================
// Verify output
// ============================================================================

pub fn format_verify_output(report: &VerifyReport) -> Vec<String> {
    let ok = |pass: bool| if pass { "ok" } else { "FAILED" };
    let mut lines = vec![format!("Export {}", report.output_dir)];

    lines.push(format!("Files: {}", ok(report.files_ok())));
    for page in &report.missing {
        lines.push(format!("{}missing {page}", indent(1)));
    }
    lines.push(format!("{}{} assets", indent(1), report.asset_count));

    lines.push(format!("HTML: {}", ok(report.html_ok())));
    for page in &report.pages {
        if !page.structure.is_empty() {
            lines.push(format!("{}{}: missing {}", indent(1), page.page, page.structure.join(", ")));
        }
        if !page.accessibility.is_empty() {
            lines.push(format!(
                "{}{}: warning, missing {}",
                indent(1),
                page.page,
                page.accessibility.join(", ")
            ));
        }
    }

    lines.push(format!(
        "Links: {} ({} checked)",
        ok(report.links_ok()),
        report.links_checked
    ));
    for link in &report.broken_links {
        lines.push(format!("{}{} \u{2192} {}", indent(1), link.page, link.href));
    }

    let size = &report.size;
    lines.push(format!(
        "Size: {} in {} files",
        format_bytes(size.total_bytes),
        size.file_count
    ));
    for file in &size.largest {
        lines.push(format!("{}{:>9}  {}", indent(1), format_bytes(file.bytes), file.path));
    }
    for file in &size.oversized {
        lines.push(format!(
            "{}warning: {} is {}",
            indent(1),
            file.path,
            format_bytes(file.bytes)
        ));
    }

    lines.push(String::new());
    lines.push(if report.passed() {
        "Export verified".to_string()
    } else {
        "Export verification failed".to_string()
    });
    lines
}

pub fn print_verify_output(report: &VerifyReport) {
    print_lines(format_verify_output(report));
}

// ============================================================================
// Tests
// ============================================================================
