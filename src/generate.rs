//! Static site generation.
//!
//! Loads both collections through a [`ContentStore`], renders every page with
//! maud, writes content-hashed assets, and copies the content JSON next to
//! the pages so the export can itself serve as a remote content source.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html                      # Hero + featured projects
//! ├── 404.html
//! ├── projects/
//! │   ├── index.html                  # Listing, page 1
//! │   ├── page/2/index.html           # Listing, pages 2..=N
//! │   └── {slug}/index.html           # Project detail
//! ├── knowledge/
//! │   ├── index.html                  # All entries + filter controls
//! │   └── {id}/index.html             # Entry detail with related projects
//! ├── contact/index.html
//! ├── assets/
//! │   ├── site-{hash}.css             # Colors from config + static/style.css
//! │   ├── filters-{hash}.js           # Knowledge filtering from the query string
//! │   └── contact-{hash}.js           # Contact form state machine
//! └── content/
//!     ├── projects/*.json
//!     └── knowledge/*.json
//! ```
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping. Markdown
//! bodies are rendered with pulldown-cmark and inserted pre-escaped.

use crate::config::{self, ContactConfig, SiteConfig, SiteInfo};
use crate::contact::{ContactForm, Field, FormStatus};
use crate::load::{ContentStore, resolve_related_projects};
use crate::metadata::{
    self, Metadata, OG_IMAGE_HEIGHT, OG_IMAGE_WIDTH, PageMeta, StructuredData,
};
use crate::query::{
    PaginatedResult, PaginationOptions, featured_projects, paginate, unique_categories,
    unique_tags,
};
use crate::source::ContentSource;
use crate::types::{Collection, KnowledgeEntry, Project, RelatedProject, is_safe_key};
use chrono::DateTime;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to walk {0}")]
    Walk(#[from] walkdir::Error),
    #[error("invalid JSON in {path}: {source}")]
    InvalidContent {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const FILTERS_JS: &str = include_str!("../static/filters.js");
const CONTACT_JS: &str = include_str!("../static/contact.js");

/// Hex digits of the SHA-256 content hash kept in asset filenames.
const ASSET_HASH_LEN: usize = 12;

/// Root-relative URLs of the written assets.
#[derive(Debug, Clone, Default)]
pub struct Assets {
    pub css: String,
    pub filters_js: String,
    pub contact_js: String,
}

/// One generated page: a human label and its path relative to the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPage {
    pub label: String,
    pub path: String,
}

/// Everything `generate` wrote, for CLI output.
#[derive(Debug, Clone, Default)]
pub struct GenerateReport {
    pub pages: Vec<GeneratedPage>,
    pub assets: Vec<String>,
    pub content_files: Vec<String>,
    /// Detail pages that could not be resolved, as `collection/key`.
    pub skipped: Vec<String>,
    pub project_count: usize,
    pub knowledge_count: usize,
}

impl GenerateReport {
    fn page(&mut self, label: impl Into<String>, path: impl Into<String>) {
        self.pages.push(GeneratedPage {
            label: label.into(),
            path: path.into(),
        });
    }
}

/// Generate the full static site into `output_dir`.
///
/// With a `content_root`, the JSON files are copied verbatim; without one
/// (remote content) the loaded collections are serialized instead.
pub fn generate<S: ContentSource>(
    store: &ContentStore<S>,
    config: &SiteConfig,
    content_root: Option<&Path>,
    output_dir: &Path,
) -> Result<GenerateReport, GenerateError> {
    let site = &config.site;
    let projects = store.load_projects();
    let entries = store.load_knowledge_entries(None);
    info!(
        projects = projects.len(),
        knowledge = entries.len(),
        source = %store.source().describe(),
        "content loaded"
    );

    let mut report = GenerateReport {
        project_count: projects.len(),
        knowledge_count: entries.len(),
        ..Default::default()
    };

    fs::create_dir_all(output_dir)?;
    let assets = write_assets(config, output_dir, &mut report)?;

    let categories = unique_categories(&entries);
    let home = render_index(site, &assets, &featured_projects(&projects), &categories);
    write_page(output_dir, "index.html", home)?;
    report.page("Home", "index.html");

    write_page(output_dir, "404.html", render_not_found(site, &assets))?;
    report.page("Not Found", "404.html");

    // Project listing pages
    let options =
        PaginationOptions::new(1, config.content.projects_per_page).unwrap_or_default();
    let first = paginate(&projects, options);
    let total_pages = first.total_pages;
    write_page(
        output_dir,
        "projects/index.html",
        render_projects_page(site, &assets, &first),
    )?;
    report.page("Projects", "projects/index.html");
    for n in 2..=total_pages {
        let options = PaginationOptions::new(n, options.limit.get()).unwrap_or(options);
        let page = paginate(&projects, options);
        let rel = format!("projects/page/{n}/index.html");
        write_page(output_dir, &rel, render_projects_page(site, &assets, &page))?;
        report.page(format!("Projects, page {n}"), rel);
    }

    // Project detail pages
    for listed in &projects {
        if !is_safe_key(&listed.slug) {
            warn!(slug = %listed.slug, "slug is not a plain file name, skipping page");
            report.skipped.push(format!("projects/{}", listed.slug));
            continue;
        }
        match store.load_project_by_slug(&listed.slug) {
            Some(project) => {
                let rel = format!("projects/{}/index.html", project.slug);
                write_page(output_dir, &rel, render_project_detail(site, &assets, &project))?;
                report.page(project.title.clone(), rel);
            }
            None => {
                warn!(slug = %listed.slug, "project detail unavailable, skipping page");
                report.skipped.push(format!("projects/{}", listed.slug));
            }
        }
    }

    // Knowledge listing and detail pages
    let tags = unique_tags(&entries);
    write_page(
        output_dir,
        "knowledge/index.html",
        render_knowledge_page(site, &assets, &entries, &categories, &tags),
    )?;
    report.page("Knowledge", "knowledge/index.html");

    for listed in &entries {
        if !is_safe_key(&listed.id) {
            warn!(id = %listed.id, "id is not a plain file name, skipping page");
            report.skipped.push(format!("knowledge/{}", listed.id));
            continue;
        }
        match store.load_knowledge_entry_by_id(&listed.id) {
            Some(entry) => {
                let related = resolve_related_projects(&entry, &projects);
                let rel = format!("knowledge/{}/index.html", entry.id);
                write_page(
                    output_dir,
                    &rel,
                    render_knowledge_detail(site, &assets, &entry, &related),
                )?;
                report.page(entry.title.clone(), rel);
            }
            None => {
                warn!(id = %listed.id, "knowledge detail unavailable, skipping page");
                report.skipped.push(format!("knowledge/{}", listed.id));
            }
        }
    }

    let contact = render_contact_page(site, &assets, &config.contact, &ContactForm::new());
    write_page(output_dir, "contact/index.html", contact)?;
    report.page("Contact", "contact/index.html");

    report.content_files = match content_root {
        Some(root) => copy_content(root, output_dir)?,
        None => export_collections(&projects, &entries, output_dir)?,
    };

    info!(
        pages = report.pages.len(),
        output = %output_dir.display(),
        "site generated"
    );
    Ok(report)
}

fn write_page(output_dir: &Path, rel: &str, markup: Markup) -> std::io::Result<()> {
    let path = output_dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    debug!(path = %rel, "writing page");
    fs::write(path, markup.into_string())
}

// ============================================================================
// Assets and content
// ============================================================================

fn content_hash(bytes: &[u8]) -> String {
    let hex = format!("{:x}", Sha256::digest(bytes));
    hex[..ASSET_HASH_LEN].to_string()
}

/// `site` + `css` + contents -> `site-{hash}.css`.
pub fn hashed_name(stem: &str, ext: &str, contents: &[u8]) -> String {
    format!("{stem}-{}.{ext}", content_hash(contents))
}

fn write_assets(
    config: &SiteConfig,
    output_dir: &Path,
    report: &mut GenerateReport,
) -> Result<Assets, GenerateError> {
    let assets_dir = output_dir.join("assets");
    fs::create_dir_all(&assets_dir)?;

    let css = format!("{}\n\n{}", config::generate_color_css(&config.colors), CSS_STATIC);
    let mut write = |stem: &str, ext: &str, contents: &str| -> std::io::Result<String> {
        let name = hashed_name(stem, ext, contents.as_bytes());
        fs::write(assets_dir.join(&name), contents)?;
        report.assets.push(format!("assets/{name}"));
        Ok(format!("/assets/{name}"))
    };

    Ok(Assets {
        css: write("site", "css", &css)?,
        filters_js: write("filters", "js", FILTERS_JS)?,
        contact_js: write("contact", "js", CONTACT_JS)?,
    })
}

/// Copy `{content_root}/{projects,knowledge}/**/*.json` into
/// `{output_dir}/content/`, parsing each file first.
///
/// Returns the copied paths relative to `output_dir`. A collection directory
/// that does not exist is skipped; a file that is not valid JSON fails the
/// whole copy.
pub fn copy_content(content_root: &Path, output_dir: &Path) -> Result<Vec<String>, GenerateError> {
    let mut copied = Vec::new();
    for collection in Collection::ALL {
        let src_dir = content_root.join(collection.dir_name());
        if !src_dir.is_dir() {
            warn!(path = %src_dir.display(), "content directory missing, nothing to copy");
            continue;
        }
        for entry in WalkDir::new(&src_dir).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|e| e != "json") {
                continue;
            }
            let text = fs::read_to_string(path)?;
            serde_json::from_str::<Value>(&text).map_err(|source| {
                GenerateError::InvalidContent {
                    path: path.to_path_buf(),
                    source,
                }
            })?;

            let rel = path.strip_prefix(content_root).unwrap_or(path);
            let dest = output_dir.join("content").join(rel);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&dest, text)?;
            copied.push(format!("content/{}", rel.to_string_lossy().replace('\\', "/")));
        }
    }
    Ok(copied)
}

/// Write loaded collections as `content/{collection}/index.json` plus one
/// document per entity, the layout a local content root would have.
fn export_collections(
    projects: &[Project],
    entries: &[KnowledgeEntry],
    output_dir: &Path,
) -> Result<Vec<String>, GenerateError> {
    let mut written = Vec::new();
    let mut write = |rel: String, value: String| -> std::io::Result<()> {
        let dest = output_dir.join(&rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(dest, value)?;
        written.push(rel);
        Ok(())
    };

    write(
        "content/projects/index.json".to_string(),
        serde_json::to_string_pretty(projects)?,
    )?;
    for project in projects.iter().filter(|p| exportable(Collection::Projects, &p.slug)) {
        write(
            format!("content/projects/{}.json", project.slug),
            serde_json::to_string_pretty(project)?,
        )?;
    }
    write(
        "content/knowledge/index.json".to_string(),
        serde_json::to_string_pretty(entries)?,
    )?;
    for entry in entries.iter().filter(|e| exportable(Collection::Knowledge, &e.id)) {
        write(
            format!("content/knowledge/{}.json", entry.id),
            serde_json::to_string_pretty(entry)?,
        )?;
    }
    Ok(written)
}

/// Per-entity documents are only written for keys that stay inside the
/// collection directory. The record itself remains in `index.json`.
fn exportable(collection: Collection, key: &str) -> bool {
    let safe = is_safe_key(key);
    if !safe {
        warn!(%collection, key, "key is not a plain file name, not exporting its document");
    }
    safe
}

// ============================================================================
// HTML Components
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Home,
    Projects,
    Knowledge,
    Contact,
    None,
}

const NAV_ITEMS: [(Section, &str, &str); 4] = [
    (Section::Home, "/", "Home"),
    (Section::Projects, "/projects/", "Projects"),
    (Section::Knowledge, "/knowledge/", "Knowledge"),
    (Section::Contact, "/contact/", "Contact"),
];

/// JSON-LD for a `<script>` body. `</` is escaped so the document cannot
/// close the script element early.
fn json_ld(value: &Value) -> PreEscaped<String> {
    PreEscaped(value.to_string().replace("</", "<\\/"))
}

/// `2024-06-01T00:00:00Z` -> `June 1, 2024`. Text that is not RFC 3339 is
/// shown as authored.
fn display_date(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|date| date.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Tags as a JSON array for `data-tags`, read back by the filter script.
fn tags_attr(tags: &[String]) -> String {
    Value::from(tags).to_string()
}

fn aria_bool(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn render_markdown(source: &str) -> PreEscaped<String> {
    let mut body_html = String::new();
    md_html::push_html(&mut body_html, Parser::new(source));
    PreEscaped(body_html)
}

/// Renders the base HTML document structure
fn base_document(
    meta: &Metadata,
    assets: &Assets,
    structured: &[Value],
    scripts: &[&str],
    content: Markup,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (meta.title) }
                meta name="description" content=(meta.description);
                meta name="keywords" content=(meta.keywords);
                meta name="author" content=(meta.author);
                meta name="robots" content=(meta.robots);
                link rel="canonical" href=(meta.canonical);
                meta property="og:type" content=(meta.og_type);
                meta property="og:locale" content="en_US";
                meta property="og:url" content=(meta.canonical);
                meta property="og:title" content=(meta.title);
                meta property="og:description" content=(meta.description);
                meta property="og:site_name" content=(meta.site_name);
                meta property="og:image" content=(meta.og_image);
                meta property="og:image:width" content=(OG_IMAGE_WIDTH);
                meta property="og:image:height" content=(OG_IMAGE_HEIGHT);
                meta property="og:image:alt" content=(meta.title);
                meta name="twitter:card" content="summary_large_image";
                meta name="twitter:title" content=(meta.title);
                meta name="twitter:description" content=(meta.description);
                meta name="twitter:image" content=(meta.og_image);
                @if let Some(creator) = &meta.twitter_creator {
                    meta name="twitter:creator" content=(creator);
                }
                link rel="stylesheet" href=(assets.css);
                @for doc in structured {
                    script type="application/ld+json" { (json_ld(doc)) }
                }
            }
            body {
                a.skip-link href="#main-content" { "Skip to main content" }
                (content)
                @for src in scripts {
                    script src=(src) defer {}
                }
            }
        }
    }
}

/// Renders the site header with the main navigation
fn site_header(site: &SiteInfo, current: Section) -> Markup {
    html! {
        header.site-header {
            a.site-name href="/" { (site.name) }
            nav.site-nav aria-label="Main" {
                ul {
                    @for (section, href, label) in NAV_ITEMS {
                        li {
                            @if section == current {
                                a.current href=(href) aria-current="page" { (label) }
                            } @else {
                                a href=(href) { (label) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn site_footer(site: &SiteInfo) -> Markup {
    html! {
        footer.site-footer {
            p { "© " (site.author) }
            @if !site.social.is_empty() {
                ul.social-links {
                    @for url in &site.social {
                        li { a href=(url) rel="me noopener" target="_blank" { (social_label(url)) } }
                    }
                }
            }
        }
    }
}

/// `https://gitlab.com/me` -> `gitlab.com`
fn social_label(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let host = rest.split('/').next().unwrap_or(rest);
    host.strip_prefix("www.").unwrap_or(host)
}

fn page_shell(site: &SiteInfo, current: Section, main_class: &str, content: Markup) -> Markup {
    html! {
        (site_header(site, current))
        main id="main-content" class=(main_class) {
            (content)
        }
        (site_footer(site))
    }
}

fn tag_list(tags: &[String], limit: Option<usize>) -> Markup {
    let shown = limit.unwrap_or(tags.len()).min(tags.len());
    html! {
        @if !tags.is_empty() {
            ul.tags aria-label="Tags" {
                @for tag in &tags[..shown] {
                    li.tag { (tag) }
                }
            }
        }
    }
}

fn project_card(project: &Project) -> Markup {
    html! {
        article.card.project-card.featured[project.featured] {
            h3 {
                a href={ "/projects/" (project.slug) "/" } { (project.title) }
            }
            @if project.featured {
                span.badge { "Featured" }
            }
            p.summary { (project.summary) }
            (tag_list(&project.tags, Some(3)))
        }
    }
}

fn empty_state(message: &str) -> Markup {
    html! {
        div.empty-state role="status" {
            p { (message) }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the home page: hero, featured projects, knowledge categories
fn render_index(
    site: &SiteInfo,
    assets: &Assets,
    featured: &[Project],
    categories: &[String],
) -> Markup {
    let meta = metadata::page_metadata(
        site,
        &PageMeta {
            title: Some("Home"),
            path: "/",
            ..Default::default()
        },
    );
    let structured = [
        metadata::structured_data(site, StructuredData::Website),
        metadata::structured_data(site, StructuredData::Person),
    ];

    let content = html! {
        section.hero aria-labelledby="hero-heading" {
            h1 #hero-heading { (site.job_title) }
            p.tagline { (site.tagline) }
            div.actions {
                a.button.primary href="/projects/" { "View Projects" }
                a.button href="/knowledge/" { "See Skills" }
            }
        }
        section.featured aria-labelledby="featured-heading" {
            h2 #featured-heading { "Featured Projects" }
            @if featured.is_empty() {
                (empty_state("No featured projects available yet."))
            } @else {
                div.card-grid {
                    @for project in featured {
                        (project_card(project))
                    }
                }
            }
            p.more { a href="/projects/" { "View All Projects" } }
        }
        @if !categories.is_empty() {
            section.categories aria-labelledby="categories-heading" {
                h2 #categories-heading { "Core Technologies" }
                ul.category-list {
                    @for category in categories {
                        li {
                            a href={ "/knowledge/?category=" (url_param(category)) } { (category) }
                        }
                    }
                }
            }
        }
    };

    base_document(
        &meta,
        assets,
        &structured,
        &[],
        page_shell(site, Section::Home, "home-page", content),
    )
}

fn url_param(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn listing_href(page: usize) -> String {
    if page <= 1 {
        "/projects/".to_string()
    } else {
        format!("/projects/page/{page}/")
    }
}

/// Renders one page of the project listing
fn render_projects_page(
    site: &SiteInfo,
    assets: &Assets,
    page: &PaginatedResult<Project>,
) -> Markup {
    let title = if page.page > 1 {
        format!("Projects (page {})", page.page)
    } else {
        "Projects".to_string()
    };
    let path = listing_href(page.page);
    let meta = metadata::page_metadata(
        site,
        &PageMeta {
            title: Some(title.as_str()),
            description: Some("Infrastructure, automation and tooling projects"),
            path: &path,
            ..Default::default()
        },
    );

    let content = html! {
        header.page-header {
            h1 { "Projects" }
            p.count { (page.total) " projects" }
        }
        @if page.data.is_empty() {
            (empty_state("No projects available yet."))
        } @else {
            div.card-grid {
                @for project in &page.data {
                    (project_card(project))
                }
            }
        }
        @if page.total_pages > 1 {
            nav.pagination aria-label="Pagination" {
                @if page.has_previous() {
                    a rel="prev" href=(listing_href(page.page - 1)) { "← Previous" }
                }
                ol {
                    @for n in 1..=page.total_pages {
                        li {
                            @if n == page.page {
                                span.current aria-current="page" { (n) }
                            } @else {
                                a href=(listing_href(n)) { (n) }
                            }
                        }
                    }
                }
                @if page.has_next() {
                    a rel="next" href=(listing_href(page.page + 1)) { "Next →" }
                }
            }
        }
    };

    base_document(
        &meta,
        assets,
        &[],
        &[],
        page_shell(site, Section::Projects, "projects-page", content),
    )
}

/// Renders a project detail page
fn render_project_detail(site: &SiteInfo, assets: &Assets, project: &Project) -> Markup {
    let path = format!("/projects/{}/", project.slug);
    let meta = metadata::page_metadata(
        site,
        &PageMeta {
            title: Some(project.title.as_str()),
            description: Some(project.summary.as_str()),
            path: &path,
            og_image: project.og_image.as_deref(),
            article: true,
            ..Default::default()
        },
    );
    let article = metadata::structured_data(
        site,
        StructuredData::Article {
            headline: &project.title,
            description: project.description.as_deref().unwrap_or(&project.summary),
            date_published: project.published_at.as_deref(),
            date_modified: None,
        },
    );

    let content = html! {
        nav.breadcrumb aria-label="Breadcrumb" {
            a href="/projects/" { "Projects" }
            " › "
            span aria-current="page" { (project.title) }
        }
        article.project-detail {
            header {
                h1 { (project.title) }
                @if project.featured {
                    span.badge { "Featured" }
                }
                p.summary { (project.summary) }
                @if let Some(published) = &project.published_at {
                    p.published { "Published " time datetime=(published) { (display_date(published)) } }
                }
                (tag_list(&project.tags, None))
            }
            @if let Some(description) = &project.description {
                p.description { (description) }
            }
            @if let Some(body) = &project.content {
                div.prose { (render_markdown(body)) }
            }
            p.external {
                a.button.primary href=(project.external_url) target="_blank" rel="noopener noreferrer" {
                    "View Source"
                }
            }
        }
    };

    base_document(
        &meta,
        assets,
        &[article],
        &[],
        page_shell(site, Section::Projects, "project-page", content),
    )
}

/// Renders the knowledge listing with filter controls.
///
/// Cards carry their category and tags as data attributes; the filter script
/// applies the query-string filters client-side.
fn render_knowledge_page(
    site: &SiteInfo,
    assets: &Assets,
    entries: &[KnowledgeEntry],
    categories: &[String],
    tags: &[String],
) -> Markup {
    let meta = metadata::page_metadata(
        site,
        &PageMeta {
            title: Some("Knowledge"),
            description: Some("Technical skills, tools and areas of expertise"),
            path: "/knowledge/",
            ..Default::default()
        },
    );

    let content = html! {
        header.page-header {
            h1 { "Knowledge" }
            p.count data-result-count { (entries.len()) " entries" }
        }
        @if entries.is_empty() {
            (empty_state("No knowledge entries available yet."))
        } @else {
            form.filters method="get" action="/knowledge/" role="search" data-filters {
                div.field {
                    label for="filter-search" { "Search" }
                    input #filter-search type="search" name="search" placeholder="Search skills";
                }
                div.field {
                    label for="filter-category" { "Category" }
                    select #filter-category name="category" {
                        option value="" { "All categories" }
                        @for category in categories {
                            option value=(category) { (category) }
                        }
                    }
                }
                fieldset.tag-filter {
                    legend { "Tags" }
                    @for tag in tags {
                        label.tag-option {
                            input type="checkbox" value=(tag) data-tag;
                            " " (tag)
                        }
                    }
                }
                input type="hidden" name="tags" value="";
                div.actions {
                    button.button type="submit" { "Apply" }
                    a.button href="/knowledge/" { "Clear" }
                }
            }
            div.card-grid data-knowledge-list {
                @for entry in entries {
                    article.card.knowledge-card
                        data-category=(entry.category)
                        data-tags=(tags_attr(&entry.tags)) {
                        h3 {
                            a href={ "/knowledge/" (entry.id) "/" } { (entry.title) }
                        }
                        p.category { (entry.category) }
                        p.summary { (entry.summary) }
                        (tag_list(&entry.tags, None))
                    }
                }
            }
            div.empty-state role="status" data-no-results hidden {
                p { "No entries match the current filters." }
            }
        }
    };

    base_document(
        &meta,
        assets,
        &[],
        &[assets.filters_js.as_str()],
        page_shell(site, Section::Knowledge, "knowledge-page", content),
    )
}

/// Renders a knowledge detail page with resolved related projects
fn render_knowledge_detail(
    site: &SiteInfo,
    assets: &Assets,
    entry: &KnowledgeEntry,
    related: &[RelatedProject],
) -> Markup {
    let path = format!("/knowledge/{}/", entry.id);
    let meta = metadata::page_metadata(
        site,
        &PageMeta {
            title: Some(entry.title.as_str()),
            description: Some(entry.summary.as_str()),
            path: &path,
            article: true,
            ..Default::default()
        },
    );
    let article = metadata::structured_data(
        site,
        StructuredData::Article {
            headline: &entry.title,
            description: entry.description.as_deref().unwrap_or(&entry.summary),
            date_published: entry.published_at.as_deref(),
            date_modified: entry.last_updated.as_deref(),
        },
    );

    let content = html! {
        nav.breadcrumb aria-label="Breadcrumb" {
            a href="/knowledge/" { "Knowledge" }
            " › "
            span aria-current="page" { (entry.title) }
        }
        article.knowledge-detail {
            header {
                h1 { (entry.title) }
                p.category {
                    a href={ "/knowledge/?category=" (url_param(&entry.category)) } { (entry.category) }
                }
                p.summary { (entry.summary) }
                (tag_list(&entry.tags, None))
            }
            @if entry.experience_level.is_some() || entry.years_of_experience.is_some() {
                dl.experience {
                    @if let Some(level) = entry.experience_level {
                        dt { "Experience level" }
                        dd { (level) }
                    }
                    @if let Some(years) = &entry.years_of_experience {
                        dt { "Years of experience" }
                        dd { (years.to_string()) }
                    }
                }
            }
            @if let Some(description) = &entry.description {
                p.description { (description) }
            }
            @if let Some(body) = &entry.content {
                div.prose { (render_markdown(body)) }
            }
            @if let Some(certifications) = entry.certifications.as_ref().filter(|c| !c.is_empty()) {
                section.certifications {
                    h2 { "Certifications" }
                    ul {
                        @for cert in certifications {
                            li { (cert) }
                        }
                    }
                }
            }
            @if let Some(resources) = entry.learning_resources.as_ref().filter(|r| !r.is_empty()) {
                section.resources {
                    h2 { "Learning Resources" }
                    ul {
                        @for resource in resources {
                            li {
                                a href=(resource.url) target="_blank" rel="noopener noreferrer" { (resource.title) }
                                " "
                                span.resource-type { (resource.kind.as_str()) }
                            }
                        }
                    }
                }
            }
            @if !related.is_empty() {
                section.related {
                    h2 { "Related Projects" }
                    ul {
                        @for project in related {
                            li.missing[!project.is_resolved()] {
                                a href={ "/projects/" (project.slug()) "/" } { (project.title()) }
                            }
                        }
                    }
                }
            }
            @if let Some(link) = &entry.link {
                p.external { a href=(link) { "Learn more" } }
            }
            @if let Some(updated) = &entry.last_updated {
                p.updated { "Last updated: " time datetime=(updated) { (display_date(updated)) } }
            }
        }
    };

    base_document(
        &meta,
        assets,
        &[article],
        &[],
        page_shell(site, Section::Knowledge, "knowledge-entry-page", content),
    )
}

/// Renders the contact page with the form in the given state
fn render_contact_page(
    site: &SiteInfo,
    assets: &Assets,
    contact: &ContactConfig,
    form: &ContactForm,
) -> Markup {
    let meta = metadata::page_metadata(
        site,
        &PageMeta {
            title: Some("Contact"),
            description: Some("Get in touch about projects, collaboration or consulting"),
            path: "/contact/",
            ..Default::default()
        },
    );
    let submitted = form.status() == FormStatus::Submitted;
    let submitting = form.status() == FormStatus::Submitting;

    let content = html! {
        header.page-header {
            h1 { "Contact" }
            p { "Have a project in mind or a question? Send a message." }
            @if !contact.email.is_empty() {
                p.email { a href={ "mailto:" (contact.email) } { (contact.email) } }
            }
        }
        div.contact-success role="status" hidden[!submitted] data-contact-success {
            h2 { "Message sent" }
            p { "Thanks for reaching out. I'll get back to you soon." }
            button.button type="button" data-send-another { "Send another message" }
        }
        form.contact-form novalidate hidden[submitted]
            data-contact-form
            data-submit-delay=(contact.submit_delay_ms) {
            @for field in Field::ALL {
                @let id = format!("contact-{}", field.name());
                @let error_id = format!("{id}-error");
                @let error = form.error(field);
                div.field.invalid[error.is_some()] {
                    label for=(id) { (field.label()) }
                    @match field {
                        Field::Message => {
                            textarea id=(id) name=(field.name()) rows="6" required
                                aria-invalid=(aria_bool(error.is_some()))
                                aria-describedby=(error_id) { (form.value(field)) }
                        }
                        Field::Email => {
                            input id=(id) type="email" name=(field.name()) required
                                autocomplete="email"
                                value=(form.value(field))
                                aria-invalid=(aria_bool(error.is_some()))
                                aria-describedby=(error_id);
                        }
                        Field::Name => {
                            input id=(id) type="text" name=(field.name()) required
                                autocomplete="name"
                                value=(form.value(field))
                                aria-invalid=(aria_bool(error.is_some()))
                                aria-describedby=(error_id);
                        }
                    }
                    p.field-error id=(error_id) data-error-for=(field.name()) {
                        @if let Some(message) = error { (message) }
                    }
                }
            }
            button.button.primary type="submit" disabled[submitting] {
                @if submitting { "Sending..." } @else { "Send Message" }
            }
        }
    };

    base_document(
        &meta,
        assets,
        &[],
        &[assets.contact_js.as_str()],
        page_shell(site, Section::Contact, "contact-page", content),
    )
}

/// Renders the 404 page
fn render_not_found(site: &SiteInfo, assets: &Assets) -> Markup {
    let meta = metadata::page_metadata(
        site,
        &PageMeta {
            title: Some("Page Not Found"),
            description: Some("The page you are looking for does not exist."),
            path: "/404.html",
            no_index: true,
            ..Default::default()
        },
    );
    let content = html! {
        h1 { "404" }
        p { "The page you are looking for does not exist or has been moved." }
        div.actions {
            a.button.primary href="/" { "Go Home" }
            a.button href="/projects/" { "Browse Projects" }
        }
    };

    base_document(
        &meta,
        assets,
        &[],
        &[],
        page_shell(site, Section::None, "not-found-page", content),
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::LocalSource;
    use crate::test_helpers::*;
    use crate::types::{ExperienceLevel, LearningResource, ResourceType};
    use serde_json::json;
    use tempfile::TempDir;

    fn site() -> SiteInfo {
        SiteInfo::default()
    }

    fn assets() -> Assets {
        Assets {
            css: "/assets/site-abc.css".to_string(),
            filters_js: "/assets/filters-abc.js".to_string(),
            contact_js: "/assets/contact-abc.js".to_string(),
        }
    }

    // =========================================================================
    // Components
    // =========================================================================

    #[test]
    fn base_document_includes_doctype_and_head() {
        let meta = metadata::page_metadata(&site(), &PageMeta::default());
        let doc = base_document(&meta, &assets(), &[], &[], html! { p { "test" } }).into_string();
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains(r#"<html lang="en">"#));
        assert!(doc.contains(r#"<meta charset="UTF-8">"#));
        assert!(doc.contains(r#"name="viewport""#));
        assert!(doc.contains(r#"href="/assets/site-abc.css""#));
        assert!(doc.contains(r#"rel="canonical""#));
    }

    #[test]
    fn json_ld_cannot_close_script() {
        let value = serde_json::json!({"headline": "</script><script>alert(1)"});
        let rendered = json_ld(&value).0;
        assert!(!rendered.contains("</script>"));
    }

    #[test]
    fn header_marks_current_section() {
        let header = site_header(&site(), Section::Knowledge).into_string();
        assert!(header.contains(r#"<a class="current" href="/knowledge/" aria-current="page">"#));
        assert_eq!(header.matches("aria-current").count(), 1);
    }

    #[test]
    fn social_label_is_host() {
        assert_eq!(social_label("https://www.linkedin.com/in/me"), "linkedin.com");
        assert_eq!(social_label("https://gitlab.com/me"), "gitlab.com");
    }

    #[test]
    fn html_escape_in_maud() {
        let mut p = project("x");
        p.title = "<script>alert('xss')</script>".to_string();
        let html = project_card(&p).into_string();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn hashed_name_changes_with_content() {
        let a = hashed_name("site", "css", b"body{}");
        let b = hashed_name("site", "css", b"body{ }");
        assert!(a.starts_with("site-") && a.ends_with(".css"));
        assert_eq!(a.len(), "site-".len() + ASSET_HASH_LEN + ".css".len());
        assert_ne!(a, b);
        assert_eq!(a, hashed_name("site", "css", b"body{}"));
    }

    // =========================================================================
    // Page renderers
    // =========================================================================

    #[test]
    fn index_shows_featured_or_empty_state() {
        let mut p = project("ci");
        p.featured = true;
        let html = render_index(&site(), &assets(), &[p], &["Containers".to_string()]).into_string();
        assert!(html.contains(r#"href="/projects/ci/""#));
        assert!(html.contains("Featured"));
        assert!(html.contains(r#"href="/knowledge/?category=Containers""#));
        assert!(html.contains("application/ld+json"));

        let empty = render_index(&site(), &assets(), &[], &[]).into_string();
        assert!(empty.contains("No featured projects available yet."));
    }

    #[test]
    fn projects_page_pagination_links() {
        let projects = numbered_projects(25);
        let page2 = paginate(&projects, PaginationOptions::new(2, 10).unwrap());
        let html = render_projects_page(&site(), &assets(), &page2).into_string();
        assert!(html.contains(r#"href="/projects/p11/""#));
        assert!(!html.contains(r#"href="/projects/p01/""#));
        assert!(html.contains(r#"rel="prev" href="/projects/""#));
        assert!(html.contains(r#"rel="next" href="/projects/page/3/""#));
        assert!(html.contains("Projects (page 2) | "));
    }

    #[test]
    fn projects_page_empty_state() {
        let page = paginate::<Project>(&[], PaginationOptions::default());
        let html = render_projects_page(&site(), &assets(), &page).into_string();
        assert!(html.contains("No projects available yet."));
        assert!(!html.contains("pagination"));
    }

    #[test]
    fn project_detail_renders_markdown_and_link() {
        let mut p = project("ci");
        p.content = Some("Uses **GitLab** runners".to_string());
        p.og_image = Some("/og/ci.png".to_string());
        p.published_at = Some("2024-01-15T10:00:00Z".to_string());
        let html = render_project_detail(&site(), &assets(), &p).into_string();
        assert!(html.contains(r#"<time datetime="2024-01-15T10:00:00Z">January 15, 2024</time>"#));
        assert!(html.contains("<strong>GitLab</strong>"));
        assert!(html.contains(r#"href="https://gitlab.com/dev/ci""#));
        assert!(html.contains(r#"content="https://example.com/og/ci.png""#));
        assert!(html.contains(r#"content="article""#));
    }

    #[test]
    fn knowledge_page_has_filter_controls_and_data_attributes() {
        let entries = vec![
            knowledge_entry("docker", "Containers", &["docker", "devops"]),
            knowledge_entry("rust", "Languages", &["systems"]),
        ];
        let html = render_knowledge_page(
            &site(),
            &assets(),
            &entries,
            &unique_categories(&entries),
            &unique_tags(&entries),
        )
        .into_string();
        assert!(html.contains(r#"data-category="Containers""#));
        assert!(html.contains(r#"data-tags="[&quot;docker&quot;,&quot;devops&quot;]""#));
        assert!(html.contains(r#"<option value="Languages">"#));
        assert!(html.contains(r#"src="/assets/filters-abc.js""#));
        assert!(html.contains("data-no-results"));
    }

    #[test]
    fn dates_are_shown_readably() {
        assert_eq!(display_date("2024-06-01T00:00:00Z"), "June 1, 2024");
        assert_eq!(display_date("2024-01-15T10:00:00+02:00"), "January 15, 2024");
        assert_eq!(display_date("last spring"), "last spring");
    }

    #[test]
    fn data_tags_survive_separator_characters() {
        let tags = vec!["ci|cd".to_string(), "a,b".to_string(), r#"say "hi""#.to_string()];
        let parsed: Vec<String> = serde_json::from_str(&tags_attr(&tags)).unwrap();
        assert_eq!(parsed, tags);
    }

    #[test]
    fn knowledge_page_empty_state() {
        let html = render_knowledge_page(&site(), &assets(), &[], &[], &[]).into_string();
        assert!(html.contains("No knowledge entries available yet."));
        assert!(!html.contains("data-filters"));
    }

    #[test]
    fn knowledge_detail_shows_related_and_stubs() {
        let mut entry = knowledge_entry("docker", "Containers", &["docker"]);
        entry.experience_level = Some(ExperienceLevel::Advanced);
        entry.years_of_experience = Some(serde_json::Number::from(5u64));
        entry.learning_resources = Some(vec![LearningResource {
            title: "Docker Docs".to_string(),
            url: "https://docs.docker.com".to_string(),
            kind: ResourceType::Documentation,
        }]);
        let related = vec![
            RelatedProject::Resolved(project("ci")),
            RelatedProject::Missing {
                slug: "gone".to_string(),
            },
        ];
        let html = render_knowledge_detail(&site(), &assets(), &entry, &related).into_string();
        assert!(html.contains("advanced"));
        assert!(html.contains("<dd>5</dd>"));
        assert!(html.contains("Docker Docs"));
        assert!(html.contains("documentation"));
        assert!(html.contains("Project ci"));
        assert!(html.contains(r#"<li class="missing"><a href="/projects/gone/">gone</a></li>"#));
    }

    #[test]
    fn contact_page_initial_state() {
        let html =
            render_contact_page(&site(), &assets(), &ContactConfig::default(), &ContactForm::new())
                .into_string();
        assert!(html.contains(r#"data-submit-delay="1000""#));
        assert!(html.contains(r#"name="email""#));
        assert!(html.contains("Send Message"));
        assert!(html.contains(r#"src="/assets/contact-abc.js""#));
        // success panel hidden, form visible
        assert!(html.contains(r#"role="status" hidden"#));
        assert!(!html.contains("field invalid"));
    }

    #[test]
    fn contact_page_renders_errors() {
        let mut form = ContactForm::new();
        form.submit().unwrap();
        let html = render_contact_page(&site(), &assets(), &ContactConfig::default(), &form)
            .into_string();
        assert!(html.contains("Name is required"));
        assert!(html.contains("field invalid"));
    }

    #[test]
    fn not_found_is_noindex() {
        let html = render_not_found(&site(), &assets()).into_string();
        assert!(html.contains("noindex, nofollow"));
        assert!(html.contains("<title>Page Not Found | "));
    }

    // =========================================================================
    // Content copy
    // =========================================================================

    #[test]
    fn copy_content_copies_json_only() {
        let src = setup_fixtures();
        std::fs::write(src.path().join("projects/notes.txt"), "ignore me").unwrap();
        let out = TempDir::new().unwrap();

        let copied = copy_content(src.path(), out.path()).unwrap();
        assert!(copied.contains(&"content/projects/index.json".to_string()));
        assert!(copied.contains(&"content/knowledge/index.json".to_string()));
        assert!(out.path().join("content/knowledge/docker.json").exists());
        assert!(!out.path().join("content/projects/notes.txt").exists());
    }

    #[test]
    fn copy_content_rejects_invalid_json() {
        let src = setup_fixtures();
        std::fs::write(src.path().join("knowledge/broken.json"), "{ nope").unwrap();
        let out = TempDir::new().unwrap();

        let err = copy_content(src.path(), out.path()).unwrap_err();
        match err {
            GenerateError::InvalidContent { path, .. } => {
                assert!(path.ends_with("knowledge/broken.json"))
            }
            other => panic!("expected InvalidContent, got {other:?}"),
        }
    }

    #[test]
    fn export_collections_writes_index_and_entities() {
        let out = TempDir::new().unwrap();
        let written = export_collections(
            &[project("alpha")],
            &[knowledge_entry("docker", "Containers", &[])],
            out.path(),
        )
        .unwrap();
        assert_eq!(written.len(), 4);
        let index: Value = serde_json::from_str(
            &std::fs::read_to_string(out.path().join("content/projects/index.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(index[0]["slug"], "alpha");
    }

    // =========================================================================
    // Full generation
    // =========================================================================

    #[test]
    fn generate_fixture_site() {
        let src = setup_fixtures();
        let out = TempDir::new().unwrap();
        let config = config::load_config(src.path()).unwrap();
        let store = ContentStore::new(LocalSource::new(src.path()));

        let report = generate(&store, &config, Some(src.path()), out.path()).unwrap();

        for rel in [
            "index.html",
            "404.html",
            "projects/index.html",
            "projects/page/2/index.html",
            "projects/ci-pipeline/index.html",
            "knowledge/index.html",
            "knowledge/docker/index.html",
            "contact/index.html",
            "content/projects/index.json",
        ] {
            assert!(out.path().join(rel).exists(), "missing {rel}");
        }
        assert_eq!(report.assets.len(), 3);
        assert!(report.skipped.is_empty());
        assert!(report.pages.iter().any(|p| p.path == "projects/ci-pipeline/index.html"));

        let css_rel = report.assets.iter().find(|a| a.ends_with(".css")).unwrap();
        let css = std::fs::read_to_string(out.path().join(css_rel)).unwrap();
        assert!(css.contains("--color-bg:"));

        let home = std::fs::read_to_string(out.path().join("index.html")).unwrap();
        assert!(home.contains("Fixture Portfolio"));
    }

    #[test]
    fn keys_that_are_not_file_names_stay_inside_output() {
        let work = TempDir::new().unwrap();
        let content = work.path().join("content");
        write_json(&content, "projects/index.json", &json!([raw_project("alpha")]));
        write_json(
            &content,
            "knowledge/index.json",
            &json!([raw_knowledge_entry("../../escaped"), raw_knowledge_entry("docker")]),
        );
        let out = work.path().join("site/dist");
        let store = ContentStore::new(LocalSource::new(&content));

        // No content root: collections are serialized, as for a remote source.
        let report = generate(&store, &SiteConfig::default(), None, &out).unwrap();

        // dist/knowledge/../../escaped and dist/content/knowledge/../../escaped.json
        assert!(!work.path().join("site/escaped").exists());
        assert!(!out.join("escaped.json").exists());
        assert_eq!(report.skipped, vec!["knowledge/../../escaped".to_string()]);
        assert!(out.join("knowledge/docker/index.html").exists());
        assert!(report.content_files.iter().all(|f| !f.contains("..")));
        assert!(report.content_files.contains(&"content/knowledge/docker.json".to_string()));
        assert!(report.pages.iter().all(|p| !p.path.contains("..")));
    }

    #[test]
    fn generate_with_empty_content_still_writes_shell() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let store = ContentStore::new(LocalSource::new(src.path()));

        let report = generate(&store, &SiteConfig::default(), Some(src.path()), out.path()).unwrap();
        assert_eq!(report.project_count, 0);
        let projects = std::fs::read_to_string(out.path().join("projects/index.html")).unwrap();
        assert!(projects.contains("No projects available yet."));
        assert!(!out.path().join("projects/page/2").exists());
    }
}
