//! Export verification.
//!
//! Inspects a generated site directory and reports whether it is ready to
//! deploy: required pages exist, assets were written, each main page is a
//! well-formed HTML document, and every root-relative link on those pages
//! resolves to a file in the export. A size summary is attached for
//! information only.

use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("export directory not found: {0}")]
    MissingOutput(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to walk export: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Pages every export must contain. These are also the pages whose HTML and
/// links are checked.
pub const REQUIRED_PAGES: [&str; 5] = [
    "index.html",
    "projects/index.html",
    "knowledge/index.html",
    "contact/index.html",
    "404.html",
];

pub const ASSETS_DIR: &str = "assets";

/// Files above this size are reported as a warning.
pub const LARGE_FILE_BYTES: u64 = 1024 * 1024;

const LARGEST_SHOWN: usize = 10;

const STRUCTURE_MARKERS: [(&str, &str); 5] = [
    ("<!doctype html", "doctype"),
    ("<html", "html element"),
    ("<head", "head element"),
    ("<body", "body element"),
    ("<title", "title element"),
];

const ACCESSIBILITY_MARKERS: [(&str, &str); 3] = [
    ("lang=", "lang attribute"),
    ("charset=", "charset declaration"),
    ("name=\"viewport\"", "viewport meta"),
];

static HREF_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="(/[^/"][^"]*|/)""#).expect("href pattern compiles"));

#[derive(Debug, Clone, Default, Serialize)]
pub struct VerifyReport {
    pub output_dir: String,
    pub present: Vec<String>,
    pub missing: Vec<String>,
    /// Number of files under `assets/`. Zero fails the check.
    pub asset_count: usize,
    pub pages: Vec<PageCheck>,
    pub links_checked: usize,
    pub broken_links: Vec<BrokenLink>,
    pub size: SizeSummary,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PageCheck {
    pub page: String,
    /// Missing structural elements. Non-empty fails the check.
    pub structure: Vec<String>,
    /// Missing accessibility basics. Reported but never fatal.
    pub accessibility: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenLink {
    pub page: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSize {
    pub path: String,
    pub bytes: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SizeSummary {
    pub total_bytes: u64,
    pub file_count: usize,
    pub largest: Vec<FileSize>,
    pub oversized: Vec<FileSize>,
}

impl VerifyReport {
    pub fn files_ok(&self) -> bool {
        self.missing.is_empty() && self.asset_count > 0
    }

    pub fn html_ok(&self) -> bool {
        self.pages.iter().all(|p| p.structure.is_empty())
    }

    pub fn links_ok(&self) -> bool {
        self.broken_links.is_empty()
    }

    pub fn passed(&self) -> bool {
        self.files_ok() && self.html_ok() && self.links_ok()
    }

    pub fn exit_code(&self) -> i32 {
        if self.passed() { 0 } else { 1 }
    }
}

pub fn verify_export(dir: &Path) -> Result<VerifyReport, VerifyError> {
    if !dir.is_dir() {
        return Err(VerifyError::MissingOutput(dir.to_path_buf()));
    }
    let mut report = VerifyReport {
        output_dir: dir.display().to_string(),
        ..Default::default()
    };

    for page in REQUIRED_PAGES {
        if dir.join(page).is_file() {
            report.present.push(page.to_string());
        } else {
            report.missing.push(page.to_string());
        }
    }

    let assets = dir.join(ASSETS_DIR);
    if assets.is_dir() {
        report.asset_count = WalkDir::new(&assets)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .count();
    }

    for page in REQUIRED_PAGES {
        let path = dir.join(page);
        if !path.is_file() {
            continue;
        }
        let html = fs::read_to_string(&path)?;
        report.pages.push(check_page(page, &html));

        for href in internal_links(&html) {
            report.links_checked += 1;
            if !dir.join(link_target(&href)).is_file() {
                debug!(page, href = %href, "broken link");
                report.broken_links.push(BrokenLink {
                    page: page.to_string(),
                    href,
                });
            }
        }
    }

    report.size = size_summary(dir)?;
    info!(
        passed = report.passed(),
        missing = report.missing.len(),
        broken_links = report.broken_links.len(),
        "export verified"
    );
    Ok(report)
}

/// Write the report as pretty-printed JSON.
pub fn write_report(report: &VerifyReport, path: &Path) -> Result<(), VerifyError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(report)?)?;
    Ok(())
}

fn check_page(page: &str, html: &str) -> PageCheck {
    let lower = html.to_lowercase();
    let missing = |markers: &[(&str, &'static str)]| -> Vec<String> {
        markers
            .iter()
            .filter(|(needle, _)| !lower.contains(needle))
            .map(|(_, name)| name.to_string())
            .collect()
    };
    PageCheck {
        page: page.to_string(),
        structure: missing(&STRUCTURE_MARKERS),
        accessibility: missing(&ACCESSIBILITY_MARKERS),
    }
}

/// Distinct root-relative hrefs, in document order. Protocol-relative
/// `//host` links are external and skipped.
fn internal_links(html: &str) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();
    for caps in HREF_PATTERN.captures_iter(html) {
        let href = caps[1].to_string();
        if !links.contains(&href) {
            links.push(href);
        }
    }
    links
}

/// Map a root-relative href to the file that serves it.
///
/// `/` -> `index.html`, `/a/b/` and `/a/b` -> `a/b/index.html`, and a last
/// segment with an extension maps to itself. Query and fragment are ignored.
fn link_target(href: &str) -> PathBuf {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return PathBuf::from("index.html");
    }
    let trimmed = path.trim_end_matches('/');
    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    if !path.ends_with('/') && last.contains('.') {
        PathBuf::from(trimmed)
    } else {
        Path::new(trimmed).join("index.html")
    }
}

fn size_summary(dir: &Path) -> Result<SizeSummary, VerifyError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        files.push(FileSize {
            path: rel.to_string_lossy().replace('\\', "/"),
            bytes: entry.metadata()?.len(),
        });
    }
    files.sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.path.cmp(&b.path)));

    Ok(SizeSummary {
        total_bytes: files.iter().map(|f| f.bytes).sum(),
        file_count: files.len(),
        oversized: files
            .iter()
            .filter(|f| f.bytes > LARGE_FILE_BYTES)
            .cloned()
            .collect(),
        largest: files.into_iter().take(LARGEST_SHOWN).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const GOOD_PAGE: &str = r#"<!DOCTYPE html><html lang="en"><head><meta charset="UTF-8"><meta name="viewport" content="width=device-width"><title>T</title></head><body><a href="/">Home</a><a href="/projects/">P</a><a href="https://gitlab.com">x</a></body></html>"#;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn complete_export() -> TempDir {
        let tmp = TempDir::new().unwrap();
        for page in REQUIRED_PAGES {
            write(tmp.path(), page, GOOD_PAGE);
        }
        write(tmp.path(), "assets/site-abc.css", "body{}");
        tmp
    }

    #[test]
    fn link_targets() {
        assert_eq!(link_target("/"), PathBuf::from("index.html"));
        assert_eq!(link_target("/projects/"), PathBuf::from("projects/index.html"));
        assert_eq!(link_target("/projects"), PathBuf::from("projects/index.html"));
        assert_eq!(link_target("/projects/page/2/"), PathBuf::from("projects/page/2/index.html"));
        assert_eq!(link_target("/assets/site-abc.css"), PathBuf::from("assets/site-abc.css"));
        assert_eq!(link_target("/404.html"), PathBuf::from("404.html"));
        assert_eq!(
            link_target("/knowledge/?category=Containers"),
            PathBuf::from("knowledge/index.html")
        );
        assert_eq!(link_target("/#main"), PathBuf::from("index.html"));
    }

    #[test]
    fn internal_links_skip_external_and_dedupe() {
        let html = r#"<a href="/a/"></a><a href="//cdn.example.com/x.js"></a><a href="https://x.dev/"></a><a href="/a/"></a><a href="/"></a>"#;
        assert_eq!(internal_links(html), vec!["/a/", "/"]);
    }

    #[test]
    fn complete_export_passes() {
        let tmp = complete_export();
        let report = verify_export(tmp.path()).unwrap();
        assert!(report.passed(), "{report:?}");
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.present.len(), REQUIRED_PAGES.len());
        assert_eq!(report.asset_count, 1);
        assert_eq!(report.links_checked, 10);
        assert_eq!(report.size.file_count, 6);
    }

    #[test]
    fn missing_page_fails() {
        let tmp = complete_export();
        fs::remove_file(tmp.path().join("contact/index.html")).unwrap();
        let report = verify_export(tmp.path()).unwrap();
        assert_eq!(report.missing, vec!["contact/index.html"]);
        assert!(!report.passed());
    }

    #[test]
    fn empty_assets_fail() {
        let tmp = complete_export();
        fs::remove_file(tmp.path().join("assets/site-abc.css")).unwrap();
        let report = verify_export(tmp.path()).unwrap();
        assert_eq!(report.asset_count, 0);
        assert!(!report.files_ok());
    }

    #[test]
    fn broken_link_fails() {
        let tmp = complete_export();
        write(
            tmp.path(),
            "index.html",
            &GOOD_PAGE.replace("/projects/", "/nowhere/"),
        );
        let report = verify_export(tmp.path()).unwrap();
        assert_eq!(
            report.broken_links,
            vec![BrokenLink {
                page: "index.html".to_string(),
                href: "/nowhere/".to_string()
            }]
        );
        assert!(!report.passed());
    }

    #[test]
    fn structure_fails_but_accessibility_only_warns() {
        let tmp = complete_export();
        write(tmp.path(), "404.html", &GOOD_PAGE.replace(r#" lang="en""#, ""));
        let report = verify_export(tmp.path()).unwrap();
        let page = report.pages.iter().find(|p| p.page == "404.html").unwrap();
        assert_eq!(page.accessibility, vec!["lang attribute"]);
        assert!(report.passed());

        write(tmp.path(), "404.html", "<p>not a document</p>");
        let report = verify_export(tmp.path()).unwrap();
        let page = report.pages.iter().find(|p| p.page == "404.html").unwrap();
        assert_eq!(page.structure.len(), 5);
        assert!(!report.passed());
    }

    #[test]
    fn size_summary_orders_and_flags_large_files() {
        let tmp = complete_export();
        let big = vec![b'x'; (LARGE_FILE_BYTES + 1) as usize];
        fs::write(tmp.path().join("assets/big.bin"), big).unwrap();
        let report = verify_export(tmp.path()).unwrap();
        assert_eq!(report.size.largest[0].path, "assets/big.bin");
        assert_eq!(report.size.oversized.len(), 1);
        assert!(report.passed());
    }

    #[test]
    fn missing_directory_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = verify_export(&tmp.path().join("dist"));
        assert!(matches!(result, Err(VerifyError::MissingOutput(_))));
    }

    #[test]
    fn report_is_written_as_json() {
        let tmp = complete_export();
        let report = verify_export(tmp.path()).unwrap();
        let out = tmp.path().join("reports/verify.json");
        write_report(&report, &out).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(value["missing"], serde_json::json!([]));
        assert_eq!(value["size"]["file_count"], 6);
    }
}
