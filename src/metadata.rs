//! Page metadata and JSON-LD structured data.
//!
//! Every page describes itself with a [`PageMeta`]; [`page_metadata`] combines
//! it with the site-wide [`SiteInfo`] into the values that end up in `<head>`:
//! title, description, canonical URL, Open Graph and Twitter tags, robots.
//!
//! | Input | Output |
//! |-------|--------|
//! | `title: Some("Projects")` | `Projects \| {site.name}` |
//! | `title: None` | `{site.name}` |
//! | `path: "/projects/"` | `{site.url}/projects/` |
//! | `og_image: Some("/og/x.png")` | `{site.url}/og/x.png` |
//! | `og_image: Some("https://cdn/x.png")` | unchanged |
//! | `no_index: true` | `noindex, nofollow` |

use crate::config::SiteInfo;
use serde_json::{Value, json};
use url::Url;

/// Open Graph image dimensions advertised for every page.
pub const OG_IMAGE_WIDTH: u32 = 1200;
pub const OG_IMAGE_HEIGHT: u32 = 630;

/// What a page says about itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageMeta<'a> {
    /// Page title without the site suffix. `None` for the bare site name.
    pub title: Option<&'a str>,
    /// Falls back to the site description.
    pub description: Option<&'a str>,
    /// Root-relative path of the page, e.g. `/projects/`.
    pub path: &'a str,
    /// Falls back to the site's default image.
    pub og_image: Option<&'a str>,
    /// `article` for detail pages, `website` otherwise.
    pub article: bool,
    pub no_index: bool,
}

/// Resolved `<head>` values for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub title: String,
    pub description: String,
    pub canonical: String,
    pub og_image: String,
    pub og_type: &'static str,
    pub site_name: String,
    pub robots: &'static str,
    pub keywords: String,
    pub author: String,
    /// `None` when the site has no Twitter handle.
    pub twitter_creator: Option<String>,
}

pub fn page_metadata(site: &SiteInfo, page: &PageMeta) -> Metadata {
    let title = match page.title {
        Some(title) => format!("{title} | {}", site.name),
        None => site.name.clone(),
    };
    let description = page
        .description
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(site.description.as_str())
        .to_string();

    Metadata {
        title,
        description,
        canonical: absolute_url(site, page.path),
        og_image: absolute_url(site, page.og_image.unwrap_or(site.og_image.as_str())),
        og_type: if page.article { "article" } else { "website" },
        site_name: site.name.clone(),
        robots: if page.no_index {
            "noindex, nofollow"
        } else {
            "index, follow"
        },
        keywords: site.keywords.join(", "),
        author: site.author.clone(),
        twitter_creator: Some(site.twitter.clone()).filter(|t| !t.is_empty()),
    }
}

/// Resolve a site path against the canonical origin. Absolute http(s) URLs
/// are returned as they are.
///
/// Paths are always taken relative to the site root, so `..` segments are
/// normalized away and `//host/x` stays on the site instead of switching host.
pub fn absolute_url(site: &SiteInfo, path: &str) -> String {
    if Url::parse(path).is_ok_and(|u| matches!(u.scheme(), "http" | "https")) {
        return path.to_string();
    }
    let base = format!("{}/", site.origin());
    let relative = path.trim_start_matches('/');
    let Ok(base_url) = Url::parse(&base) else {
        return format!("{base}{relative}");
    };
    match base_url.join(relative) {
        Ok(url) if url.origin() == base_url.origin() => url.into(),
        _ => format!("{base}{relative}"),
    }
}

/// The schema.org document kinds emitted as `<script type="application/ld+json">`.
#[derive(Debug, Clone, Copy)]
pub enum StructuredData<'a> {
    /// The site owner. Used on the home page.
    Person,
    /// The site itself, with a search action into the knowledge listing.
    Website,
    /// A project or knowledge detail page.
    Article {
        headline: &'a str,
        description: &'a str,
        date_published: Option<&'a str>,
        date_modified: Option<&'a str>,
    },
}

pub fn structured_data(site: &SiteInfo, kind: StructuredData) -> Value {
    let origin = site.origin();
    let author = json!({ "@type": "Person", "name": site.author });
    let publisher = json!({
        "@type": "Organization",
        "name": site.name,
        "logo": { "@type": "ImageObject", "url": format!("{origin}/logo.png") },
    });

    match kind {
        StructuredData::Person => json!({
            "@context": "https://schema.org",
            "@type": "Person",
            "name": site.author,
            "url": origin,
            "sameAs": site.social,
            "jobTitle": site.job_title,
            "knowsAbout": site.keywords,
        }),
        StructuredData::Website => json!({
            "@context": "https://schema.org",
            "@type": "WebSite",
            "name": site.name,
            "description": site.description,
            "url": origin,
            "author": author,
            "publisher": publisher,
            "potentialAction": {
                "@type": "SearchAction",
                "target": format!("{origin}/knowledge/?search={{search_term_string}}"),
                "query-input": "required name=search_term_string",
            },
        }),
        StructuredData::Article {
            headline,
            description,
            date_published,
            date_modified,
        } => {
            let mut doc = json!({
                "@context": "https://schema.org",
                "@type": "Article",
                "headline": headline,
                "description": description,
                "author": author,
                "publisher": publisher,
            });
            if let Some(published) = date_published {
                doc["datePublished"] = json!(published);
            }
            if let Some(modified) = date_modified.or(date_published) {
                doc["dateModified"] = json!(modified);
            }
            doc
        }
    }
}
