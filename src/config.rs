//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; the user's `config.toml` in the content root is merged on
//! top of them, so a config file only needs the keys it wants to change.
//!
//! ## Config File Location
//!
//! ```text
//! content/
//! ├── config.toml          # Overrides stock defaults
//! ├── projects/
//! │   ├── index.json
//! │   └── {slug}.json
//! └── knowledge/
//!     ├── index.json
//!     └── {id}.json
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! name = "DevOps Portfolio"
//! description = "Infrastructure automation, cloud solutions and technical expertise"
//! url = "https://example.com"     # Canonical origin, no trailing slash
//! og_image = "/og-image.jpg"      # Default Open Graph image
//! author = "DevOps Engineer"
//! job_title = "DevOps Engineer"
//! tagline = "Building scalable infrastructure and automating deployments"
//! twitter = ""                    # Handle for twitter:creator, e.g. "@me"
//! social = []                     # Profile URLs (JSON-LD sameAs)
//! keywords = ["DevOps", "Docker", "Kubernetes"]
//!
//! [content]
//! base_url = ""                   # Empty = read local files
//! projects_per_page = 12
//!
//! [fetch]
//! retries = 3                     # Re-attempts after the first request
//! delay_ms = 1000                 # Fixed delay before each re-attempt
//! timeout_secs = 30
//!
//! [contact]
//! email = ""
//! submit_delay_ms = 1000
//!
//! [colors.light]
//! background = "#ffffff"
//! surface = "#f4f4f5"
//! text = "#111111"
//! text_muted = "#666666"
//! border = "#e0e0e0"
//! link = "#333333"
//! link_hover = "#000000"
//! accent = "#0f7b5f"
//!
//! [colors.dark]
//! background = "#0a0a0a"
//! surface = "#161616"
//! text = "#eeeeee"
//! text_muted = "#999999"
//! border = "#333333"
//! link = "#cccccc"
//! link_hover = "#ffffff"
//! accent = "#3ddc97"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::fetch::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Identity of the site: name, canonical origin, author, social links.
    pub site: SiteInfo,
    /// Where content is read from and how listings are paged.
    pub content: ContentConfig,
    /// Remote loading behavior.
    pub fetch: FetchConfig,
    /// Contact page settings.
    pub contact: ContactConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.name.trim().is_empty() {
            return Err(ConfigError::Validation("site.name must not be empty".into()));
        }
        if !is_http_url(&self.site.url) {
            return Err(ConfigError::Validation(format!(
                "site.url must be an absolute http(s) URL, got {:?}",
                self.site.url
            )));
        }
        if !self.content.base_url.is_empty() && !is_http_url(&self.content.base_url) {
            return Err(ConfigError::Validation(format!(
                "content.base_url must be empty or an absolute http(s) URL, got {:?}",
                self.content.base_url
            )));
        }
        if self.content.projects_per_page == 0 {
            return Err(ConfigError::Validation(
                "content.projects_per_page must be at least 1".into(),
            ));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "fetch.timeout_secs must be at least 1".into(),
            ));
        }
        for (mode, scheme) in [("light", &self.colors.light), ("dark", &self.colors.dark)] {
            if let Some(name) = scheme.first_empty() {
                return Err(ConfigError::Validation(format!(
                    "colors.{mode}.{name} must not be empty"
                )));
            }
        }
        Ok(())
    }
}

fn is_http_url(s: &str) -> bool {
    Url::parse(s).is_ok_and(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
}

/// Global site identity. Built once per run and passed by reference into
/// every metadata call; never mutated after loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    pub name: String,
    pub description: String,
    /// Canonical origin. Page paths are appended to it verbatim.
    pub url: String,
    /// Default Open Graph image, a root-relative path or absolute URL.
    pub og_image: String,
    pub author: String,
    pub job_title: String,
    /// Hero subtitle on the home page.
    pub tagline: String,
    /// Handle for `twitter:creator`. Empty to omit.
    pub twitter: String,
    /// Profile URLs, emitted as JSON-LD `sameAs`.
    pub social: Vec<String>,
    pub keywords: Vec<String>,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name: "DevOps Portfolio".to_string(),
            description: "Infrastructure automation, cloud solutions and technical expertise"
                .to_string(),
            url: "https://example.com".to_string(),
            og_image: "/og-image.jpg".to_string(),
            author: "DevOps Engineer".to_string(),
            job_title: "DevOps Engineer".to_string(),
            tagline: "Building scalable infrastructure and automating deployments".to_string(),
            twitter: String::new(),
            social: Vec::new(),
            keywords: vec![
                "DevOps".to_string(),
                "Docker".to_string(),
                "Kubernetes".to_string(),
            ],
        }
    }
}

impl SiteInfo {
    /// The canonical origin without a trailing slash.
    pub fn origin(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

/// Content location and listing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    /// Origin of a previous export to load content from over HTTP.
    /// Empty means read the local content directory.
    pub base_url: String,
    /// Page size of the project listing.
    pub projects_per_page: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            projects_per_page: crate::query::DEFAULT_PAGE_SIZE,
        }
    }
}

/// Remote loading settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Re-attempts after the initial request.
    pub retries: u32,
    /// Fixed delay before each re-attempt, in milliseconds.
    pub delay_ms: u64,
    /// Per-request timeout, in seconds.
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            delay_ms: 1000,
            timeout_secs: 30,
        }
    }
}

impl FetchConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.retries,
            delay: Duration::from_millis(self.delay_ms),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Contact page settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContactConfig {
    /// Shown as a `mailto:` link next to the form. Empty to omit.
    pub email: String,
    /// Simulated submission latency, in milliseconds.
    pub submit_delay_ms: u64,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            email: String::new(),
            submit_delay_ms: 1000,
        }
    }
}

impl ContactConfig {
    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    /// Page background.
    pub background: String,
    /// Card and input background.
    pub surface: String,
    /// Primary text color.
    pub text: String,
    /// Secondary text (summaries, metadata, footer).
    pub text_muted: String,
    pub border: String,
    pub link: String,
    pub link_hover: String,
    /// Featured badges, active filters and focus rings.
    pub accent: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            surface: "#f4f4f5".to_string(),
            text: "#111111".to_string(),
            text_muted: "#666666".to_string(),
            border: "#e0e0e0".to_string(),
            link: "#333333".to_string(),
            link_hover: "#000000".to_string(),
            accent: "#0f7b5f".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#0a0a0a".to_string(),
            surface: "#161616".to_string(),
            text: "#eeeeee".to_string(),
            text_muted: "#999999".to_string(),
            border: "#333333".to_string(),
            link: "#cccccc".to_string(),
            link_hover: "#ffffff".to_string(),
            accent: "#3ddc97".to_string(),
        }
    }

    fn entries(&self) -> [(&'static str, &str); 8] {
        [
            ("background", self.background.as_str()),
            ("surface", self.surface.as_str()),
            ("text", self.text.as_str()),
            ("text_muted", self.text_muted.as_str()),
            ("border", self.border.as_str()),
            ("link", self.link.as_str()),
            ("link_hover", self.link_hover.as_str()),
            ("accent", self.accent.as_str()),
        ]
    }

    fn first_empty(&self) -> Option<&'static str> {
        self.entries()
            .into_iter()
            .find(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key by key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the content root.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Folio Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file at the root of the content directory:
#   content/config.toml
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site identity (titles, canonical URLs, Open Graph, structured data)
# ---------------------------------------------------------------------------
[site]
name = "DevOps Portfolio"
description = "Infrastructure automation, cloud solutions and technical expertise"

# Canonical origin. Page paths are appended to it, e.g. https://example.com/projects/
url = "https://example.com"

# Default Open Graph image: a path under the site or an absolute URL.
og_image = "/og-image.jpg"

author = "DevOps Engineer"
job_title = "DevOps Engineer"

# Subtitle of the home page hero.
tagline = "Building scalable infrastructure and automating deployments"

# Twitter handle for twitter:creator, e.g. "@me". Empty to omit.
twitter = ""

# Profile URLs, listed as sameAs in the person structured data.
social = []

# Meta keywords, also used as knowsAbout in the person structured data.
keywords = ["DevOps", "Docker", "Kubernetes"]

# ---------------------------------------------------------------------------
# Content
# ---------------------------------------------------------------------------
[content]
# Load content over HTTP from a previous export instead of local files,
# e.g. "https://example.com". Empty reads the content directory.
base_url = ""

# Projects per listing page.
projects_per_page = 12

# ---------------------------------------------------------------------------
# Remote loading (only used when content.base_url is set)
# ---------------------------------------------------------------------------
[fetch]
# Re-attempts after the first failed request.
retries = 3

# Fixed delay before each re-attempt, in milliseconds.
delay_ms = 1000

# Per-request timeout, in seconds.
timeout_secs = 30

# ---------------------------------------------------------------------------
# Contact page
# ---------------------------------------------------------------------------
[contact]
# Shown as a mailto: link next to the form. Empty to omit.
email = ""

# Simulated submission latency, in milliseconds. There is no backend.
submit_delay_ms = 1000

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
surface = "#f4f4f5"       # Cards, inputs
text = "#111111"
text_muted = "#666666"    # Summaries, metadata, footer
border = "#e0e0e0"
link = "#333333"
link_hover = "#000000"
accent = "#0f7b5f"        # Featured badge, active filters, focus ring

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#0a0a0a"
surface = "#161616"
text = "#eeeeee"
text_muted = "#999999"
border = "#333333"
link = "#cccccc"
link_hover = "#ffffff"
accent = "#3ddc97"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    let vars = |scheme: &ColorScheme, indent: &str| -> String {
        scheme
            .entries()
            .iter()
            .map(|(name, value)| format!("{indent}--color-{}: {value};", css_name(name)))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!(
        ":root {{\n{}\n}}\n\n@media (prefers-color-scheme: dark) {{\n    :root {{\n{}\n    }}\n}}",
        vars(&colors.light, "    "),
        vars(&colors.dark, "        "),
    )
}

/// `text_muted` -> `text-muted`, `background` -> `bg`.
fn css_name(field: &str) -> String {
    match field {
        "background" => "bg".to_string(),
        other => other.replace('_', "-"),
    }
}
