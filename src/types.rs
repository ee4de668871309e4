//! Content types shared by the loader, the query utilities and the renderer.
//!
//! Both entity types are immutable, file-backed records. They are authored as
//! JSON outside the build and only ever read here. Field names are camelCase
//! on the wire; optional fields that are absent stay absent when a record is
//! serialized back out.

use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;
use std::path::{Component, Path};

/// A portfolio entry.
///
/// `slug` is the routing key (`/projects/{slug}/`), `id` the storage and
/// display key. Nothing ties the two together beyond both being present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub summary: String,
    /// Order-preserving, but filtering treats the list as a set.
    #[serde(default)]
    pub tags: Vec<String>,
    pub featured: bool,
    pub slug: String,
    /// Always `https://` once validated.
    pub external_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Markdown body for the detail page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

/// A skill or technology entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeEntry {
    pub id: String,
    pub title: String,
    pub summary: String,
    /// Groups entries on the listing page.
    pub category: String,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<ExperienceLevel>,
    /// Kept as the JSON number it was authored as, so `5` stays `5`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_of_experience: Option<Number>,
    /// Project slugs. A weak reference resolved at render time; see
    /// [`RelatedProject`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_projects: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certifications: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_resources: Option<Vec<LearningResource>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl ExperienceLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningResource {
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Documentation,
    Tutorial,
    Course,
    Certification,
    Blog,
}

impl ResourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Documentation => "documentation",
            ResourceType::Tutorial => "tutorial",
            ResourceType::Course => "course",
            ResourceType::Certification => "certification",
            ResourceType::Blog => "blog",
        }
    }
}

/// A `relatedProjects` slug after resolution against the project collection.
///
/// Missing targets degrade to a stub whose title is the slug itself, so a
/// dangling reference still renders as a link instead of disappearing.
#[derive(Debug, Clone, PartialEq)]
pub enum RelatedProject {
    Resolved(Project),
    Missing { slug: String },
}

impl RelatedProject {
    pub fn slug(&self) -> &str {
        match self {
            RelatedProject::Resolved(project) => &project.slug,
            RelatedProject::Missing { slug } => slug,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            RelatedProject::Resolved(project) => &project.title,
            RelatedProject::Missing { slug } => slug,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, RelatedProject::Resolved(_))
    }
}

/// The two content collections, each a directory under the content root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Projects,
    Knowledge,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Projects, Collection::Knowledge];

    /// Directory name under the content root and URL segment under `/content/`.
    pub fn dir_name(self) -> &'static str {
        match self {
            Collection::Projects => "projects",
            Collection::Knowledge => "knowledge",
        }
    }

    /// The field per-entity documents are keyed by.
    pub fn key_field(self) -> &'static str {
        match self {
            Collection::Projects => "slug",
            Collection::Knowledge => "id",
        }
    }
}

/// Whether a slug or id can name a file or directory on its own: exactly
/// one normal path component, no separators, no `.` or `..`.
///
/// Keys come from content documents, possibly fetched over the network, and
/// end up in paths like `knowledge/{id}/index.html`.
pub fn is_safe_key(key: &str) -> bool {
    if key.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(key).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) => name == key,
        _ => false,
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn project_uses_camel_case_on_the_wire() {
        let raw = json!({
            "id": "p1",
            "title": "Pipeline",
            "summary": "CI pipeline",
            "tags": ["CI"],
            "featured": true,
            "slug": "pipeline",
            "externalUrl": "https://gitlab.com/me/pipeline",
            "ogImage": "/og/pipeline.png"
        });
        let project: Project = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(project.external_url, "https://gitlab.com/me/pipeline");
        assert_eq!(project.og_image.as_deref(), Some("/og/pipeline.png"));
        assert_eq!(serde_json::to_value(&project).unwrap(), raw);
    }

    #[test]
    fn project_tags_default_to_empty() {
        let project: Project = serde_json::from_value(json!({
            "id": "p1",
            "title": "T",
            "summary": "S",
            "featured": false,
            "slug": "p1",
            "externalUrl": "https://example.com"
        }))
        .unwrap();
        assert!(project.tags.is_empty());
    }

    #[test]
    fn knowledge_entry_optional_fields() {
        let entry: KnowledgeEntry = serde_json::from_value(json!({
            "id": "docker",
            "title": "Docker",
            "summary": "Containers",
            "category": "Containers",
            "tags": ["docker"],
            "experienceLevel": "advanced",
            "yearsOfExperience": 5,
            "relatedProjects": ["pipeline"],
            "learningResources": [
                {"title": "Docs", "url": "https://docs.docker.com", "type": "documentation"}
            ]
        }))
        .unwrap();
        assert_eq!(entry.experience_level, Some(ExperienceLevel::Advanced));
        assert_eq!(entry.years_of_experience, Some(Number::from(5)));
        assert_eq!(
            entry.learning_resources.unwrap()[0].kind,
            ResourceType::Documentation
        );
    }

    #[test]
    fn unknown_experience_level_is_rejected() {
        let result: Result<KnowledgeEntry, _> = serde_json::from_value(json!({
            "id": "x",
            "title": "X",
            "summary": "X",
            "category": "C",
            "tags": [],
            "experienceLevel": "guru"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn missing_related_project_stub_uses_slug_as_title() {
        let stub = RelatedProject::Missing {
            slug: "gone".to_string(),
        };
        assert_eq!(stub.title(), "gone");
        assert_eq!(stub.slug(), "gone");
        assert!(!stub.is_resolved());
    }

    #[test]
    fn collection_directory_names() {
        assert_eq!(Collection::Projects.dir_name(), "projects");
        assert_eq!(Collection::Knowledge.to_string(), "knowledge");
        assert_eq!(Collection::Projects.key_field(), "slug");
        assert_eq!(Collection::Knowledge.key_field(), "id");
    }

    #[test]
    fn years_of_experience_keeps_its_number_form() {
        for years in [json!(5), json!(4.5)] {
            let raw = json!({
                "id": "x",
                "title": "X",
                "summary": "X",
                "category": "C",
                "tags": [],
                "yearsOfExperience": years
            });
            let entry: KnowledgeEntry = serde_json::from_value(raw.clone()).unwrap();
            assert_eq!(serde_json::to_value(&entry).unwrap(), raw);
        }
    }

    #[test]
    fn safe_keys_are_single_path_components() {
        for key in ["docker", "ci-pipeline", "k8s", "v1.2"] {
            assert!(is_safe_key(key), "{key}");
        }
        for key in ["", ".", "..", "../../escaped", "a/b", "docker/", "/etc", "a\\b"] {
            assert!(!is_safe_key(key), "{key}");
        }
    }
}
