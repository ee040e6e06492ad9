//! Typed views of the category records.
//!
//! Most generators treat records as untyped YAML mappings (the categories
//! are schemaless by design), but the project helper and the fragment
//! renderers work against a known shape. These structs deserialize from
//! both the YAML sources and the generated JSON mirrors; unknown fields
//! are ignored, missing ones default.

use serde::Deserialize;

/// A project record from `projects.yaml` / `projects.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "type")]
    pub project_type: String,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, rename = "image-alt")]
    pub image_alt: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub links: ProjectLinks,
    #[serde(default)]
    pub award: Option<Award>,
    #[serde(default)]
    pub featured: bool,
    /// Absent means shown on the CV; only an explicit `false` hides it.
    #[serde(default)]
    pub cv_featured: Option<bool>,
    #[serde(default)]
    pub hackathon_name: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
}

impl Project {
    /// CV visibility: `cv_featured` defaults to true when absent.
    pub fn is_cv_featured(&self) -> bool {
        self.cv_featured != Some(false)
    }

    /// Home-page prominence: either flag marks the record featured.
    pub fn is_featured(&self) -> bool {
        self.featured || self.cv_featured == Some(true)
    }

    /// Display label for the record's category.
    pub fn category_label(&self) -> &str {
        match self.project_type.as_str() {
            "hackathon" => "Hackathon",
            "class" => "Coursework",
            "personal" => "Personal",
            "research" | "work" => "Professional",
            other => other,
        }
    }

    /// Filter bucket: research and work collapse into one category.
    pub fn filter_category(&self) -> &str {
        match self.project_type.as_str() {
            "research" | "work" => "professional",
            other => other,
        }
    }

    /// Context line shown under the title, when the type carries one.
    pub fn context_line(&self) -> Option<&str> {
        match self.project_type.as_str() {
            "hackathon" => self.hackathon_name.as_deref(),
            "class" => self.class_name.as_deref(),
            _ => None,
        }
    }
}

/// External links on a project card, all optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectLinks {
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub devpost: Option<String>,
    #[serde(default)]
    pub video: Option<String>,
    #[serde(default)]
    pub news: Option<String>,
    #[serde(default)]
    pub demo: Option<String>,
    #[serde(default)]
    pub paper: Option<String>,
}

/// An award field is either a name string or a bare boolean flag.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Award {
    Text(String),
    Flag(bool),
}

impl Award {
    /// Badge text, or `None` when the field says "no award".
    pub fn label(&self) -> Option<&str> {
        match self {
            Award::Text(s) if !s.is_empty() => Some(s),
            Award::Flag(true) => Some("Award Winner"),
            _ => None,
        }
    }
}

/// A publication record from `publications.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Paper {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub pdf: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub award: Option<Award>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub bibtex: Option<String>,
}

impl Paper {
    /// A link usable in rendered output; `"#"` placeholders don't count.
    pub fn usable_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty() && *u != "#")
    }
}
