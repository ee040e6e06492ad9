//! llms.txt generator.
//!
//! Emits a single plain-text digest of the site for language-model
//! consumers, following the llms.txt convention: a title block, then
//! fixed sections for bio, publications, featured projects, education,
//! awards, experience, contact links, and the site page map.
//!
//! The combined knowledge base is the primary input and must exist;
//! `projects.json` is read independently and its section is simply
//! omitted when the file is missing or unreadable.

use crate::config::SiteConfig;
use crate::types::Project;
use chrono::Local;
use serde_yaml_ng::Value;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("combined document not found at {0}; run `vita combine` first")]
    MissingCombined(std::path::PathBuf),
    #[error("could not parse combined document: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// Social-link ids worth surfacing in a text digest.
const CONTACT_IDS: &[&str] = &["email", "github", "linkedin", "scholar", "twitter"];

/// Generate `<root>/llms.txt` from the combined document and the
/// projects JSON mirror.
pub fn generate(
    combined_file: &Path,
    projects_json: &Path,
    output: &Path,
    config: &SiteConfig,
) -> Result<(), LlmsError> {
    if !combined_file.exists() {
        return Err(LlmsError::MissingCombined(combined_file.to_path_buf()));
    }
    let doc: Value = serde_yaml_ng::from_str(&fs::read_to_string(combined_file)?)?;
    let projects = load_projects(projects_json);
    let today = Local::now().format("%Y-%m-%d").to_string();

    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", config.site.title));
    out.push_str(&format!("> {}\n\n", config.site.tagline));
    out.push_str(&format!("Last updated: {today}\n\n"));

    push_about(&mut out, &doc, config);
    push_publications(&mut out, &doc);
    push_projects(&mut out, &projects);
    push_education(&mut out, &doc);
    push_awards(&mut out, &doc);
    push_experience(&mut out, &doc);
    push_contact(&mut out, &doc);
    push_pages(&mut out, config);

    out.push_str(&format!("---\n\nGenerated on {today}\n"));

    fs::write(output, out)?;
    Ok(())
}

fn push_about(out: &mut String, doc: &Value, config: &SiteConfig) {
    out.push_str("## About\n\n");
    if let Some(bio) = doc
        .get("about")
        .and_then(|a| a.get("bio"))
        .and_then(|b| b.get("main"))
        .and_then(Value::as_str)
    {
        out.push_str(&truncate(bio, 500));
        out.push_str("\n\n");
    }
    out.push_str(&format!("Homepage: {}/\n", config.site.url));
    out.push_str(&format!("CV: {}/cv/\n\n", config.site.url));
}

fn push_publications(out: &mut String, doc: &Value) {
    let Some(pubs) = doc.get("publications").and_then(Value::as_sequence) else {
        return;
    };
    out.push_str("## Research Publications\n\n");

    let mut sorted: Vec<&Value> = pubs.iter().collect();
    sorted.sort_by_key(|p| std::cmp::Reverse(year_of(p)));

    for record in sorted {
        let title = str_of(record, "title").unwrap_or("Untitled");
        let url = str_of(record, "url").filter(|u| !u.is_empty() && *u != "#");
        let mut line = match url {
            Some(u) => format!("- [{title}]({u})"),
            None => format!("- {title}"),
        };
        if let Some(abstract_text) = str_of(record, "abstract") {
            line.push_str(&format!(": {}", truncate(abstract_text, 150)));
        }
        let venue = str_of(record, "venue");
        let year = year_of(record);
        match (venue, year) {
            (Some(v), Some(y)) => line.push_str(&format!(" ({v}, {y})")),
            (Some(v), None) => line.push_str(&format!(" ({v})")),
            (None, Some(y)) => line.push_str(&format!(" ({y})")),
            (None, None) => {}
        }
        out.push_str(&line);
        out.push('\n');
    }
    out.push('\n');
}

fn push_projects(out: &mut String, projects: &[Project]) {
    let featured: Vec<&Project> = projects.iter().filter(|p| p.is_featured()).collect();
    if featured.is_empty() {
        return;
    }
    out.push_str("## Featured Projects\n\n");
    for project in featured {
        let link = project
            .links
            .demo
            .as_deref()
            .or(project.links.github.as_deref())
            .or(project.links.paper.as_deref());
        let mut line = match link {
            Some(l) => format!("- [{}]({l})", project.title),
            None => format!("- {}", project.title),
        };
        if let Some(desc) = project.description.as_deref() {
            line.push_str(&format!(": {}", truncate(desc, 150)));
        }
        if let Some(year) = project.year {
            line.push_str(&format!(" ({year})"));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out.push('\n');
}

fn push_education(out: &mut String, doc: &Value) {
    let Some(entries) = doc.get("education").and_then(Value::as_sequence) else {
        return;
    };
    out.push_str("## Education\n\n");
    for entry in entries {
        let degree = str_of(entry, "degree").unwrap_or("Degree");
        let institution = str_of(entry, "institution").unwrap_or("");
        let mut line = format!("- {degree}");
        if !institution.is_empty() {
            line.push_str(&format!(", {institution}"));
        }
        if let Some(years) = str_of(entry, "years").or_else(|| str_of(entry, "year")) {
            line.push_str(&format!(" ({years})"));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out.push('\n');
}

fn push_awards(out: &mut String, doc: &Value) {
    let Some(entries) = doc.get("awards").and_then(Value::as_sequence) else {
        return;
    };
    out.push_str("## Selected Awards\n\n");
    for entry in entries.iter().take(10) {
        let name = str_of(entry, "name")
            .or_else(|| str_of(entry, "title"))
            .unwrap_or("Award");
        let mut line = format!("- {name}");
        if let Some(org) = str_of(entry, "organization").or_else(|| str_of(entry, "issuer")) {
            line.push_str(&format!(", {org}"));
        }
        if let Some(year) = year_of(entry).map(|y| y.to_string()).or_else(|| {
            str_of(entry, "date").map(str::to_string)
        }) {
            line.push_str(&format!(" ({year})"));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out.push('\n');
}

fn push_experience(out: &mut String, doc: &Value) {
    let Some(entries) = doc.get("experiences").and_then(Value::as_sequence) else {
        return;
    };
    out.push_str("## Experience\n\n");
    for entry in entries {
        let position = str_of(entry, "position").unwrap_or("Position");
        let mut line = format!("- {position}");
        if let Some(institution) = str_of(entry, "institution") {
            line.push_str(&format!(" at {institution}"));
        }
        if let Some(years) = str_of(entry, "year").or_else(|| str_of(entry, "years")) {
            line.push_str(&format!(" ({years})"));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out.push('\n');
}

fn push_contact(out: &mut String, doc: &Value) {
    let Some(links) = doc.get("social_links").and_then(Value::as_sequence) else {
        return;
    };
    out.push_str("## Contact & Links\n\n");
    for link in links {
        let Some(id) = str_of(link, "id") else { continue };
        if !CONTACT_IDS.contains(&id) {
            continue;
        }
        let Some(url) = str_of(link, "url") else { continue };
        let label = str_of(link, "description").unwrap_or(id);
        out.push_str(&format!("- {label}: {url}\n"));
    }
    out.push('\n');
}

fn push_pages(out: &mut String, config: &SiteConfig) {
    let base = &config.site.url;
    out.push_str("## Site Pages\n\n");
    out.push_str(&format!("- Homepage: {base}/\n"));
    out.push_str(&format!("- Research: {base}/pages/research.html\n"));
    out.push_str(&format!("- Projects: {base}/pages/projects.html\n"));
    out.push_str(&format!("- News: {base}/pages/news.html\n"));
    out.push_str(&format!("- CV: {base}/cv/\n\n"));
}

/// Projects are optional input; any failure just drops the section.
fn load_projects(path: &Path) -> Vec<Project> {
    fs::read_to_string(path)
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok())
        .unwrap_or_default()
}

fn str_of<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// Year as a number, tolerating string-typed years in the YAML.
fn year_of(value: &Value) -> Option<i64> {
    match value.get("year") {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Strip HTML tags, collapse whitespace runs, and bound the result to
/// `max` characters (an overlong text is cut to `max - 3` plus `...`).
fn truncate(text: &str, max: usize) -> String {
    let mut plain = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => plain.push(c),
            _ => {}
        }
    }
    let collapsed = plain.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max {
        return collapsed;
    }
    let cut: String = collapsed.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_combined(dir: &Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("combined-data.yaml");
        fs::write(&path, body).unwrap();
        path
    }

    fn run(dir: &TempDir, combined: &Path) -> String {
        let output = dir.path().join("llms.txt");
        generate(
            combined,
            &dir.path().join("projects.json"),
            &output,
            &SiteConfig::default(),
        )
        .unwrap();
        fs::read_to_string(output).unwrap()
    }

    #[test]
    fn missing_combined_is_fatal_with_guidance() {
        let tmp = TempDir::new().unwrap();
        let err = generate(
            &tmp.path().join("nope.yaml"),
            &tmp.path().join("projects.json"),
            &tmp.path().join("llms.txt"),
            &SiteConfig::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("vita combine"));
    }

    #[test]
    fn truncate_strips_tags_and_bounds_length() {
        assert_eq!(truncate("<em>hi</em> there", 150), "hi there");
        assert_eq!(truncate("a  \n  b", 150), "a b");
        let long = "x".repeat(600);
        let cut = truncate(&long, 200);
        assert_eq!(cut.chars().count(), 200);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn publications_sorted_year_descending() {
        let tmp = TempDir::new().unwrap();
        let combined = write_combined(
            tmp.path(),
            "publications:\n\
             - title: Old\n  year: 2019\n  url: https://a\n\
             - title: New\n  year: 2024\n  url: https://b\n",
        );
        let text = run(&tmp, &combined);
        let new_pos = text.find("[New]").unwrap();
        let old_pos = text.find("[Old]").unwrap();
        assert!(new_pos < old_pos);
    }

    #[test]
    fn placeholder_url_gets_no_link_wrapper() {
        let tmp = TempDir::new().unwrap();
        let combined = write_combined(
            tmp.path(),
            "publications:\n- title: Draft\n  year: 2024\n  url: \"#\"\n",
        );
        let text = run(&tmp, &combined);
        assert!(text.contains("- Draft (2024)"));
        assert!(!text.contains("[Draft]"));
    }

    #[test]
    fn featured_projects_prefer_demo_link() {
        let tmp = TempDir::new().unwrap();
        let combined = write_combined(tmp.path(), "about: {}\n");
        fs::write(
            tmp.path().join("projects.json"),
            r#"[
              {"id":"a","title":"A","featured":true,
               "links":{"demo":"https://demo","github":"https://gh"}},
              {"id":"b","title":"B","cv_featured":true,
               "links":{"github":"https://gh-b"}},
              {"id":"c","title":"C"}
            ]"#,
        )
        .unwrap();
        let text = run(&tmp, &combined);
        assert!(text.contains("[A](https://demo)"));
        assert!(text.contains("[B](https://gh-b)"));
        assert!(!text.contains("- C"));
    }

    #[test]
    fn missing_projects_json_omits_section() {
        let tmp = TempDir::new().unwrap();
        let combined = write_combined(tmp.path(), "about: {}\n");
        let text = run(&tmp, &combined);
        assert!(!text.contains("## Featured Projects"));
        // Fixed scaffolding is still present.
        assert!(text.contains("## About"));
        assert!(text.contains("## Site Pages"));
        assert!(text.contains("Generated on"));
    }

    #[test]
    fn awards_capped_at_ten_with_field_fallbacks() {
        let tmp = TempDir::new().unwrap();
        let mut yaml = String::from("awards:\n");
        for i in 0..12 {
            yaml.push_str(&format!("- title: Award {i}\n  issuer: Org\n  year: 2020\n"));
        }
        let combined = write_combined(tmp.path(), &yaml);
        let text = run(&tmp, &combined);
        assert!(text.contains("- Award 0, Org (2020)"));
        assert!(text.contains("- Award 9, Org (2020)"));
        assert!(!text.contains("- Award 10"));
    }

    #[test]
    fn contact_links_filtered_to_allow_list() {
        let tmp = TempDir::new().unwrap();
        let combined = write_combined(
            tmp.path(),
            "social_links:\n\
             - id: github\n  url: https://github.com/ada\n  description: GitHub\n\
             - id: mastodon\n  url: https://m.social/@ada\n\
             - id: email\n  url: mailto:ada@example.com\n",
        );
        let text = run(&tmp, &combined);
        assert!(text.contains("- GitHub: https://github.com/ada"));
        assert!(text.contains("- email: mailto:ada@example.com"));
        assert!(!text.contains("mastodon"));
    }
}
