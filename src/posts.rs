//! CV post generation.
//!
//! Derives one dated, front-matter-prefixed markdown post per content
//! record, for the downstream site generator to turn into HTML and a
//! syndication feed:
//!
//! ```text
//! data/yaml/publications.yaml → cv/_posts/papers/2024-06-01-my-paper.md
//! data/yaml/news-data.yaml    → cv/_posts/news/2025-10-29-award.md
//! data/yaml/projects.yaml     → cv/_posts/projects/2023-01-01-tool.md
//! ```
//!
//! Destination directories are cleared of previously generated posts on
//! every run — output is a pure function of the YAML inputs, never an
//! incremental merge. Each category has an explicit field schema with a
//! defined precedence order for alternate field names (`demo` before
//! `preview`, `featured` before `cv_featured`), so the header block is
//! deterministic.
//!
//! Records that resolve no publish date are skipped with a warning and
//! produce no file; one bad record never blocks the batch.

use crate::dates::{self, parse_date, publication_date};
use crate::frontmatter;
use serde_yaml_ng::{Mapping, Value};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PostsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse {0}: {1}")]
    Yaml(String, serde_yaml_ng::Error),
}

/// Per-category counts reported after a run.
#[derive(Debug, Default)]
pub struct PostsSummary {
    pub publications: usize,
    pub news: usize,
    pub projects: usize,
}

impl PostsSummary {
    pub fn total(&self) -> usize {
        self.publications + self.news + self.projects
    }
}

/// Generate all three post categories.
pub fn generate_all(yaml_dir: &Path, posts_dir: &Path) -> Result<PostsSummary, PostsError> {
    println!("Publications:");
    let publications =
        generate_publications(&yaml_dir.join("publications.yaml"), &posts_dir.join("papers"))?;
    println!("  generated {publications} publication posts");

    println!("News:");
    let news = generate_news(&yaml_dir.join("news-data.yaml"), &posts_dir.join("news"))?;
    println!("  generated {news} news posts");

    println!("Projects:");
    let projects =
        generate_projects(&yaml_dir.join("projects.yaml"), &posts_dir.join("projects"))?;
    println!("  generated {projects} project posts");

    Ok(PostsSummary {
        publications,
        news,
        projects,
    })
}

/// Publications: date estimated from `year` + `type`.
pub fn generate_publications(yaml_path: &Path, out_dir: &Path) -> Result<usize, PostsError> {
    let Some(records) = load_records(yaml_path)? else {
        return Ok(0);
    };
    clear_generated(out_dir)?;

    let mut count = 0;
    for record in &records {
        let id = record_id(record);
        let Some(year) = year_of(record) else {
            eprintln!("  warning: skipping {id}: no valid date");
            continue;
        };
        let pub_type = str_field(record, "type").unwrap_or("paper");
        let date = publication_date(year, pub_type);

        let mut fields = Mapping::new();
        put(&mut fields, "layout", Some(Value::from("paper")));
        put(&mut fields, "id", field(record, "id"));
        put(&mut fields, "categories", Some(Value::from("papers")));
        put(&mut fields, "permalink", Some(Value::from(format!("papers/{id}"))));
        put(&mut fields, "title", field(record, "title"));
        put(&mut fields, "authors", field(record, "authors"));
        put(&mut fields, "venue", field(record, "venue"));
        put(&mut fields, "venue-shorthand", field(record, "venue-shorthand"));
        put(&mut fields, "year", field(record, "year"));
        put(&mut fields, "url", Some(Value::from(format!("/papers/{id}"))));
        put(&mut fields, "pdf", field(record, "pdf"));
        put(&mut fields, "link", field(record, "url"));
        put(&mut fields, "code", field(record, "code"));
        put(&mut fields, "demo", first_of(record, &["demo", "preview"]));
        put(&mut fields, "blog", field(record, "blog"));
        put(
            &mut fields,
            "selected",
            Some(field(record, "featured").unwrap_or(Value::Bool(false))),
        );
        put(&mut fields, "type", Some(Value::from(pub_type)));
        put(&mut fields, "figure", field(record, "image"));
        put(&mut fields, "award", field(record, "award"));
        put(&mut fields, "coming-soon", Some(Value::Bool(false)));
        put(&mut fields, "bibtex", field(record, "bibtex"));

        let body = str_field(record, "abstract").unwrap_or("");
        write_post(out_dir, &date, &id, &fields, body)?;
        count += 1;
    }
    Ok(count)
}

/// News: date parsed from the free-text `date` field; hidden items skipped.
pub fn generate_news(yaml_path: &Path, out_dir: &Path) -> Result<usize, PostsError> {
    let Some(records) = load_records(yaml_path)? else {
        return Ok(0);
    };
    clear_generated(out_dir)?;

    let mut count = 0;
    for record in &records {
        if is_truthy(field(record, "hidden").as_ref()) {
            continue;
        }
        let id = record_id(record);
        let Some(date) = parse_date(str_field(record, "date"), None) else {
            eprintln!("  warning: skipping {id}: no valid date");
            continue;
        };

        let mut fields = Mapping::new();
        put(&mut fields, "layout", Some(Value::from("post")));
        put(&mut fields, "id", field(record, "id"));
        put(&mut fields, "categories", Some(Value::from("news")));
        put(&mut fields, "permalink", Some(Value::from(format!("news/{id}"))));
        put(&mut fields, "title", field(record, "title"));
        put(&mut fields, "date", Some(Value::from(date.clone())));
        put(&mut fields, "category", field(record, "category"));
        put(
            &mut fields,
            "featured",
            Some(field(record, "featured").unwrap_or(Value::Bool(false))),
        );
        put(&mut fields, "image", field(record, "image"));
        put(&mut fields, "gallery", field(record, "gallery"));
        put(&mut fields, "links", field(record, "links"));

        let mut body = str_field(record, "description").unwrap_or("").to_string();
        if let Some(second) = str_field(record, "secondParagraph") {
            body.push_str("\n\n");
            body.push_str(second);
        }

        // News ids often already embed their date; drop the redundant
        // prefix so the filename does not repeat it.
        let slug = strip_date_prefix(&id);
        write_post(out_dir, &date, slug, &fields, &body)?;
        count += 1;
    }
    Ok(count)
}

/// Projects: date is `YYYY-01-01` from `year`.
pub fn generate_projects(yaml_path: &Path, out_dir: &Path) -> Result<usize, PostsError> {
    let Some(records) = load_records(yaml_path)? else {
        return Ok(0);
    };
    clear_generated(out_dir)?;

    let mut count = 0;
    for record in &records {
        let id = record_id(record);
        let Some(date) = parse_date(None, year_of(record)) else {
            eprintln!("  warning: skipping {id}: no valid date");
            continue;
        };

        let mut fields = Mapping::new();
        put(&mut fields, "layout", Some(Value::from("post")));
        put(&mut fields, "id", field(record, "id"));
        put(&mut fields, "categories", Some(Value::from("projects")));
        put(
            &mut fields,
            "permalink",
            Some(Value::from(format!("projects/{id}"))),
        );
        put(&mut fields, "title", field(record, "title"));
        put(&mut fields, "date", Some(Value::from(date.clone())));
        put(&mut fields, "type", field(record, "type"));
        put(&mut fields, "year", field(record, "year"));
        put(&mut fields, "technologies", field(record, "technologies"));
        put(&mut fields, "image", field(record, "image"));
        put(&mut fields, "image-alt", field(record, "image-alt"));
        put(&mut fields, "links", field(record, "links"));
        put(&mut fields, "collaborators", field(record, "collaborators"));
        put(&mut fields, "award", field(record, "award"));
        put(
            &mut fields,
            "featured",
            Some(
                first_of(record, &["featured", "cv_featured"]).unwrap_or(Value::Bool(false)),
            ),
        );
        put(&mut fields, "hackathon_name", field(record, "hackathon_name"));
        put(&mut fields, "class_name", field(record, "class_name"));

        let body = str_field(record, "description").unwrap_or("");
        write_post(out_dir, &date, &id, &fields, body)?;
        count += 1;
    }
    Ok(count)
}

// ============================================================================
// Record field access
// ============================================================================

fn field(record: &Value, key: &str) -> Option<Value> {
    record.get(key).filter(|v| !v.is_null()).cloned()
}

/// First non-null field from an ordered precedence list.
fn first_of(record: &Value, keys: &[&str]) -> Option<Value> {
    keys.iter().find_map(|k| field(record, k))
}

fn str_field<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    record.get(key).and_then(|v| v.as_str())
}

fn record_id(record: &Value) -> String {
    str_field(record, "id").unwrap_or("(no id)").to_string()
}

/// Year as an integer, tolerating both `2024` and `"2024"`.
fn year_of(record: &Value) -> Option<i64> {
    match record.get("year") {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        _ => false,
    }
}

fn put(fields: &mut Mapping, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        fields.insert(Value::from(key), value);
    }
}

/// Strip a redundant `YYYY-MM-DD-` prefix from an id.
fn strip_date_prefix(id: &str) -> &str {
    if id.len() > 11 && id.as_bytes()[10] == b'-' && dates::is_ymd(&id[..10]) {
        &id[11..]
    } else {
        id
    }
}

// ============================================================================
// File handling
// ============================================================================

/// Load a category file as a list of records. `None` means the file is
/// absent (logged); a parse failure is a real error for this generator
/// since the whole category would otherwise silently vanish.
fn load_records(yaml_path: &Path) -> Result<Option<Vec<Value>>, PostsError> {
    if !yaml_path.exists() {
        println!("  warning: {} not found, skipping", yaml_path.display());
        return Ok(None);
    }
    let content = fs::read_to_string(yaml_path)?;
    let value: Value = serde_yaml_ng::from_str(&content)
        .map_err(|e| PostsError::Yaml(yaml_path.display().to_string(), e))?;
    Ok(Some(match value {
        Value::Sequence(seq) => seq,
        Value::Null => Vec::new(),
        other => vec![other],
    }))
}

/// Remove previously generated posts, keeping the directory itself.
fn clear_generated(dir: &Path) -> Result<(), PostsError> {
    fs::create_dir_all(dir)?;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().map(|e| e == "md").unwrap_or(false) {
            fs::remove_file(path)?;
        }
    }
    Ok(())
}

fn write_post(
    out_dir: &Path,
    date: &str,
    slug: &str,
    fields: &Mapping,
    body: &str,
) -> Result<(), PostsError> {
    let markdown = format!("{}\n\n{body}\n", frontmatter::render(fields));
    fs::write(out_dir.join(format!("{date}-{slug}.md")), markdown)?;
    Ok(())
}
