//! Combined knowledge-base builder.
//!
//! Assembles the individual category files into one aggregate YAML
//! document — a single portable file holding everything the site knows,
//! suitable for sharing with an AI assistant or keeping as a backup.
//!
//! The section list is fixed and ordered; the output document preserves
//! that order (insertion order, never sorted). Sections whose file is
//! missing, fails to parse, or holds an empty sequence are skipped and
//! reported. A `dissertation/` subdirectory, when present, is merged
//! under the reserved `dissertation` key with one sub-key per file.
//!
//! The document is regenerated wholesale on every run; only the embedded
//! timestamps differ between runs on unchanged inputs.

use crate::config::SiteConfig;
use crate::convert::is_yaml;
use serde_yaml_ng::{Mapping, Value};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CombineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// One section of the combined document: output key and source file.
struct Section {
    key: &'static str,
    file: &'static str,
}

/// Fixed, ordered section list. Output key order equals this order.
const SECTIONS: &[Section] = &[
    Section { key: "about", file: "about.yaml" },
    Section { key: "education", file: "education.yaml" },
    Section { key: "experiences", file: "experiences.yaml" },
    Section { key: "publications", file: "publications.yaml" },
    Section { key: "awards", file: "awards.yaml" },
    Section { key: "skills", file: "skills.yaml" },
    Section { key: "memberships", file: "memberships.yaml" },
    Section { key: "references", file: "references.yaml" },
    Section { key: "people", file: "people.yaml" },
    Section { key: "press", file: "press.yaml" },
    Section { key: "organizer", file: "organizer.yaml" },
    Section { key: "reviewer", file: "reviewer.yaml" },
    Section { key: "mentoring", file: "mentoring.yaml" },
    Section { key: "institutional", file: "institutional.yaml" },
    Section { key: "social_links", file: "social-links.yaml" },
    Section { key: "news", file: "news-data.yaml" },
    Section { key: "talks", file: "talks.yaml" },
    Section { key: "teaching", file: "teaching.yaml" },
    Section { key: "funding", file: "funding.yaml" },
    Section { key: "articles", file: "articles.yaml" },
    Section { key: "designs", file: "designs.yaml" },
    Section { key: "paper_pages", file: "paper-pages.yaml" },
    Section { key: "parametric_articles", file: "parametric-articles.yaml" },
    Section { key: "pc", file: "pc.yaml" },
];

/// Subdirectory merged under a reserved key, one sub-key per file.
const DISSERTATION_DIR: &str = "dissertation";

/// Counts reported after a combine run.
#[derive(Debug, Default)]
pub struct CombineSummary {
    pub loaded: usize,
    pub skipped: usize,
}

/// Build the combined document from `yaml_dir` and write it to `output`.
pub fn combine(
    yaml_dir: &Path,
    output: &Path,
    config: &SiteConfig,
) -> Result<CombineSummary, CombineError> {
    let generated_at = chrono::Utc::now().to_rfc3339();
    let mut summary = CombineSummary::default();
    let mut document = Mapping::new();

    document.insert(
        "_metadata".into(),
        Value::Mapping(metadata_block(config, &generated_at)),
    );

    for section in SECTIONS {
        let path = yaml_dir.join(section.file);
        if !path.exists() {
            println!("  - {} (not found)", section.file);
            summary.skipped += 1;
            continue;
        }
        match load_yaml(&path) {
            Some(Value::Null) | None => {
                println!("  - {} (empty or unreadable, skipped)", section.file);
                summary.skipped += 1;
            }
            Some(Value::Sequence(seq)) if seq.is_empty() => {
                println!("  - {} (empty sequence, skipped)", section.file);
                summary.skipped += 1;
            }
            Some(data) => {
                document.insert(section.key.into(), data);
                println!("  + {} -> {}", section.file, section.key);
                summary.loaded += 1;
            }
        }
    }

    // Optional dissertation subdirectory, merged under one reserved key.
    let dissertation_dir = yaml_dir.join(DISSERTATION_DIR);
    if dissertation_dir.is_dir() {
        let mut dissertation = Mapping::new();
        let mut files: Vec<_> = fs::read_dir(&dissertation_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_yaml(p))
            .collect();
        files.sort();

        for file in files {
            if let Some(data) = load_yaml(&file) {
                let key = file
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default();
                println!("  + {DISSERTATION_DIR}/{key} -> {DISSERTATION_DIR}.{key}");
                dissertation.insert(Value::String(key), data);
                summary.loaded += 1;
            }
        }
        if !dissertation.is_empty() {
            document.insert(DISSERTATION_DIR.into(), Value::Mapping(dissertation));
        }
    }

    let body = serde_yaml_ng::to_string(&Value::Mapping(document))?;
    let header = header_comment(config, &generated_at);

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, format!("{header}{body}"))?;

    Ok(summary)
}

/// Load a YAML file; parse errors warn and return None so one bad
/// category never aborts the whole combine.
fn load_yaml(path: &Path) -> Option<Value> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(err) => {
            eprintln!("  warning: could not read {}: {err}", path.display());
            return None;
        }
    };
    match serde_yaml_ng::from_str(&content) {
        Ok(value) => Some(value),
        Err(err) => {
            eprintln!("  warning: could not parse {}: {err}", path.display());
            None
        }
    }
}

fn metadata_block(config: &SiteConfig, generated_at: &str) -> Mapping {
    let mut meta = Mapping::new();
    meta.insert(
        "title".into(),
        format!("{} - Combined Knowledge Base", config.site.author).into(),
    );
    meta.insert(
        "description".into(),
        "Auto-generated file combining all data from individual YAML files".into(),
    );
    meta.insert("generated_at".into(), generated_at.into());
    meta.insert("source".into(), config.site.url.clone().into());
    meta.insert(
        "note".into(),
        "This file is auto-generated. Edit the individual YAML files instead.".into(),
    );
    meta
}

fn header_comment(config: &SiteConfig, generated_at: &str) -> String {
    let bar = "# ".to_string() + &"=".repeat(75) + "\n";
    format!(
        "{bar}# {} - Combined Knowledge Base\n{bar}#\n\
         # This file is AUTO-GENERATED from the individual YAML category files.\n\
         # DO NOT edit this file directly - edit the source files instead.\n\
         #\n\
         # Generated: {generated_at}\n\
         # Website: {}\n\
         #\n{bar}\n",
        config.site.author, config.site.url,
    )
}
