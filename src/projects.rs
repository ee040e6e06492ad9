//! Project record helpers: stats, listings, validation, maintenance.
//!
//! All commands work off `data/yaml/projects.yaml`. The read-only ones
//! use the typed [`Project`] view; `validate` and `toggle-cv` work on
//! raw YAML values so they can report on (or rewrite) records the typed
//! view would normalize away.

use crate::convert::convert_file;
use crate::types::Project;
use serde_yaml_ng::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse {0}: {1}")]
    Yaml(String, serde_yaml_ng::Error),
    #[error("conversion failed: {0}")]
    Convert(String),
    #[error("no project with id `{0}`")]
    UnknownId(String),
}

/// Load the typed project list.
pub fn load_projects(path: &Path) -> Result<Vec<Project>, ProjectsError> {
    let content = fs::read_to_string(path)?;
    serde_yaml_ng::from_str(&content)
        .map_err(|err| ProjectsError::Yaml(path.display().to_string(), err))
}

/// Aggregate counts for the `stats` listing.
#[derive(Debug, Default)]
pub struct Stats {
    pub total: usize,
    pub cv_featured: usize,
    pub with_award: usize,
    pub by_type: Vec<(String, usize)>,
    pub by_year: Vec<(i64, usize)>,
}

pub fn collect_stats(projects: &[Project]) -> Stats {
    let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_year: BTreeMap<i64, usize> = BTreeMap::new();
    let mut stats = Stats {
        total: projects.len(),
        ..Stats::default()
    };
    for project in projects {
        if project.is_cv_featured() {
            stats.cv_featured += 1;
        }
        if project.award.as_ref().is_some_and(|a| a.label().is_some()) {
            stats.with_award += 1;
        }
        *by_type.entry(project.project_type.clone()).or_default() += 1;
        if let Some(year) = project.year {
            *by_year.entry(year).or_default() += 1;
        }
    }
    stats.by_type = by_type.into_iter().collect();
    stats.by_year = by_year.into_iter().rev().collect(); // years descending
    stats
}

/// One listing line: title, type, year, award and CV markers.
pub fn describe(project: &Project) -> String {
    let mut line = format!("- {}", project.title);
    let year = project
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "?".to_string());
    line.push_str(&format!(" ({}, {year})", project.project_type));
    if let Some(award) = project.award.as_ref().and_then(|a| a.label()) {
        line.push_str(&format!(" [award: {award}]"));
    }
    if !project.is_cv_featured() {
        line.push_str(" [hidden from CV]");
    }
    line
}

/// Fields every record must carry.
const REQUIRED_FIELDS: &[&str] = &["id", "title", "type", "year", "image", "technologies"];

/// Check every record and return all violations; never stops at the
/// first problem.
pub fn validate_file(path: &Path) -> Result<Vec<String>, ProjectsError> {
    let records = load_raw(path)?;
    let mut violations = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let Some(map) = record.as_mapping() else {
            violations.push(format!("record {}: not a mapping", index + 1));
            continue;
        };
        let label = map
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("record {}", index + 1));

        for &field in REQUIRED_FIELDS {
            match map.get(field) {
                None | Some(Value::Null) => {
                    violations.push(format!("{label}: missing required field `{field}`"));
                }
                Some(value) if field == "technologies" && !value.is_sequence() => {
                    violations.push(format!("{label}: `technologies` must be a list"));
                }
                _ => {}
            }
        }

        let project_type = map.get("type").and_then(Value::as_str).unwrap_or("");
        let context = match project_type {
            "hackathon" => Some("hackathon_name"),
            "class" => Some("class_name"),
            _ => None,
        };
        if let Some(field) = context {
            if matches!(map.get(field), None | Some(Value::Null)) {
                violations.push(format!(
                    "{label}: `{project_type}` projects require `{field}`"
                ));
            }
        }
    }
    Ok(violations)
}

/// Regenerate the JSON mirror from the YAML source.
pub fn update_json(yaml_path: &Path, json_path: &Path) -> Result<(), ProjectsError> {
    convert_file(yaml_path, json_path).map_err(|err| ProjectsError::Convert(err.to_string()))
}

/// Flip a record's CV visibility and rewrite the file. An absent
/// `cv_featured` counts as true, so the first toggle writes `false`.
/// Returns the new state. Comments in the file do not survive the
/// rewrite; field order does.
pub fn toggle_cv(path: &Path, id: &str) -> Result<bool, ProjectsError> {
    let mut records = load_raw(path)?;

    let mut new_state = None;
    for record in &mut records {
        let Some(map) = record.as_mapping_mut() else {
            continue;
        };
        if map.get("id").and_then(Value::as_str) != Some(id) {
            continue;
        }
        let current = map
            .get("cv_featured")
            .and_then(Value::as_bool)
            .unwrap_or(true);
        map.insert("cv_featured".into(), Value::Bool(!current));
        new_state = Some(!current);
        break;
    }

    let Some(state) = new_state else {
        return Err(ProjectsError::UnknownId(id.to_string()));
    };
    let body = serde_yaml_ng::to_string(&Value::Sequence(records))
        .map_err(|err| ProjectsError::Convert(err.to_string()))?;
    fs::write(path, body)?;
    Ok(state)
}

fn load_raw(path: &Path) -> Result<Vec<Value>, ProjectsError> {
    let content = fs::read_to_string(path)?;
    let value: Value = serde_yaml_ng::from_str(&content)
        .map_err(|err| ProjectsError::Yaml(path.display().to_string(), err))?;
    Ok(match value {
        Value::Sequence(seq) => seq,
        Value::Null => Vec::new(),
        other => vec![other],
    })
}
