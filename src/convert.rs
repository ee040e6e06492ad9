//! YAML→JSON conversion.
//!
//! Data is edited in human-friendly YAML and served to the browser as
//! JSON. This stage walks the YAML tree and writes one pretty-printed
//! JSON file per YAML file into a mirrored directory tree:
//!
//! ```text
//! data/yaml/projects.yaml          → data/json/projects.json
//! data/yaml/dissertation/plan.yml  → data/json/dissertation/plan.json
//! ```
//!
//! A file that fails to parse or write is reported and skipped; the rest
//! of the tree still converts. The CLI exits non-zero when anything
//! failed, so CI catches broken data without losing the good conversions.

use serde_yaml_ng::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("data directory not found: {0}")]
    MissingDataDir(PathBuf),
}

/// Counts reported after a conversion run.
#[derive(Debug, Default)]
pub struct ConvertSummary {
    pub converted: usize,
    pub failed: usize,
}

/// Check for a `.yaml`/`.yml` extension, case-insensitively.
pub fn is_yaml(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}

/// Convert every YAML file under `yaml_root` into a JSON mirror under
/// `json_root`.
pub fn convert_tree(yaml_root: &Path, json_root: &Path) -> Result<ConvertSummary, ConvertError> {
    if !yaml_root.is_dir() {
        return Err(ConvertError::MissingDataDir(yaml_root.to_path_buf()));
    }

    let mut summary = ConvertSummary::default();

    for entry in WalkDir::new(yaml_root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || !is_yaml(path) {
            continue;
        }

        // Mirror the subdirectory structure under json_root.
        let rel = path.strip_prefix(yaml_root).unwrap_or(path);
        let json_path = json_root.join(rel).with_extension("json");

        match convert_file(path, &json_path) {
            Ok(()) => {
                println!(
                    "  converted {} -> {}",
                    rel.display(),
                    json_path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default()
                );
                summary.converted += 1;
            }
            Err(err) => {
                eprintln!("  error converting {}: {err}", rel.display());
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

/// Convert a single YAML file, creating parent directories as needed.
pub fn convert_file(yaml_path: &Path, json_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let content = fs::read_to_string(yaml_path)?;
    let data: Value = serde_yaml_ng::from_str(&content)?;
    let json = serde_json::to_string_pretty(&data)?;

    if let Some(parent) = json_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(json_path, json)?;
    Ok(())
}
