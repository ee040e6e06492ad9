//! Site configuration module.
//!
//! Loads an optional `vita.toml` from the project root. Every field has a
//! default, so a config file is only needed to override something; unknown
//! keys are rejected to catch typos early.
//!
//! ```toml
//! [site]
//! title = "Ada Example"
//! tagline = "Personal website of Ada Example - researcher and builder."
//! url = "https://example.com"
//! author = "Ada Example"
//!
//! [paths]
//! yaml_dir = "data/yaml"
//! json_dir = "data/json"
//!
//! [optimize]
//! max_width = 1920
//! jpeg_quality = 85
//! size_threshold_kb = 500
//! ```
//!
//! Run `vita gen-config` to print the full stock config with all options
//! documented.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `vita.toml`.
///
/// All fields have defaults; user config files need only specify the
/// values they want to override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site identity: title, tagline, canonical URL.
    pub site: SiteSection,
    /// Directory layout relative to the project root.
    pub paths: PathsConfig,
    /// Image optimizer limits and encoding quality.
    pub optimize: OptimizeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    /// Site title, used as the llms.txt heading and manifest name.
    pub title: String,
    /// One-line site description for the llms.txt blockquote.
    pub tagline: String,
    /// Canonical site URL, no trailing slash.
    pub url: String,
    /// Author name, used in the combined-document metadata header.
    pub author: String,
    /// Short name for the web app manifest.
    pub short_name: String,
    /// Theme color for the web app manifest and tile config.
    pub theme_color: String,
    /// Background color for the web app manifest.
    pub background_color: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: "Ada Example".into(),
            tagline: "Personal website of Ada Example.".into(),
            url: "https://example.com".into(),
            author: "Ada Example".into(),
            short_name: "Ada".into(),
            theme_color: "#ffffff".into(),
            background_color: "#ffffff".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Hand-edited YAML category files.
    pub yaml_dir: String,
    /// Generated JSON mirrors.
    pub json_dir: String,
    /// Generated combined knowledge-base document.
    pub combined_file: String,
    /// Root for generated posts (papers/, news/, projects/ beneath it).
    pub posts_dir: String,
    /// Site image tree the optimizer works on.
    pub images_dir: String,
    /// Mirrored backup tree, copy-on-first-touch.
    pub backup_dir: String,
    /// Generated HTML fragments.
    pub fragments_dir: String,
    /// Generated favicon set and manifests.
    pub icons_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            yaml_dir: "data/yaml".into(),
            json_dir: "data/json".into(),
            combined_file: "data/combined-data.yaml".into(),
            posts_dir: "cv/_posts".into(),
            images_dir: "images".into(),
            backup_dir: "_image-backups".into(),
            fragments_dir: "_fragments".into(),
            icons_dir: "icons".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizeConfig {
    /// Maximum width in pixels; larger images are resized to fit.
    pub max_width: u32,
    /// Maximum height in pixels.
    pub max_height: u32,
    /// JPEG encoding quality (1-100).
    pub jpeg_quality: u8,
    /// Size threshold in KB for the recompression pass.
    pub size_threshold_kb: u64,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            max_width: 1920,
            max_height: 1920,
            jpeg_quality: 85,
            size_threshold_kb: 500,
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.optimize.jpeg_quality == 0 || self.optimize.jpeg_quality > 100 {
            return Err(ConfigError::Validation(
                "optimize.jpeg_quality must be 1-100".into(),
            ));
        }
        if self.optimize.max_width == 0 || self.optimize.max_height == 0 {
            return Err(ConfigError::Validation(
                "optimize.max_width and max_height must be non-zero".into(),
            ));
        }
        if self.site.url.ends_with('/') {
            return Err(ConfigError::Validation(
                "site.url must not end with a trailing slash".into(),
            ));
        }
        Ok(())
    }
}

/// Load `vita.toml` from the project root, falling back to defaults when
/// the file does not exist.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let config_path = root.join("vita.toml");
    let config: SiteConfig = if config_path.exists() {
        let content = fs::read_to_string(&config_path)?;
        toml::from_str(&content)?
    } else {
        SiteConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// Stock `vita.toml` with every option documented, for `vita gen-config`.
pub fn stock_config_toml() -> String {
    r##"# vita configuration - all options shown with their defaults.
# Only the values you want to override need to be present.

[site]
title = "Ada Example"
tagline = "Personal website of Ada Example."
url = "https://example.com"          # canonical URL, no trailing slash
author = "Ada Example"
short_name = "Ada"                   # web app manifest short name
theme_color = "#ffffff"
background_color = "#ffffff"

[paths]
yaml_dir = "data/yaml"               # hand-edited category files
json_dir = "data/json"               # generated JSON mirrors
combined_file = "data/combined-data.yaml"
posts_dir = "cv/_posts"              # papers/, news/, projects/ beneath it
images_dir = "images"
backup_dir = "_image-backups"        # copy-on-first-touch backup tree
fragments_dir = "_fragments"
icons_dir = "icons"

[optimize]
max_width = 1920                     # resize anything wider
max_height = 1920
jpeg_quality = 85                    # 1-100
size_threshold_kb = 500              # recompress anything larger
"##
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();

        assert_eq!(config.paths.yaml_dir, "data/yaml");
        assert_eq!(config.optimize.jpeg_quality, 85);
        assert_eq!(config.optimize.size_threshold_kb, 500);
    }

    #[test]
    fn partial_config_overrides_only_named_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("vita.toml"),
            "[optimize]\njpeg_quality = 70\n",
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.optimize.jpeg_quality, 70);
        // Everything else stays at defaults
        assert_eq!(config.optimize.max_width, 1920);
        assert_eq!(config.site.url, "https://example.com");
    }

    #[test]
    fn unknown_keys_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("vita.toml"), "[site]\ntitel = \"typo\"\n").unwrap();

        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn quality_out_of_range_rejected() {
        let config = SiteConfig {
            optimize: OptimizeConfig {
                jpeg_quality: 0,
                ..OptimizeConfig::default()
            },
            ..SiteConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn trailing_slash_url_rejected() {
        let mut config = SiteConfig::default();
        config.site.url = "https://example.com/".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn stock_config_parses_back() {
        let config: SiteConfig = toml::from_str(&stock_config_toml()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.paths.posts_dir, "cv/_posts");
    }
}
