//! Image optimizer.
//!
//! Two sequential passes over the images tree, then a reference rewrite:
//!
//! 1. Opaque PNGs become JPEGs (transparency, decided by a sampled alpha
//!    scan, is the only reason to keep a PNG). The original is backed up
//!    and deleted, and the rename is recorded in a conversion ledger.
//! 2. Any image over the size threshold is resized to the configured
//!    bounds and recompressed in place, via a temp file and rename.
//!    A file whose backup already exists was handled on an earlier run
//!    and is skipped; backup existence is the dedup marker.
//!
//! Finally every ledger entry is applied as a literal text replacement
//! across the YAML sources and the combined document, so data references
//! follow the renamed files. Backups land in a mirrored tree and are
//! never overwritten, so the first-ever version of each image survives
//! repeated runs.
//!
//! `--dry-run` performs the full analysis and prints every intended
//! action without touching a single file.

use crate::config::SiteConfig;
use crate::convert::is_yaml;
use crate::imaging;
use image::imageops::FilterType;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum OptimizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("images directory not found: {0}")]
    MissingImagesDir(PathBuf),
}

/// Knobs for an optimizer run; quality and threshold default from the
/// config and can be overridden per invocation.
#[derive(Debug, Clone)]
pub struct OptimizeOptions {
    pub dry_run: bool,
    pub convert_png: bool,
    pub jpeg_quality: u8,
    pub size_threshold_kb: u64,
    pub max_width: u32,
    pub max_height: u32,
}

impl OptimizeOptions {
    pub fn from_config(config: &SiteConfig) -> Self {
        OptimizeOptions {
            dry_run: false,
            convert_png: true,
            jpeg_quality: config.optimize.jpeg_quality,
            size_threshold_kb: config.optimize.size_threshold_kb,
            max_width: config.optimize.max_width,
            max_height: config.optimize.max_height,
        }
    }
}

/// Counts and byte totals reported after a run.
#[derive(Debug, Default)]
pub struct OptimizeSummary {
    pub converted: usize,
    pub optimized: usize,
    pub skipped: usize,
    pub initial_bytes: u64,
    pub final_bytes: u64,
}

impl OptimizeSummary {
    pub fn saved_bytes(&self) -> u64 {
        self.initial_bytes.saturating_sub(self.final_bytes)
    }
}

/// Name of the persistent conversion log at the project root.
const CONVERSION_LOG: &str = "png-to-jpg-conversions.txt";

/// Run the optimizer over `<root>/<images_dir>`.
pub fn optimize(
    root: &Path,
    config: &SiteConfig,
    options: &OptimizeOptions,
) -> Result<OptimizeSummary, OptimizeError> {
    let images_dir = root.join(&config.paths.images_dir);
    let backup_dir = root.join(&config.paths.backup_dir);
    if !images_dir.is_dir() {
        return Err(OptimizeError::MissingImagesDir(images_dir));
    }

    let mut summary = OptimizeSummary::default();
    let mut ledger: Vec<(String, String)> = Vec::new();

    summary.initial_bytes = tree_size(&enumerate_images(&images_dir));

    if options.convert_png {
        convert_pass(
            root,
            &images_dir,
            &backup_dir,
            options,
            &mut ledger,
            &mut summary,
        )?;
    }
    size_pass(&images_dir, &backup_dir, options, &mut summary);

    if !ledger.is_empty() && !options.dry_run {
        let yaml_dir = root.join(&config.paths.yaml_dir);
        let combined = root.join(&config.paths.combined_file);
        rewrite_references(&ledger, &yaml_dir, &combined);

        let mut log = String::new();
        for (old, new) in &ledger {
            log.push_str(&format!("{old} -> {new}\n"));
        }
        append_log(&root.join(CONVERSION_LOG), &log)?;
    }

    summary.final_bytes = tree_size(&enumerate_images(&images_dir));
    println!(
        "  {} before, {} after ({} saved)",
        format_bytes(summary.initial_bytes),
        format_bytes(summary.final_bytes),
        format_bytes(summary.saved_bytes()),
    );
    Ok(summary)
}

/// Pass 1: convert opaque PNGs to JPEG.
fn convert_pass(
    root: &Path,
    images_dir: &Path,
    backup_dir: &Path,
    options: &OptimizeOptions,
    ledger: &mut Vec<(String, String)>,
    summary: &mut OptimizeSummary,
) -> Result<(), OptimizeError> {
    for file in enumerate_images(images_dir) {
        if !has_extension(&file, &["png"]) {
            continue;
        }
        let image = match image::open(&file) {
            Ok(img) => img,
            Err(err) => {
                eprintln!("  warning: could not decode {}: {err}", file.display());
                summary.skipped += 1;
                continue;
            }
        };
        if imaging::has_transparency(&image) {
            println!("  ~ {} (transparent, kept as PNG)", rel_display(&file, images_dir));
            summary.skipped += 1;
            continue;
        }

        let jpg_path = file.with_extension("jpg");
        let old_site = site_path(&file, root);
        let new_site = site_path(&jpg_path, root);
        if options.dry_run {
            println!("  would convert {old_site} -> {new_site}");
            summary.converted += 1;
            ledger.push((old_site, new_site));
            continue;
        }

        ensure_backup(&file, images_dir, backup_dir)?;
        let image = shrink_if_oversized(image, options);
        match imaging::encode_jpeg(&image, options.jpeg_quality) {
            Ok(bytes) => {
                fs::write(&jpg_path, bytes)?;
                fs::remove_file(&file)?;
                println!("  + {old_site} -> {new_site}");
                ledger.push((old_site, new_site));
                summary.converted += 1;
            }
            Err(err) => {
                eprintln!("  warning: could not encode {}: {err}", jpg_path.display());
                summary.skipped += 1;
            }
        }
    }
    Ok(())
}

/// Pass 2: resize and recompress anything over the size threshold.
fn size_pass(
    images_dir: &Path,
    backup_dir: &Path,
    options: &OptimizeOptions,
    summary: &mut OptimizeSummary,
) {
    let threshold = options.size_threshold_kb * 1024;
    for file in enumerate_images(images_dir) {
        let size = fs::metadata(&file).map(|m| m.len()).unwrap_or(0);
        if size <= threshold {
            continue;
        }
        let backup_path = backup_dir.join(relative_to(&file, images_dir));
        if backup_path.exists() {
            // Handled on an earlier run.
            summary.skipped += 1;
            continue;
        }
        if options.dry_run {
            println!(
                "  would recompress {} ({})",
                rel_display(&file, images_dir),
                format_bytes(size)
            );
            summary.optimized += 1;
            continue;
        }
        match recompress(&file, images_dir, backup_dir, options) {
            Ok(()) => {
                println!(
                    "  + recompressed {} ({})",
                    rel_display(&file, images_dir),
                    format_bytes(size)
                );
                summary.optimized += 1;
            }
            Err(err) => {
                eprintln!("  warning: could not optimize {}: {err}", file.display());
                summary.skipped += 1;
            }
        }
    }
}

fn recompress(
    file: &Path,
    images_dir: &Path,
    backup_dir: &Path,
    options: &OptimizeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    ensure_backup(file, images_dir, backup_dir)?;
    let image = shrink_if_oversized(image::open(file)?, options);
    let bytes = if has_extension(file, &["png"]) {
        imaging::encode_png(&image)?
    } else {
        imaging::encode_jpeg(&image, options.jpeg_quality)?
    };

    // Write next to the target, then rename, so a failed run never
    // leaves a half-written image in place.
    let tmp = file.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, file)?;
    Ok(())
}

fn shrink_if_oversized(image: image::DynamicImage, options: &OptimizeOptions) -> image::DynamicImage {
    match imaging::fit_within(
        (image.width(), image.height()),
        (options.max_width, options.max_height),
    ) {
        Some((w, h)) => image.resize(w, h, FilterType::Lanczos3),
        None => image,
    }
}

/// Copy `file` into the mirrored backup tree unless a backup is already
/// there; an existing backup is the first-ever version and stays.
fn ensure_backup(file: &Path, images_dir: &Path, backup_dir: &Path) -> std::io::Result<()> {
    let backup_path = backup_dir.join(relative_to(file, images_dir));
    if backup_path.exists() {
        return Ok(());
    }
    if let Some(parent) = backup_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(file, backup_path)?;
    Ok(())
}

/// Apply every rename as a literal text replacement across the YAML
/// sources. References are stored as site-absolute strings, so a plain
/// find/replace is exact and keeps comments and formatting intact.
fn rewrite_references(ledger: &[(String, String)], yaml_dir: &Path, combined: &Path) {
    let mut targets: Vec<PathBuf> = WalkDir::new(yaml_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_yaml(e.path()))
        .map(|e| e.into_path())
        .collect();
    if combined.exists() {
        targets.push(combined.to_path_buf());
    }

    for target in targets {
        let Ok(content) = fs::read_to_string(&target) else {
            continue;
        };
        let mut updated = content.clone();
        for (old, new) in ledger {
            updated = updated.replace(old.as_str(), new.as_str());
        }
        if updated != content {
            if let Err(err) = fs::write(&target, updated) {
                eprintln!("  warning: could not rewrite {}: {err}", target.display());
            } else {
                println!("  ~ updated references in {}", target.display());
            }
        }
    }
}

fn append_log(path: &Path, lines: &str) -> std::io::Result<()> {
    use std::io::Write;
    let mut file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(lines.as_bytes())
}

fn enumerate_images(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && has_extension(e.path(), &["png", "jpg", "jpeg"]))
        .map(|e| e.into_path())
        .collect()
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .map(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

fn tree_size(files: &[PathBuf]) -> u64 {
    files
        .iter()
        .filter_map(|f| fs::metadata(f).ok())
        .map(|m| m.len())
        .sum()
}

fn relative_to(file: &Path, base: &Path) -> PathBuf {
    file.strip_prefix(base).unwrap_or(file).to_path_buf()
}

fn rel_display(file: &Path, base: &Path) -> String {
    relative_to(file, base).display().to_string()
}

/// Site-absolute reference for a file under the project root, the form
/// the YAML sources use (`/images/foo.png`).
fn site_path(file: &Path, root: &Path) -> String {
    format!("/{}", relative_to(file, root).display())
}

/// Human-readable byte count for the run summary.
pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use tempfile::TempDir;

    fn setup() -> (TempDir, SiteConfig) {
        let tmp = TempDir::new().unwrap();
        let config = SiteConfig::default();
        fs::create_dir_all(tmp.path().join(&config.paths.images_dir)).unwrap();
        fs::create_dir_all(tmp.path().join(&config.paths.yaml_dir)).unwrap();
        (tmp, config)
    }

    fn write_opaque_png(path: &Path) {
        RgbImage::from_pixel(16, 16, Rgb([120, 130, 140]))
            .save(path)
            .unwrap();
    }

    fn write_transparent_png(path: &Path) {
        RgbaImage::from_pixel(16, 16, Rgba([120, 130, 140, 10]))
            .save(path)
            .unwrap();
    }

    fn options() -> OptimizeOptions {
        OptimizeOptions {
            dry_run: false,
            convert_png: true,
            jpeg_quality: 85,
            size_threshold_kb: 10_000,
            max_width: 1920,
            max_height: 1920,
        }
    }

    #[test]
    fn opaque_png_converted_backed_up_and_removed() {
        let (tmp, config) = setup();
        let images = tmp.path().join(&config.paths.images_dir);
        write_opaque_png(&images.join("photo.png"));

        let summary = optimize(tmp.path(), &config, &options()).unwrap();

        assert_eq!(summary.converted, 1);
        assert!(!images.join("photo.png").exists());
        assert!(images.join("photo.jpg").exists());
        assert!(
            tmp.path()
                .join(&config.paths.backup_dir)
                .join("photo.png")
                .exists()
        );
        let log = fs::read_to_string(tmp.path().join(CONVERSION_LOG)).unwrap();
        assert!(log.contains("/images/photo.png -> /images/photo.jpg"));
    }

    #[test]
    fn transparent_png_left_untouched() {
        let (tmp, config) = setup();
        let images = tmp.path().join(&config.paths.images_dir);
        write_transparent_png(&images.join("logo.png"));

        let summary = optimize(tmp.path(), &config, &options()).unwrap();

        assert_eq!(summary.converted, 0);
        assert_eq!(summary.skipped, 1);
        assert!(images.join("logo.png").exists());
        assert!(!images.join("logo.jpg").exists());
    }

    #[test]
    fn yaml_references_follow_the_rename() {
        let (tmp, config) = setup();
        let images = tmp.path().join(&config.paths.images_dir);
        write_opaque_png(&images.join("photo.png"));
        let yaml = tmp.path().join(&config.paths.yaml_dir).join("projects.yaml");
        fs::write(&yaml, "- id: p\n  image: /images/photo.png\n").unwrap();

        optimize(tmp.path(), &config, &options()).unwrap();

        let rewritten = fs::read_to_string(&yaml).unwrap();
        assert!(rewritten.contains("/images/photo.jpg"));
        assert!(!rewritten.contains("photo.png"));
    }

    #[test]
    fn dry_run_changes_nothing() {
        let (tmp, config) = setup();
        let images = tmp.path().join(&config.paths.images_dir);
        write_opaque_png(&images.join("photo.png"));
        let yaml = tmp.path().join(&config.paths.yaml_dir).join("projects.yaml");
        fs::write(&yaml, "- image: /images/photo.png\n").unwrap();

        let mut opts = options();
        opts.dry_run = true;
        let summary = optimize(tmp.path(), &config, &opts).unwrap();

        assert_eq!(summary.converted, 1);
        assert!(images.join("photo.png").exists());
        assert!(!images.join("photo.jpg").exists());
        assert!(!tmp.path().join(&config.paths.backup_dir).exists());
        assert!(!tmp.path().join(CONVERSION_LOG).exists());
        assert!(fs::read_to_string(&yaml).unwrap().contains("photo.png"));
    }

    #[test]
    fn no_convert_leaves_pngs_but_size_pass_still_runs() {
        let (tmp, config) = setup();
        let images = tmp.path().join(&config.paths.images_dir);
        write_opaque_png(&images.join("photo.png"));

        let mut opts = options();
        opts.convert_png = false;
        opts.size_threshold_kb = 0; // everything is over threshold
        let summary = optimize(tmp.path(), &config, &opts).unwrap();

        assert_eq!(summary.converted, 0);
        assert_eq!(summary.optimized, 1);
        assert!(images.join("photo.png").exists());
        assert!(
            tmp.path()
                .join(&config.paths.backup_dir)
                .join("photo.png")
                .exists()
        );
    }

    #[test]
    fn existing_backup_skips_size_pass_rework() {
        let (tmp, config) = setup();
        let images = tmp.path().join(&config.paths.images_dir);
        write_opaque_png(&images.join("photo.png"));

        let mut opts = options();
        opts.convert_png = false;
        opts.size_threshold_kb = 0;
        optimize(tmp.path(), &config, &opts).unwrap();
        let second = optimize(tmp.path(), &config, &opts).unwrap();

        assert_eq!(second.optimized, 0);
        assert_eq!(second.skipped, 1);
    }

    #[test]
    fn oversized_image_resized_within_bounds() {
        let (tmp, config) = setup();
        let images = tmp.path().join(&config.paths.images_dir);
        RgbImage::from_pixel(64, 32, Rgb([1, 2, 3]))
            .save(images.join("wide.png"))
            .unwrap();

        let mut opts = options();
        opts.max_width = 32;
        opts.max_height = 32;
        optimize(tmp.path(), &config, &opts).unwrap();

        let resized = image::open(images.join("wide.jpg")).unwrap();
        assert_eq!((resized.width(), resized.height()), (32, 16));
    }

    #[test]
    fn missing_images_dir_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let result = optimize(tmp.path(), &SiteConfig::default(), &options());
        assert!(matches!(result, Err(OptimizeError::MissingImagesDir(_))));
    }

    #[test]
    fn byte_formatting() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
