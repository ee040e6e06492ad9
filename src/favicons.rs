//! Favicon and platform-icon generation.
//!
//! Produces the full icon set from one square-ish source image:
//! center-crop-resized PNGs for each platform size, a `favicon.ico`
//! (32×32 PNG payload, which every current browser accepts), a web app
//! manifest, and the Windows tile config.

use crate::config::SiteConfig;
use crate::imaging;
use image::imageops::FilterType;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FaviconError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("source image not found: {0}")]
    MissingSource(PathBuf),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The fixed icon set, file name and square edge size.
const ICON_SIZES: &[(&str, u32)] = &[
    ("apple-touch-icon.png", 180),
    ("favicon-32x32.png", 32),
    ("favicon-16x16.png", 16),
    ("android-chrome-192x192.png", 192),
    ("android-chrome-512x512.png", 512),
    ("mstile-150x150.png", 150),
];

/// Generate the icon set from `source` into `<root>/<icons_dir>`, plus
/// `favicon.ico` at the root.
pub fn generate(root: &Path, source: &Path, config: &SiteConfig) -> Result<(), FaviconError> {
    if !source.is_file() {
        return Err(FaviconError::MissingSource(source.to_path_buf()));
    }
    let icons_dir = root.join(&config.paths.icons_dir);
    fs::create_dir_all(&icons_dir)?;

    let image = image::open(source)?;
    for &(name, size) in ICON_SIZES {
        let icon = image.resize_to_fill(size, size, FilterType::Lanczos3);
        icon.save(icons_dir.join(name))?;
        println!("  + {name} ({size}x{size})");
    }

    // favicon.ico, at the root and alongside the other icons.
    let ico = imaging::encode_png(&image.resize_to_fill(32, 32, FilterType::Lanczos3))?;
    fs::write(root.join("favicon.ico"), &ico)?;
    fs::write(icons_dir.join("favicon.ico"), &ico)?;
    println!("  + favicon.ico (32x32)");

    fs::write(icons_dir.join("site.webmanifest"), webmanifest(config)?)?;
    fs::write(icons_dir.join("browserconfig.xml"), browserconfig(config))?;
    println!("  + site.webmanifest, browserconfig.xml");

    Ok(())
}

fn webmanifest(config: &SiteConfig) -> Result<String, serde_json::Error> {
    let manifest = json!({
        "name": config.site.title,
        "short_name": config.site.short_name,
        "icons": [
            {
                "src": "/icons/android-chrome-192x192.png",
                "sizes": "192x192",
                "type": "image/png"
            },
            {
                "src": "/icons/android-chrome-512x512.png",
                "sizes": "512x512",
                "type": "image/png"
            }
        ],
        "theme_color": config.site.theme_color,
        "background_color": config.site.background_color,
        "display": "standalone"
    });
    serde_json::to_string_pretty(&manifest)
}

fn browserconfig(config: &SiteConfig) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <browserconfig>\n\
           <msapplication>\n\
             <tile>\n\
               <square150x150logo src=\"/icons/mstile-150x150.png\"/>\n\
               <TileColor>{}</TileColor>\n\
             </tile>\n\
           </msapplication>\n\
         </browserconfig>\n",
        config.site.theme_color
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    #[test]
    fn generates_all_icons_and_manifests() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("portrait.png");
        RgbImage::from_pixel(64, 48, Rgb([10, 20, 30]))
            .save(&source)
            .unwrap();

        let config = SiteConfig::default();
        generate(tmp.path(), &source, &config).unwrap();

        let icons = tmp.path().join(&config.paths.icons_dir);
        for &(name, size) in ICON_SIZES {
            let icon = image::open(icons.join(name)).unwrap();
            assert_eq!((icon.width(), icon.height()), (size, size), "{name}");
        }
        assert!(tmp.path().join("favicon.ico").exists());
        assert!(icons.join("favicon.ico").exists());

        let manifest: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(icons.join("site.webmanifest")).unwrap())
                .unwrap();
        assert_eq!(manifest["icons"].as_array().unwrap().len(), 2);

        let tiles = fs::read_to_string(icons.join("browserconfig.xml")).unwrap();
        assert!(tiles.contains("mstile-150x150.png"));
    }

    #[test]
    fn ico_payload_is_a_32px_png() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("portrait.png");
        RgbImage::from_pixel(64, 64, Rgb([1, 2, 3])).save(&source).unwrap();

        generate(tmp.path(), &source, &SiteConfig::default()).unwrap();

        let bytes = fs::read(tmp.path().join("favicon.ico")).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 32));
    }

    #[test]
    fn missing_source_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let result = generate(
            tmp.path(),
            &tmp.path().join("nope.png"),
            &SiteConfig::default(),
        );
        assert!(matches!(result, Err(FaviconError::MissingSource(_))));
    }
}
