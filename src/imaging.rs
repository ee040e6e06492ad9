//! Image helpers: dimension math, transparency detection, encoding.
//!
//! The dimension and sampling functions are pure and unit-tested
//! without any file I/O; the optimizer composes them with the
//! filesystem work it owns.

use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};

/// Samples taken per transparency scan, regardless of image size.
const ALPHA_SAMPLE_BUDGET: usize = 10_000;

/// Dimensions after shrinking `size` to fit inside `bounds`, preserving
/// aspect ratio. `None` when the image already fits; never upscales.
pub fn fit_within(size: (u32, u32), bounds: (u32, u32)) -> Option<(u32, u32)> {
    let (w, h) = size;
    let (max_w, max_h) = bounds;
    if w <= max_w && h <= max_h {
        return None;
    }
    let scale = f64::min(max_w as f64 / w as f64, max_h as f64 / h as f64);
    let new_w = ((w as f64 * scale).round() as u32).max(1);
    let new_h = ((h as f64 * scale).round() as u32).max(1);
    Some((new_w, new_h))
}

/// Pixel step that keeps a transparency scan near the sample budget.
pub fn sample_stride(pixel_count: usize) -> usize {
    (pixel_count / ALPHA_SAMPLE_BUDGET).max(1)
}

/// Whether the image carries any non-opaque pixel, decided by a
/// stride-sampled alpha scan. Images without an alpha channel are
/// opaque by definition. A statistical approximation: isolated
/// transparent pixels between sample points can be missed.
pub fn has_transparency(image: &DynamicImage) -> bool {
    if !image.color().has_alpha() {
        return false;
    }
    let rgba = image.to_rgba8();
    let stride = sample_stride(rgba.pixels().len());
    rgba.pixels().step_by(stride).any(|p| p.0[3] < 255)
}

/// Encode as baseline JPEG at the given quality. Alpha is dropped;
/// callers check [`has_transparency`] first.
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let rgb = image.to_rgb8();
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    encoder.encode_image(&rgb)?;
    Ok(buf)
}

/// Re-encode as PNG at maximum compression.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut buf, CompressionType::Best, PngFilter::Adaptive);
    image.write_with_encoder(encoder)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn fit_within_leaves_small_images_alone() {
        assert_eq!(fit_within((800, 600), (1920, 1920)), None);
        assert_eq!(fit_within((1920, 1920), (1920, 1920)), None);
    }

    #[test]
    fn fit_within_shrinks_preserving_aspect() {
        assert_eq!(fit_within((3840, 2160), (1920, 1920)), Some((1920, 1080)));
        assert_eq!(fit_within((2160, 3840), (1920, 1920)), Some((1080, 1920)));
    }

    #[test]
    fn fit_within_never_returns_zero() {
        assert_eq!(fit_within((10000, 1), (1920, 1920)), Some((1920, 1)));
    }

    #[test]
    fn stride_bounds_sample_count() {
        assert_eq!(sample_stride(100), 1);
        assert_eq!(sample_stride(10_000), 1);
        assert_eq!(sample_stride(1_000_000), 100);
        let pixels = 4_000_000;
        let samples = pixels / sample_stride(pixels);
        assert!((10_000..20_000).contains(&samples));
    }

    #[test]
    fn opaque_rgb_has_no_transparency() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([10, 20, 30])));
        assert!(!has_transparency(&img));
    }

    #[test]
    fn fully_opaque_rgba_has_no_transparency() {
        let img =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 255])));
        assert!(!has_transparency(&img));
    }

    #[test]
    fn translucent_rgba_is_detected() {
        let mut raw = RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 255]));
        raw.put_pixel(3, 3, Rgba([10, 20, 30, 128]));
        // Small image, stride 1: every pixel is sampled.
        assert!(has_transparency(&DynamicImage::ImageRgba8(raw)));
    }

    #[test]
    fn jpeg_round_trip_decodes() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([200, 100, 50])));
        let bytes = encode_jpeg(&img, 85).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 16);
        assert_eq!(decoded.height(), 16);
    }

    #[test]
    fn png_round_trip_decodes() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([200, 100, 50])));
        let bytes = encode_png(&img).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 16);
    }
}
