//! Raster asset optimization for letterhead logos and seals.
//!
//! Embedded images are downsampled to bounded dimensions and re-encoded as
//! JPEG at a fixed quality. A decode failure is non-fatal: the original
//! bytes pass through unchanged with a warning, since a document without
//! its letterhead art is still useful.

use facture_render_core::ImageFormat;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, GenericImageView};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageLimits {
    pub max_width: u32,
    pub max_height: u32,
    /// JPEG quality, 1-100.
    pub quality: u8,
}

impl Default for ImageLimits {
    fn default() -> Self {
        Self {
            max_width: 800,
            max_height: 400,
            quality: 80,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OptimizedImage {
    pub bytes: Arc<Vec<u8>>,
    pub format: ImageFormat,
    pub resized: bool,
    /// Set when optimization was skipped and the original passed through.
    pub warning: Option<String>,
}

/// Optimizes one embedded image as a single bounded unit of work.
///
/// Scales down only, preserving aspect ratio; never scales up.
pub fn optimize(bytes: &[u8], limits: &ImageLimits) -> OptimizedImage {
    let decoded = match image::load_from_memory(bytes) {
        Ok(img) => img,
        Err(err) => {
            log::warn!("image decode failed, passing original through: {err}");
            return OptimizedImage {
                bytes: Arc::new(bytes.to_vec()),
                format: sniff_format(bytes),
                resized: false,
                warning: Some(format!("image could not be decoded: {err}")),
            };
        }
    };

    let (width, height) = decoded.dimensions();
    let needs_resize = width > limits.max_width || height > limits.max_height;
    // `thumbnail` preserves aspect ratio and never upscales.
    let bounded = if needs_resize {
        decoded.thumbnail(limits.max_width, limits.max_height)
    } else {
        decoded
    };

    let rgb = bounded.to_rgb8();
    let mut encoded = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut encoded, limits.quality);
    match encoder.encode(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        ExtendedColorType::Rgb8,
    ) {
        Ok(()) => OptimizedImage {
            bytes: Arc::new(encoded),
            format: ImageFormat::Jpeg,
            resized: needs_resize,
            warning: None,
        },
        Err(err) => {
            log::warn!("JPEG re-encode failed, passing original through: {err}");
            OptimizedImage {
                bytes: Arc::new(bytes.to_vec()),
                format: sniff_format(bytes),
                resized: false,
                warning: Some(format!("image could not be re-encoded: {err}")),
            }
        }
    }
}

fn sniff_format(bytes: &[u8]) -> ImageFormat {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        ImageFormat::Png
    } else {
        ImageFormat::Jpeg
    }
}
