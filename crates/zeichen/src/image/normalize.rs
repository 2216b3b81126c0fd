//! Rescaling to a canonical long edge.
//!
//! Recognition quality depends on absolute pixel density, so every image is
//! resampled until its longer side equals the configured target (3000 px by
//! default), whether that means up- or down-scaling.

use super::{encode_png, load_image};
use crate::{Result, ZeichenError};
use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, RgbaImage};

/// Output dimensions for scaling `(width, height)` to `target_long_edge`.
///
/// Each side is rounded and never drops below one pixel.
pub fn target_dimensions(width: u32, height: u32, target_long_edge: u32) -> (u32, u32) {
    let long_edge = width.max(height).max(1) as f64;
    let scale = target_long_edge as f64 / long_edge;
    let w = ((width as f64 * scale).round() as u32).max(1);
    let h = ((height as f64 * scale).round() as u32).max(1);
    (w, h)
}

/// Resample `image` so its long edge equals `target_long_edge`.
///
/// Uses a Catmull-Rom convolution on RGBA8 pixels. An image already at the
/// target size is returned as an RGBA copy.
pub fn normalize(image: &DynamicImage, target_long_edge: u32) -> Result<DynamicImage> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(ZeichenError::image_processing("Cannot normalize an empty image"));
    }

    let (dst_width, dst_height) = target_dimensions(width, height, target_long_edge);
    let rgba = image.to_rgba8();
    if (dst_width, dst_height) == (width, height) {
        return Ok(DynamicImage::ImageRgba8(rgba));
    }

    let src = Image::from_vec_u8(width, height, rgba.into_raw(), PixelType::U8x4)
        .map_err(|e| ZeichenError::image_processing_with_source("Invalid source buffer", e))?;
    let mut dst = Image::new(dst_width, dst_height, PixelType::U8x4);

    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::CatmullRom));
    Resizer::new()
        .resize(&src, &mut dst, &options)
        .map_err(|e| ZeichenError::image_processing_with_source("Resize failed", e))?;

    let resized = RgbaImage::from_raw(dst_width, dst_height, dst.into_vec())
        .ok_or_else(|| ZeichenError::image_processing("Resized buffer has unexpected length"))?;
    Ok(DynamicImage::ImageRgba8(resized))
}

/// Byte-level normalization: decode, rescale, re-encode as PNG.
///
/// Never fails. Undecodable input is returned unchanged so the caller can still
/// hand it to the recognizer as-is.
pub fn normalize_bytes(bytes: &[u8], target_long_edge: u32) -> Vec<u8> {
    let result = load_image(bytes)
        .and_then(|image| normalize(&image, target_long_edge))
        .and_then(|image| encode_png(&image));

    match result {
        Ok(png) => png,
        Err(e) => {
            tracing::warn!("Image normalization skipped, passing input through: {}", e);
            bytes.to_vec()
        }
    }
}
