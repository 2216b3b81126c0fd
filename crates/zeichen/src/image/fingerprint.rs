//! Resolution-invariant image fingerprints.
//!
//! A fingerprint is the hex encoding of a sparse sample of the image's pixels
//! after it has been squashed to a 32×32 grid (aspect ratio ignored). Two
//! images that look the same at that resolution share a fingerprint no matter
//! their original size or encoding. Collisions are acceptable: the value only
//! decides whether recognition can be skipped.

use super::load_image;
use image::imageops;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of the square sampling grid.
pub const GRID_SIZE: u32 = 32;

/// Every `SAMPLE_STRIDE`-th byte of the RGBA grid is kept.
pub const SAMPLE_STRIDE: usize = 16;

/// Prefix marking a fingerprint derived from the encoded length only.
pub const ERROR_PREFIX: &str = "err_";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImageFingerprint(String);

impl ImageFingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the image could not be decoded and the fingerprint is length-based.
    pub fn is_fallback(&self) -> bool {
        self.0.starts_with(ERROR_PREFIX)
    }
}

impl fmt::Display for ImageFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the fingerprint of encoded image bytes.
///
/// Never fails: undecodable input yields `err_<byte length>`, a weaker key that
/// still lets the batch go on.
pub fn fingerprint(bytes: &[u8]) -> ImageFingerprint {
    match load_image(bytes) {
        Ok(image) => {
            let rgba = image.to_rgba8();
            let grid = imageops::thumbnail(&rgba, GRID_SIZE, GRID_SIZE);
            let samples: Vec<u8> = grid.as_raw().iter().step_by(SAMPLE_STRIDE).copied().collect();
            ImageFingerprint(hex::encode(samples))
        }
        Err(e) => {
            tracing::debug!("Fingerprinting by length, image did not decode: {}", e);
            ImageFingerprint(format!("{}{}", ERROR_PREFIX, bytes.len()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::test_support::{encode, quadrants, solid};
    use image::{DynamicImage, ImageFormat};

    const HEX_LEN: usize = (GRID_SIZE * GRID_SIZE * 4) as usize / SAMPLE_STRIDE * 2;

    #[test]
    fn test_fixed_width() {
        let png = encode(&DynamicImage::ImageRgba8(solid(7, 3, [9, 9, 9, 255])), ImageFormat::Png);
        let fp = fingerprint(&png);
        assert_eq!(fp.as_str().len(), HEX_LEN);
        assert!(!fp.is_fallback());
    }

    #[test]
    fn test_solid_color_scale_invariant() {
        let small = encode(&DynamicImage::ImageRgba8(solid(32, 64, [200, 30, 40, 255])), ImageFormat::Png);
        let large = encode(&DynamicImage::ImageRgba8(solid(640, 320, [200, 30, 40, 255])), ImageFormat::Png);
        assert_eq!(fingerprint(&small), fingerprint(&large));
    }

    #[test]
    fn test_pattern_scale_invariant() {
        let small = encode(&DynamicImage::ImageRgba8(quadrants(64)), ImageFormat::Png);
        let large = encode(&DynamicImage::ImageRgba8(quadrants(256)), ImageFormat::Png);
        assert_eq!(fingerprint(&small), fingerprint(&large));
    }

    #[test]
    fn test_encoding_invariant() {
        let rgb = DynamicImage::ImageRgba8(quadrants(128)).to_rgb8();
        let png = encode(&DynamicImage::ImageRgb8(rgb.clone()), ImageFormat::Png);
        let bmp = encode(&DynamicImage::ImageRgb8(rgb), ImageFormat::Bmp);
        assert_ne!(png, bmp);
        assert_eq!(fingerprint(&png), fingerprint(&bmp));
    }

    #[test]
    fn test_different_content_differs() {
        let red = encode(&DynamicImage::ImageRgba8(solid(32, 32, [255, 0, 0, 255])), ImageFormat::Png);
        let blue = encode(&DynamicImage::ImageRgba8(solid(32, 32, [0, 0, 255, 255])), ImageFormat::Png);
        assert_ne!(fingerprint(&red), fingerprint(&blue));
    }

    #[test]
    fn test_undecodable_falls_back_to_length() {
        let fp = fingerprint(b"0123456789");
        assert_eq!(fp.as_str(), "err_10");
        assert!(fp.is_fallback());
    }
}
