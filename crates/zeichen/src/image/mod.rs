//! Image pipeline: decoding, normalization, preprocessing and fingerprinting.

pub mod fingerprint;
pub mod normalize;
pub mod preprocess;

pub use fingerprint::{ImageFingerprint, fingerprint};
pub use normalize::{normalize, normalize_bytes};
pub use preprocess::{Capabilities, ImagePreprocessor, PreprocessingOptions, PreprocessingStage, preprocess};

use crate::{Result, ZeichenError};
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

/// Decode image bytes, sniffing the format from the content.
pub fn load_image(bytes: &[u8]) -> Result<DynamicImage> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ZeichenError::image_processing_with_source("Failed to read image format", e))?;

    if reader.format().is_none() {
        return Err(ZeichenError::image_processing("Could not determine image format"));
    }

    reader
        .decode()
        .map_err(|e| ZeichenError::image_processing_with_source("Failed to decode image", e))
}

/// Encode as PNG, the lossless format handed to recognition backends.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}
