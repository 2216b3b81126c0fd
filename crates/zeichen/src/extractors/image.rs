//! Standalone image extractor.

use crate::Result;
use crate::core::config::AnalysisConfig;
use crate::core::mime::DocumentFormat;
use crate::plugins::{DocumentExtractor, Plugin};
use crate::types::{ExtractedUnit, RawImage, UnitKind};
use async_trait::async_trait;
use std::path::Path;

/// Name given to the image when the file name is not known.
const DEFAULT_IMAGE_NAME: &str = "image";

/// The whole file is one unit with no native text and exactly one image.
///
/// Bytes are not decoded here; an undecodable file still reaches recognition,
/// which degrades to an empty result.
pub struct ImageExtractor;

impl ImageExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for ImageExtractor {
    fn name(&self) -> &str {
        "image-extractor"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn description(&self) -> &str {
        "Treats a PNG, JPEG, GIF, BMP, TIFF or WebP file as a single image unit"
    }
}

#[async_trait]
impl DocumentExtractor for ImageExtractor {
    async fn extract_units(&self, content: &[u8], _config: &AnalysisConfig) -> Result<Vec<ExtractedUnit>> {
        Ok(vec![image_unit(DEFAULT_IMAGE_NAME, content.to_vec())])
    }

    async fn extract_file(&self, path: &Path, _config: &AnalysisConfig) -> Result<Vec<ExtractedUnit>> {
        let bytes = crate::core::io::read_file_async(path).await?;
        let name = crate::core::io::display_file_name(path);
        Ok(vec![image_unit(&name, bytes)])
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Image
    }
}

fn image_unit(name: &str, bytes: Vec<u8>) -> ExtractedUnit {
    ExtractedUnit::new("Image", UnitKind::Image, "").with_images(vec![RawImage::new(name, bytes)])
}
