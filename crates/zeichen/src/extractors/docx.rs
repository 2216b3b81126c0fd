//! Word (.docx) extractor.
//!
//! A document has no page structure in its XML, so the body text becomes a
//! single unit and every image under `word/media/` is gathered into one
//! trailing image collection.

use super::ooxml::{OoxmlPackage, WORDPROCESSINGML_NS, joined_text, parse_xml};
use crate::Result;
use crate::core::config::AnalysisConfig;
use crate::core::mime::DocumentFormat;
use crate::plugins::{DocumentExtractor, Plugin};
use crate::types::{ExtractedUnit, UnitKind};
use async_trait::async_trait;

const DOCUMENT_PART: &str = "word/document.xml";
const MEDIA_DIR: &str = "word/media/";

pub struct DocxExtractor;

impl DocxExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for DocxExtractor {
    fn name(&self) -> &str {
        "docx-extractor"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn description(&self) -> &str {
        "Body text and embedded media from Word documents"
    }
}

#[async_trait]
impl DocumentExtractor for DocxExtractor {
    async fn extract_units(&self, content: &[u8], _config: &AnalysisConfig) -> Result<Vec<ExtractedUnit>> {
        let mut package = OoxmlPackage::open(content, "DOCX")?;
        let mut units = Vec::with_capacity(2);

        if let Some(xml) = package.read_string(DOCUMENT_PART)? {
            let doc = parse_xml(&xml)?;
            let text = joined_text(doc.root(), "t", WORDPROCESSINGML_NS);
            units.push(ExtractedUnit::new("Body", UnitKind::Body, text));
        } else {
            tracing::warn!("DOCX archive has no {}", DOCUMENT_PART);
        }

        let images = package.images_under(MEDIA_DIR)?;
        if !images.is_empty() {
            units.push(ExtractedUnit::new("Images", UnitKind::ImageCollection, "").with_images(images));
        }

        Ok(units)
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }
}
