//! PowerPoint (.pptx) extractor.
//!
//! One unit per slide, in slide-number order. Slide text is every non-empty
//! DrawingML `a:t` run joined with single spaces. Images are attached through
//! the slide's relationship part, so a logo placed on ten slides appears in ten
//! units and is recognized once thanks to the document-wide cache.

use super::ooxml::{DRAWINGML_NS, OoxmlPackage, joined_text, parse_xml};
use crate::core::config::AnalysisConfig;
use crate::core::mime::{DocumentFormat, is_image_name};
use crate::plugins::{DocumentExtractor, Plugin};
use crate::types::{ExtractedUnit, RawImage, UnitKind};
use crate::{Result, ZeichenError};
use ahash::{AHashMap, AHashSet};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

static SLIDE_PART: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ppt/slides/slide(\d+)\.xml$").expect("valid regex"));

const MEDIA_TARGET_PREFIX: &str = "../media/";
const MEDIA_DIR: &str = "ppt/media/";

pub struct PptxExtractor;

impl PptxExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PptxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for PptxExtractor {
    fn name(&self) -> &str {
        "pptx-extractor"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn description(&self) -> &str {
        "Per-slide text and relationship-mapped images from PowerPoint presentations"
    }
}

#[async_trait]
impl DocumentExtractor for PptxExtractor {
    async fn extract_units(&self, content: &[u8], _config: &AnalysisConfig) -> Result<Vec<ExtractedUnit>> {
        let mut package = OoxmlPackage::open(content, "PPTX")?;
        let slides = package.numbered_parts(&SLIDE_PART);
        tracing::debug!("PPTX has {} slides", slides.len());

        let mut media: AHashMap<String, Option<Vec<u8>>> = AHashMap::new();
        let mut units = Vec::with_capacity(slides.len());

        for (index, (number, path)) in slides.iter().enumerate() {
            let xml = package
                .read_string(path)?
                .ok_or_else(|| ZeichenError::parsing(format!("Missing slide part {}", path)))?;
            let doc = parse_xml(&xml)?;
            let text = joined_text(doc.root(), "t", DRAWINGML_NS);

            let mut images = Vec::new();
            for name in slide_media_names(&mut package, *number)? {
                if !media.contains_key(&name) {
                    let bytes = package.read(&format!("{}{}", MEDIA_DIR, name))?;
                    media.insert(name.clone(), bytes);
                }
                if let Some(Some(bytes)) = media.get(&name) {
                    images.push(RawImage::new(format!("{}{}", MEDIA_DIR, name), bytes.clone()));
                }
            }

            units.push(ExtractedUnit::new(format!("Slide {}", index + 1), UnitKind::Slide, text).with_images(images));
        }

        Ok(units)
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pptx
    }
}

/// Media file names referenced by `slide<number>.xml`, deduplicated, in
/// relationship order. Only image extensions are kept.
fn slide_media_names(package: &mut OoxmlPackage<'_>, number: u32) -> Result<Vec<String>> {
    let rels_path = format!("ppt/slides/_rels/slide{}.xml.rels", number);
    let Some(rels) = package.read_string(&rels_path)? else {
        return Ok(Vec::new());
    };
    let doc = parse_xml(&rels)?;

    let mut seen = AHashSet::new();
    let names = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "Relationship")
        .filter_map(|n| n.attribute("Target"))
        .filter(|target| target.contains(MEDIA_TARGET_PREFIX))
        .map(|target| target.replace(MEDIA_TARGET_PREFIX, ""))
        .filter(|name| is_image_name(name))
        .filter(|name| seen.insert(name.clone()))
        .collect();
    Ok(names)
}
