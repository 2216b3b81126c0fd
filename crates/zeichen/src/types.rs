use serde::{Deserialize, Serialize};

use crate::core::mime::DocumentFormat;
use crate::text::escape_html;

/// An image pulled out of a document, still in its encoded form.
///
/// `name` is unique within the document it came from (for archives this is the
/// entry path, for PDFs the page and XObject name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub name: String,
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl RawImage {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime_type = mime_guess::from_path(&name).first_or_octet_stream().essence_str().to_string();
        Self { name, bytes, mime_type }
    }

    pub fn with_mime_type(name: impl Into<String>, bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// What kind of structural unit an [`ExtractedUnit`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Slide,
    Page,
    Sheet,
    Body,
    Image,
    /// Images of a container that has no finer structure to attach them to.
    /// Dropped from the analysis when recognition yields nothing.
    ImageCollection,
}

/// One structural unit as produced by an extractor, before recognition.
#[derive(Debug, Clone)]
pub struct ExtractedUnit {
    pub label: String,
    pub kind: UnitKind,
    pub native_text: String,
    pub images: Vec<RawImage>,
}

impl ExtractedUnit {
    pub fn new(label: impl Into<String>, kind: UnitKind, native_text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind,
            native_text: native_text.into(),
            images: Vec::new(),
        }
    }

    pub fn with_images(mut self, images: Vec<RawImage>) -> Self {
        self.images = images;
        self
    }
}

/// Counts for one slide, page, sheet or whole-document segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitAnalysis {
    pub label: String,
    pub kind: UnitKind,
    pub native_text_char_count: usize,
    pub recognized_text: String,
    pub recognized_char_count: usize,
    pub image_count: usize,
    pub whitespace_count: usize,
}

impl UnitAnalysis {
    pub fn total_char_count(&self) -> usize {
        self.native_text_char_count + self.recognized_char_count
    }

    /// Recognized text escaped for embedding in HTML.
    pub fn recognized_text_html(&self) -> String {
        escape_html(&self.recognized_text)
    }
}

/// Recognition cache counters for one analysis run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

/// Result of analyzing one document.
///
/// Totals are always derived from `units`; build through
/// [`DocumentAnalysis::from_units`] so `total_chars` equals both
/// `total_native_text_chars + total_recognized_chars` and the sum of
/// per-unit totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub file_name: String,
    pub format: DocumentFormat,
    pub units: Vec<UnitAnalysis>,
    pub total_native_text_chars: usize,
    pub total_recognized_chars: usize,
    pub total_chars: usize,
    pub total_whitespace: usize,
    pub cache_stats: CacheStats,
}

impl DocumentAnalysis {
    pub fn from_units(
        file_name: impl Into<String>,
        format: DocumentFormat,
        units: Vec<UnitAnalysis>,
        cache_stats: CacheStats,
    ) -> Self {
        let total_native_text_chars = units.iter().map(|u| u.native_text_char_count).sum::<usize>();
        let total_recognized_chars = units.iter().map(|u| u.recognized_char_count).sum::<usize>();
        let total_whitespace = units.iter().map(|u| u.whitespace_count).sum();

        Self {
            file_name: file_name.into(),
            format,
            units,
            total_native_text_chars,
            total_recognized_chars,
            total_chars: total_native_text_chars + total_recognized_chars,
            total_whitespace,
            cache_stats,
        }
    }

    pub fn total_images(&self) -> usize {
        self.units.iter().map(|u| u.image_count).sum()
    }
}
