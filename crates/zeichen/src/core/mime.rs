//! Format detection from file names.
//!
//! Detection is by extension only and happens before any byte of the document is
//! parsed. Legacy binary office containers get their own rejection so the user
//! is told which modern format to convert to.

use crate::{Result, ZeichenError};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const PLAIN_TEXT_MIME_TYPE: &str = "text/plain";
pub const POWER_POINT_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";
pub const DOCX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const EXCEL_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Container kinds the analyzer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Pptx,
    Docx,
    Xlsx,
    Pdf,
    Text,
    Image,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 6] = [
        DocumentFormat::Pptx,
        DocumentFormat::Docx,
        DocumentFormat::Xlsx,
        DocumentFormat::Pdf,
        DocumentFormat::Text,
        DocumentFormat::Image,
    ];

    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentFormat::Pptx => POWER_POINT_MIME_TYPE,
            DocumentFormat::Docx => DOCX_MIME_TYPE,
            DocumentFormat::Xlsx => EXCEL_MIME_TYPE,
            DocumentFormat::Pdf => PDF_MIME_TYPE,
            DocumentFormat::Text => PLAIN_TEXT_MIME_TYPE,
            DocumentFormat::Image => "image/*",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pptx => "pptx",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Xlsx => "xlsx",
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Text => "text",
            DocumentFormat::Image => "image",
        }
    }

    /// File extensions mapped to this format, lowercase and without the dot.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            DocumentFormat::Pptx => &["pptx"],
            DocumentFormat::Docx => &["docx"],
            DocumentFormat::Xlsx => &["xlsx"],
            DocumentFormat::Pdf => &["pdf"],
            DocumentFormat::Text => &["txt"],
            DocumentFormat::Image => IMAGE_EXTENSIONS,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static EXT_TO_FORMAT: Lazy<HashMap<&'static str, DocumentFormat>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("pptx", DocumentFormat::Pptx);
    m.insert("docx", DocumentFormat::Docx);
    m.insert("xlsx", DocumentFormat::Xlsx);
    m.insert("pdf", DocumentFormat::Pdf);
    m.insert("txt", DocumentFormat::Text);
    for ext in IMAGE_EXTENSIONS {
        m.insert(*ext, DocumentFormat::Image);
    }
    m
});

/// Raster image extensions accepted as standalone input and as embedded media.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "tiff", "webp"];

/// Legacy extension and the format it should be converted to.
pub const LEGACY_EXTENSIONS: &[(&str, &str)] = &[("ppt", "pptx"), ("doc", "docx"), ("xls", "xlsx")];

fn extension_of(path: &Path) -> Option<String> {
    path.extension().and_then(|ext| ext.to_str()).map(|s| s.to_lowercase())
}

/// Whether `name` has one of [`IMAGE_EXTENSIONS`].
pub fn is_image_name(name: &str) -> bool {
    extension_of(Path::new(name)).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Detect the document format of `path` from its extension.
///
/// # Errors
///
/// - `LegacyFormat` for `.ppt`, `.doc` and `.xls`
/// - `UnsupportedFormat` for anything else that is not recognized
pub fn detect_format(path: impl AsRef<Path>) -> Result<DocumentFormat> {
    let path = path.as_ref();
    let Some(extension) = extension_of(path) else {
        return Err(ZeichenError::UnsupportedFormat(format!(
            "Could not determine format of {} (no extension)",
            path.display()
        )));
    };

    if let Some((legacy, modern)) = LEGACY_EXTENSIONS.iter().find(|(legacy, _)| *legacy == extension) {
        return Err(ZeichenError::legacy_format(legacy, modern));
    }

    EXT_TO_FORMAT.get(extension.as_str()).copied().ok_or_else(|| {
        ZeichenError::UnsupportedFormat(format!(
            ".{} files are not supported. Supported formats: PPTX, DOCX, XLSX, PDF, TXT and images ({})",
            extension,
            IMAGE_EXTENSIONS.join(", ")
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_supported_formats() {
        assert_eq!(detect_format("deck.pptx").unwrap(), DocumentFormat::Pptx);
        assert_eq!(detect_format("report.DOCX").unwrap(), DocumentFormat::Docx);
        assert_eq!(detect_format("/tmp/budget.xlsx").unwrap(), DocumentFormat::Xlsx);
        assert_eq!(detect_format("paper.pdf").unwrap(), DocumentFormat::Pdf);
        assert_eq!(detect_format("notes.txt").unwrap(), DocumentFormat::Text);
        for ext in IMAGE_EXTENSIONS {
            assert_eq!(detect_format(format!("scan.{}", ext)).unwrap(), DocumentFormat::Image);
        }
    }

    #[test]
    fn test_legacy_formats_rejected() {
        for (legacy, modern) in LEGACY_EXTENSIONS {
            let err = detect_format(format!("old.{}", legacy)).unwrap_err();
            assert!(matches!(err, ZeichenError::LegacyFormat { .. }));
            assert!(err.to_string().contains(&format!(".{} first", modern)));
        }
    }

    #[test]
    fn test_unknown_extension_unsupported() {
        let err = detect_format("archive.odt").unwrap_err();
        assert!(matches!(err, ZeichenError::UnsupportedFormat(_)));
        assert!(!matches!(err, ZeichenError::LegacyFormat { .. }));
    }

    #[test]
    fn test_missing_extension_unsupported() {
        let err = detect_format("README").unwrap_err();
        assert!(matches!(err, ZeichenError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_is_image_name() {
        assert!(is_image_name("ppt/media/image3.JPEG"));
        assert!(!is_image_name("ppt/media/image3.emf"));
        assert!(!is_image_name("media"));
    }

    #[test]
    fn test_format_display() {
        assert_eq!(DocumentFormat::Xlsx.to_string(), "xlsx");
        assert_eq!(DocumentFormat::Pdf.mime_type(), PDF_MIME_TYPE);
    }

    #[test]
    fn test_extensions_round_trip_through_detection() {
        for format in DocumentFormat::ALL {
            for ext in format.extensions() {
                assert_eq!(detect_format(format!("file.{}", ext)).unwrap(), format);
            }
        }
    }
}
