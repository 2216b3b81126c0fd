//! Built-in document extractors.
//!
//! Office and PDF extractors are compiled in behind the `office` and `pdf`
//! features; plain text and standalone images are always available. The
//! `pdf-render` feature adds whole-page rendering through pdfium for scanned
//! pages.

use crate::plugins::DocumentExtractor;
use std::sync::Arc;

pub mod image;
pub mod text;

#[cfg(feature = "office")]
pub(crate) mod ooxml;

#[cfg(feature = "office")]
pub mod docx;

#[cfg(feature = "office")]
pub mod pptx;

#[cfg(feature = "office")]
pub mod xlsx;

#[cfg(feature = "pdf")]
pub mod pdf;

#[cfg(feature = "pdf-render")]
pub mod pdfium;

pub use self::image::ImageExtractor;
pub use text::PlainTextExtractor;

#[cfg(feature = "office")]
pub use docx::DocxExtractor;

#[cfg(feature = "office")]
pub use pptx::PptxExtractor;

#[cfg(feature = "office")]
pub use xlsx::XlsxExtractor;

#[cfg(feature = "pdf")]
pub use pdf::{PageRenderer, PdfExtractor};

#[cfg(feature = "pdf-render")]
pub use pdfium::PdfiumRenderer;

/// Every extractor compiled into this build.
pub fn builtin_extractors() -> Vec<Arc<dyn DocumentExtractor>> {
    let mut extractors: Vec<Arc<dyn DocumentExtractor>> =
        vec![Arc::new(PlainTextExtractor::new()), Arc::new(ImageExtractor::new())];

    #[cfg(feature = "office")]
    {
        extractors.push(Arc::new(PptxExtractor::new()));
        extractors.push(Arc::new(DocxExtractor::new()));
        extractors.push(Arc::new(XlsxExtractor::new()));
    }

    #[cfg(feature = "pdf")]
    extractors.push(Arc::new(PdfExtractor::new()));

    extractors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mime::DocumentFormat;

    #[test]
    fn test_builtins_cover_enabled_formats() {
        let formats: Vec<DocumentFormat> = builtin_extractors().iter().map(|e| e.format()).collect();
        assert!(formats.contains(&DocumentFormat::Text));
        assert!(formats.contains(&DocumentFormat::Image));

        #[cfg(feature = "office")]
        for format in [DocumentFormat::Pptx, DocumentFormat::Docx, DocumentFormat::Xlsx] {
            assert!(formats.contains(&format));
        }

        #[cfg(feature = "pdf")]
        assert!(formats.contains(&DocumentFormat::Pdf));
    }
}
