//! Page rendering through the system pdfium library.
//!
//! The library is loaded lazily. Whether it can be bound is checked once per
//! process; every render then binds afresh so no pdfium handle outlives a call.

use super::pdf::{PageRenderer, render_scale};
use crate::{Result, ZeichenError};
use image::DynamicImage;
use once_cell::sync::Lazy;
use pdfium_render::prelude::{PdfRenderConfig, Pdfium};

static PDFIUM_AVAILABILITY: Lazy<std::result::Result<(), String>> =
    Lazy::new(|| Pdfium::bind_to_system_library().map(|_| ()).map_err(|e| e.to_string()));

/// Renders pages with pdfium. Pages come back at two to four times their point size.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfiumRenderer;

impl PdfiumRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Whether the pdfium shared library can be loaded.
    pub fn is_available() -> bool {
        PDFIUM_AVAILABILITY.is_ok()
    }

    fn bind() -> Result<Pdfium> {
        if let Err(e) = &*PDFIUM_AVAILABILITY {
            return Err(ZeichenError::MissingDependency(format!("pdfium library not found: {}", e)));
        }
        let bindings = Pdfium::bind_to_system_library()
            .map_err(|e| ZeichenError::MissingDependency(format!("Failed to bind pdfium: {}", e)))?;
        Ok(Pdfium::new(bindings))
    }
}

impl PageRenderer for PdfiumRenderer {
    fn render_page(&self, pdf: &[u8], page_index: usize) -> Result<DynamicImage> {
        let pdfium = Self::bind()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf, None)
            .map_err(|e| ZeichenError::parsing(format!("pdfium could not open the document: {}", e)))?;

        let index = u16::try_from(page_index)
            .map_err(|_| ZeichenError::validation(format!("Page index {} is out of range", page_index)))?;
        let page = document
            .pages()
            .get(index)
            .map_err(|e| ZeichenError::parsing(format!("Page {} not found: {}", page_index + 1, e)))?;

        let width = page.width().value;
        let height = page.height().value;
        let scale = render_scale(width, height);
        let config = PdfRenderConfig::new()
            .set_target_width(((width * scale) as i32).max(1))
            .set_target_height(((height * scale) as i32).max(1));

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| ZeichenError::image_processing(format!("Failed to render page {}: {}", page_index + 1, e)))?;
        Ok(bitmap.as_image())
    }
}
