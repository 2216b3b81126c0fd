//! PDF extractor built on lopdf.
//!
//! One unit per page. Native text comes from the page's content stream. Images
//! are the image XObjects the page actually paints with `Do`, followed into
//! painted form XObjects and looked up through inherited resources. Images that
//! sit in a shared resource dictionary but are never drawn on a page do not
//! belong to it.
//!
//! JPEG streams are passed through untouched. Other 8-bit streams are
//! decompressed and re-encoded as PNG. Each image gets a bounded decode budget
//! so one pathological stream cannot stall the whole document. When a page
//! paints images but none of them can be lifted out (JPEG 2000, CCITT or JBIG2
//! scans), the whole page is rendered instead if a [`PageRenderer`] is
//! configured.

use crate::core::config::AnalysisConfig;
use crate::core::mime::DocumentFormat;
use crate::image::encode_png;
use crate::image::preprocess::flatten_onto_white;
use crate::plugins::{DocumentExtractor, Plugin};
use crate::types::{ExtractedUnit, RawImage, UnitKind};
use crate::{Result, ZeichenError};
use ahash::AHashSet;
use async_trait::async_trait;
use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::sync::Arc;
use std::time::Duration;

/// Images whose width or height is at most this many pixels are ignored.
pub const MIN_IMAGE_SIDE: u32 = 10;

/// Upper bound on decoding a single image.
pub const IMAGE_DECODE_TIMEOUT: Duration = Duration::from_secs(2);

/// Long edge, in pixels, a page render aims for before clamping the scale.
pub const RENDER_TARGET_PIXELS: f32 = 2000.0;
pub const MIN_RENDER_SCALE: f32 = 2.0;
pub const MAX_RENDER_SCALE: f32 = 4.0;

const MAX_RESOURCE_DEPTH: usize = 32;

/// Rasterizes a whole page. Used only for pages whose painted images could
/// not be extracted one by one.
pub trait PageRenderer: Send + Sync {
    fn render_page(&self, pdf: &[u8], page_index: usize) -> Result<DynamicImage>;
}

/// Scale factor for rendering a page of `width` × `height` points.
pub fn render_scale(width: f32, height: f32) -> f32 {
    (RENDER_TARGET_PIXELS / width.max(height)).clamp(MIN_RENDER_SCALE, MAX_RENDER_SCALE)
}

pub struct PdfExtractor {
    renderer: Option<Arc<dyn PageRenderer>>,
}

impl PdfExtractor {
    /// Extractor with the renderer compiled into this build, if any.
    pub fn new() -> Self {
        Self {
            renderer: default_renderer(),
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Never fall back to page renders.
    pub fn without_renderer(mut self) -> Self {
        self.renderer = None;
        self
    }

    async fn render_fallback(&self, pdf: &Arc<[u8]>, page_number: u32) -> Option<RawImage> {
        let Some(renderer) = self.renderer.clone() else {
            tracing::debug!(
                "Page {} paints images that could not be extracted and no page renderer is available",
                page_number
            );
            return None;
        };

        let pdf = Arc::clone(pdf);
        let page_index = page_number.saturating_sub(1) as usize;
        let task = tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
            let page = renderer.render_page(&pdf, page_index)?;
            encode_png(&DynamicImage::ImageRgba8(flatten_onto_white(&page)))
        });

        match task.await {
            Ok(Ok(png)) => {
                tracing::debug!("Rendered page {} for recognition", page_number);
                Some(RawImage::with_mime_type(format!("page{}/render", page_number), png, "image/png"))
            }
            Ok(Err(e)) => {
                tracing::warn!("Failed to render page {}: {}", page_number, e);
                None
            }
            Err(e) => {
                tracing::warn!("Render task for page {} failed: {}", page_number, e);
                None
            }
        }
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "pdf-render")]
fn default_renderer() -> Option<Arc<dyn PageRenderer>> {
    Some(Arc::new(super::pdfium::PdfiumRenderer::new()))
}

#[cfg(not(feature = "pdf-render"))]
fn default_renderer() -> Option<Arc<dyn PageRenderer>> {
    None
}

impl Plugin for PdfExtractor {
    fn name(&self) -> &str {
        "pdf-extractor"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn description(&self) -> &str {
        "Per-page text and painted images from PDF documents"
    }
}

/// An image XObject lifted out of the document, not yet decoded.
#[derive(Debug, Clone)]
struct PdfImageObject {
    name: String,
    width: u32,
    height: u32,
    stream: Stream,
}

#[derive(Debug, Default)]
struct PaintedImages {
    images: Vec<PdfImageObject>,
    /// Image XObjects painted on the page, including ones filtered out.
    painted: usize,
}

#[derive(Debug)]
struct PdfPage {
    number: u32,
    text: String,
    painted: PaintedImages,
}

#[async_trait]
impl DocumentExtractor for PdfExtractor {
    async fn extract_units(&self, content: &[u8], _config: &AnalysisConfig) -> Result<Vec<ExtractedUnit>> {
        let pdf: Arc<[u8]> = Arc::from(content);
        let source = Arc::clone(&pdf);
        let pages = tokio::task::spawn_blocking(move || load_pages(&source))
            .await
            .map_err(|e| ZeichenError::parsing_with_source("PDF parsing task failed", e))??;

        let mut units = Vec::with_capacity(pages.len());
        for page in pages {
            let painted = page.painted.painted;
            let mut images = Vec::with_capacity(page.painted.images.len());
            for object in page.painted.images {
                if let Some(image) = decode_with_budget(object).await {
                    images.push(image);
                }
            }
            if images.is_empty()
                && painted > 0
                && let Some(render) = self.render_fallback(&pdf, page.number).await
            {
                images.push(render);
            }
            units.push(ExtractedUnit::new(format!("Page {}", page.number), UnitKind::Page, page.text).with_images(images));
        }
        Ok(units)
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }
}

fn load_pages(bytes: &[u8]) -> Result<Vec<PdfPage>> {
    let doc = Document::load_mem(bytes)?;
    let pages = doc.get_pages();
    tracing::debug!("PDF has {} pages", pages.len());

    let mut result = Vec::with_capacity(pages.len());
    for (number, page_id) in pages {
        let text = doc.extract_text(&[number]).unwrap_or_else(|e| {
            tracing::warn!("Failed to extract text from page {}: {}", number, e);
            String::new()
        });
        let painted = page_images(&doc, number, page_id);
        result.push(PdfPage { number, text, painted });
    }
    Ok(result)
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> lopdf::Result<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id),
        other => Ok(other),
    }
}

fn xobject_dict<'a>(doc: &'a Document, owner: &'a Dictionary) -> lopdf::Result<&'a Dictionary> {
    owner
        .get(b"Resources")
        .and_then(|r| resolve(doc, r))
        .and_then(Object::as_dict)
        .and_then(|r| r.get(b"XObject"))
        .and_then(|x| resolve(doc, x))
        .and_then(Object::as_dict)
}

/// The `XObject` dictionary in effect for `page_id`, walking up the page tree.
fn inherited_xobjects(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = doc.get_dictionary(page_id).ok();
    for _ in 0..MAX_RESOURCE_DEPTH {
        let dict = node?;
        if let Ok(xobjects) = xobject_dict(doc, dict) {
            return Some(xobjects);
        }
        node = dict
            .get(b"Parent")
            .and_then(Object::as_reference)
            .and_then(|id| doc.get_dictionary(id))
            .ok();
    }
    None
}

/// Operand names of the `Do` operators in `content`, first occurrence only.
fn painted_names(content: &Content) -> Vec<Vec<u8>> {
    let mut names: Vec<Vec<u8>> = Vec::new();
    for operation in &content.operations {
        if operation.operator != "Do" {
            continue;
        }
        if let Some(Ok(name)) = operation.operands.first().map(Object::as_name)
            && !names.iter().any(|seen| seen == name)
        {
            names.push(name.to_vec());
        }
    }
    names
}

fn stream_data(stream: &Stream) -> lopdf::Result<Vec<u8>> {
    if stream.dict.has(b"Filter") {
        stream.decompressed_content()
    } else {
        Ok(stream.content.clone())
    }
}

fn page_images(doc: &Document, page_number: u32, page_id: ObjectId) -> PaintedImages {
    let mut found = PaintedImages::default();
    let content = match doc.get_and_decode_page_content(page_id) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Failed to parse content of page {}: {}", page_number, e);
            return found;
        }
    };
    if let Some(xobjects) = inherited_xobjects(doc, page_id) {
        let mut visited = AHashSet::new();
        collect_painted(doc, &content, xobjects, page_number, "", 0, &mut visited, &mut found);
    }
    found
}

#[allow(clippy::too_many_arguments)]
fn collect_painted<'a>(
    doc: &'a Document,
    content: &Content,
    xobjects: &'a Dictionary,
    page_number: u32,
    prefix: &str,
    depth: usize,
    visited: &mut AHashSet<ObjectId>,
    found: &mut PaintedImages,
) {
    if depth >= MAX_RESOURCE_DEPTH {
        return;
    }

    for key in painted_names(content) {
        let name = format!("{}{}", prefix, String::from_utf8_lossy(&key));
        let Ok(value) = xobjects.get(&key) else {
            tracing::debug!("Page {} paints {} which is missing from its resources", page_number, name);
            continue;
        };
        if let Object::Reference(id) = value
            && !visited.insert(*id)
        {
            continue;
        }
        let Ok(stream) = resolve(doc, value).and_then(Object::as_stream) else {
            continue;
        };

        match stream.dict.get(b"Subtype").and_then(Object::as_name) {
            Ok(b"Image") => {
                found.painted += 1;
                let width = dimension(doc, &stream.dict, b"Width");
                let height = dimension(doc, &stream.dict, b"Height");
                if width <= MIN_IMAGE_SIDE || height <= MIN_IMAGE_SIDE {
                    tracing::debug!("Skipping {}x{} image {} on page {}", width, height, name, page_number);
                    continue;
                }
                found.images.push(PdfImageObject {
                    name: format!("page{}/{}", page_number, name),
                    width,
                    height,
                    stream: stream.clone(),
                });
            }
            Ok(b"Form") => {
                let form_content = match stream_data(stream).and_then(|data| Content::decode(&data)) {
                    Ok(content) => content,
                    Err(e) => {
                        tracing::debug!("Skipping form {} on page {}: {}", name, page_number, e);
                        continue;
                    }
                };
                // Forms without their own resources draw from the page's.
                let nested = xobject_dict(doc, &stream.dict).unwrap_or(xobjects);
                let prefix = format!("{}/", name);
                collect_painted(doc, &form_content, nested, page_number, &prefix, depth + 1, visited, found);
            }
            _ => {}
        }
    }
}

fn dimension(doc: &Document, dict: &Dictionary, key: &[u8]) -> u32 {
    dict.get(key)
        .and_then(|v| resolve(doc, v))
        .and_then(Object::as_i64)
        .ok()
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

fn filter_names(dict: &Dictionary) -> Vec<Vec<u8>> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(items)) => items.iter().filter_map(|o| o.as_name().ok()).map(<[u8]>::to_vec).collect(),
        _ => Vec::new(),
    }
}

async fn decode_with_budget(object: PdfImageObject) -> Option<RawImage> {
    let name = object.name.clone();
    let task = tokio::task::spawn_blocking(move || encode_pdf_image(&object));

    match tokio::time::timeout(IMAGE_DECODE_TIMEOUT, task).await {
        Ok(Ok(Ok(image))) => image,
        Ok(Ok(Err(e))) => {
            tracing::warn!("Failed to decode PDF image {}: {}", name, e);
            None
        }
        Ok(Err(e)) => {
            tracing::warn!("PDF image task for {} failed: {}", name, e);
            None
        }
        Err(_) => {
            tracing::warn!("Timed out decoding PDF image {} after {:?}", name, IMAGE_DECODE_TIMEOUT);
            None
        }
    }
}

/// Turn an image XObject into bytes the image pipeline can decode.
///
/// Returns `Ok(None)` for encodings that are skipped rather than failed:
/// JPEG 2000, CCITT and JBIG2 streams, and sample layouts other than 8-bit
/// gray, RGB or CMYK.
fn encode_pdf_image(object: &PdfImageObject) -> Result<Option<RawImage>> {
    let filters = filter_names(&object.stream.dict);

    if filters.len() == 1 && filters[0] == b"DCTDecode" {
        return Ok(Some(RawImage::with_mime_type(
            object.name.clone(),
            object.stream.content.clone(),
            "image/jpeg",
        )));
    }
    if let Some(filter) = filters
        .iter()
        .find(|f| matches!(f.as_slice(), b"DCTDecode" | b"JPXDecode" | b"CCITTFaxDecode" | b"JBIG2Decode"))
    {
        tracing::debug!(
            "Skipping {} encoded with {}",
            object.name,
            String::from_utf8_lossy(filter)
        );
        return Ok(None);
    }

    let bits = object
        .stream
        .dict
        .get(b"BitsPerComponent")
        .and_then(Object::as_i64)
        .unwrap_or(8);
    if bits != 8 {
        tracing::debug!("Skipping {} with {} bits per component", object.name, bits);
        return Ok(None);
    }

    let samples = if filters.is_empty() {
        object.stream.content.clone()
    } else {
        object.stream.decompressed_content()?
    };

    let Some(image) = samples_to_image(object.width, object.height, samples) else {
        tracing::debug!("Skipping {} with unsupported sample layout", object.name);
        return Ok(None);
    };
    let png = encode_png(&image)?;
    Ok(Some(RawImage::with_mime_type(object.name.clone(), png, "image/png")))
}

/// Build an image from raw 8-bit samples, inferring the channel count from the
/// buffer size.
fn samples_to_image(width: u32, height: u32, mut samples: Vec<u8>) -> Option<DynamicImage> {
    let pixels = width as usize * height as usize;
    if pixels == 0 || samples.len() < pixels {
        return None;
    }
    let components = samples.len() / pixels;
    samples.truncate(pixels * components);

    match components {
        1 => GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8),
        4 => {
            let rgb: Vec<u8> = samples
                .chunks_exact(4)
                .flat_map(|p| {
                    let k = 255 - p[3] as u16;
                    [p[0], p[1], p[2]].map(|c| ((255 - c as u16) * k / 255) as u8)
                })
                .collect();
            RgbImage::from_raw(width, height, rgb).map(DynamicImage::ImageRgb8)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::load_image;
    use image::{GenericImageView, RgbaImage};
    use lopdf::content::Operation;
    use lopdf::dictionary;
    use parking_lot::Mutex;

    fn image_stream(width: i64, height: i64, fill: u8) -> Stream {
        Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8_i64,
            },
            vec![fill; (width * height) as usize],
        )
    }

    fn jpx_stream(side: i64) -> Stream {
        let mut stream = image_stream(side, side, 0);
        stream.dict.set("Filter", "JPXDecode");
        stream.content = b"\x00\x00\x00\x0cjP  jpx".to_vec();
        stream
    }

    fn paint(names: &[&str]) -> Vec<Operation> {
        names
            .iter()
            .flat_map(|name| {
                [
                    Operation::new("q", vec![]),
                    Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
                    Operation::new("Q", vec![]),
                ]
            })
            .collect()
    }

    /// Pages of `(text, painted XObject names)` sharing one resource
    /// dictionary on the page tree root.
    fn build_pdf(xobjects: impl FnOnce(&mut Document) -> Dictionary, pages: &[(&str, &[&str])]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let xobjects = xobjects(&mut doc);
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
            "XObject" => xobjects,
        });

        let mut kids: Vec<Object> = Vec::new();
        for (text, painted) in pages {
            let mut operations = vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24_i64.into()]),
                Operation::new("Td", vec![100_i64.into(), 600_i64.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ];
            operations.extend(paint(painted));
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0_i64.into(), 0_i64.into(), 595_i64.into(), 842_i64.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    /// A 20x20 photo, a 4x4 icon, a form wrapping a second image and an image
    /// no page paints.
    fn sample_pdf() -> Vec<u8> {
        build_pdf(
            |doc| {
                let photo_id = doc.add_object(image_stream(20, 20, 90));
                let icon_id = doc.add_object(image_stream(4, 4, 10));
                let inner_id = doc.add_object(image_stream(16, 12, 200));
                let unused_id = doc.add_object(image_stream(30, 30, 50));
                let form_content = Content { operations: paint(&["Inner"]) };
                let form_id = doc.add_object(Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Form",
                        "Resources" => dictionary! { "XObject" => dictionary! { "Inner" => inner_id } },
                    },
                    form_content.encode().unwrap(),
                ));
                dictionary! {
                    "Photo" => photo_id,
                    "Icon" => icon_id,
                    "Wrapper" => form_id,
                    "Unused" => unused_id,
                }
            },
            &[
                ("Hello", &["Photo", "Icon", "Wrapper", "Photo"]),
                ("Again", &["Photo"]),
                ("Plain", &[]),
            ],
        )
    }

    fn image_names(unit: &ExtractedUnit) -> Vec<&str> {
        let mut names: Vec<&str> = unit.images.iter().map(|i| i.name.as_str()).collect();
        names.sort();
        names
    }

    /// Returns a transparent canvas and records which pages were rendered.
    struct CanvasRenderer {
        rendered: Mutex<Vec<usize>>,
        fail: bool,
    }

    impl CanvasRenderer {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                rendered: Mutex::new(Vec::new()),
                fail,
            })
        }
    }

    impl PageRenderer for CanvasRenderer {
        fn render_page(&self, _pdf: &[u8], page_index: usize) -> Result<DynamicImage> {
            self.rendered.lock().push(page_index);
            if self.fail {
                return Err(ZeichenError::image_processing("renderer out of memory"));
            }
            Ok(DynamicImage::ImageRgba8(RgbaImage::new(50, 30)))
        }
    }

    /// Page 1 paints only a JPEG 2000 scan, page 2 the scan and a photo,
    /// page 3 nothing.
    fn scanned_pdf() -> Vec<u8> {
        build_pdf(
            |doc| {
                let scan_id = doc.add_object(jpx_stream(40));
                let photo_id = doc.add_object(image_stream(20, 20, 90));
                dictionary! { "Scan" => scan_id, "Photo" => photo_id }
            },
            &[("Scanned", &["Scan"]), ("Mixed", &["Scan", "Photo"]), ("Text", &[])],
        )
    }

    #[tokio::test]
    async fn test_pages_text_and_painted_images() {
        let units = PdfExtractor::new()
            .without_renderer()
            .extract_units(&sample_pdf(), &AnalysisConfig::default())
            .await
            .unwrap();

        assert_eq!(units.len(), 3);
        assert_eq!(units[0].label, "Page 1");
        assert_eq!(units[2].label, "Page 3");
        assert_eq!(units[0].kind, UnitKind::Page);
        assert!(units[0].native_text.contains("Hello"));
        assert!(units[1].native_text.contains("Again"));

        assert_eq!(image_names(&units[0]), ["page1/Photo", "page1/Wrapper/Inner"]);
        assert_eq!(image_names(&units[1]), ["page2/Photo"]);
        assert!(units[2].images.is_empty());

        let photo = &units[1].images[0];
        assert_eq!(photo.mime_type, "image/png");
        let decoded = load_image(&photo.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (20, 20));
    }

    #[tokio::test]
    async fn test_shared_resources_do_not_leak_onto_pages() {
        let units = PdfExtractor::new()
            .without_renderer()
            .extract_units(&sample_pdf(), &AnalysisConfig::default())
            .await
            .unwrap();

        for unit in &units {
            assert!(unit.images.iter().all(|i| !i.name.contains("Unused")), "{:?}", image_names(unit));
        }
    }

    #[tokio::test]
    async fn test_unextractable_page_is_rendered() {
        let renderer = CanvasRenderer::new(false);
        let units = PdfExtractor::new()
            .with_renderer(renderer.clone())
            .extract_units(&scanned_pdf(), &AnalysisConfig::default())
            .await
            .unwrap();

        assert_eq!(image_names(&units[0]), ["page1/render"]);
        assert_eq!(image_names(&units[1]), ["page2/Photo"]);
        assert!(units[2].images.is_empty());
        assert_eq!(*renderer.rendered.lock(), [0]);

        let render = &units[0].images[0];
        assert_eq!(render.mime_type, "image/png");
        let decoded = load_image(&render.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (50, 30));
        assert_eq!(decoded.to_rgba8().get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[tokio::test]
    async fn test_unextractable_page_without_renderer_has_no_images() {
        let units = PdfExtractor::new()
            .without_renderer()
            .extract_units(&scanned_pdf(), &AnalysisConfig::default())
            .await
            .unwrap();
        assert!(units[0].images.is_empty());
        assert_eq!(image_names(&units[1]), ["page2/Photo"]);
    }

    #[tokio::test]
    async fn test_render_failure_is_not_fatal() {
        let renderer = CanvasRenderer::new(true);
        let units = PdfExtractor::new()
            .with_renderer(renderer.clone())
            .extract_units(&scanned_pdf(), &AnalysisConfig::default())
            .await
            .unwrap();
        assert_eq!(units.len(), 3);
        assert!(units[0].images.is_empty());
        assert_eq!(renderer.rendered.lock().len(), 1);
    }

    #[test]
    fn test_painted_names_keep_first_occurrence() {
        let mut operations = paint(&["B", "A", "B"]);
        operations.push(Operation::new("Do", vec![]));
        operations.push(Operation::new("Tj", vec![Object::Name(b"C".to_vec())]));
        let names = painted_names(&Content { operations });
        assert_eq!(names, [b"B".to_vec(), b"A".to_vec()]);
    }

    #[test]
    fn test_render_scale_bounds() {
        assert!((render_scale(595.0, 842.0) - 2000.0 / 842.0).abs() < 1e-4);
        assert_eq!(render_scale(200.0, 100.0), MAX_RENDER_SCALE);
        assert_eq!(render_scale(2000.0, 3000.0), MIN_RENDER_SCALE);
    }

    #[tokio::test]
    async fn test_invalid_pdf_is_parsing_error() {
        let err = PdfExtractor::new()
            .extract_units(b"%PDF-1.7 garbage", &AnalysisConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ZeichenError::Parsing { .. }));
    }

    #[test]
    fn test_jpeg_passes_through() {
        let mut stream = image_stream(32, 32, 0);
        stream.dict.set("Filter", "DCTDecode");
        stream.content = b"\xFF\xD8jpeg".to_vec();
        let object = PdfImageObject {
            name: "page1/Im0".to_string(),
            width: 32,
            height: 32,
            stream,
        };

        let image = encode_pdf_image(&object).unwrap().unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.bytes, b"\xFF\xD8jpeg");
    }

    #[test]
    fn test_unsupported_encodings_are_skipped() {
        let mut stream = image_stream(32, 32, 0);
        stream.dict.set("Filter", "JPXDecode");
        let object = PdfImageObject {
            name: "page1/Im0".to_string(),
            width: 32,
            height: 32,
            stream,
        };
        assert!(encode_pdf_image(&object).unwrap().is_none());
    }

    #[test]
    fn test_samples_to_image_channels() {
        assert!(matches!(samples_to_image(2, 2, vec![0; 4]), Some(DynamicImage::ImageLuma8(_))));
        assert!(matches!(samples_to_image(2, 2, vec![0; 12]), Some(DynamicImage::ImageRgb8(_))));
        assert!(samples_to_image(2, 2, vec![0; 8]).is_none());
        assert!(samples_to_image(2, 2, vec![0; 3]).is_none());

        let white = samples_to_image(1, 1, vec![0, 0, 0, 0]).unwrap();
        assert_eq!(white.to_rgb8().get_pixel(0, 0).0, [255, 255, 255]);
        let black = samples_to_image(1, 1, vec![0, 0, 0, 255]).unwrap();
        assert_eq!(black.to_rgb8().get_pixel(0, 0).0, [0, 0, 0]);
    }

    #[test]
    fn test_plugin_interface() {
        let extractor = PdfExtractor::default();
        assert_eq!(extractor.name(), "pdf-extractor");
        assert_eq!(extractor.format(), DocumentFormat::Pdf);
    }
}
