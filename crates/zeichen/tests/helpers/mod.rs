//! Shared fixtures for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::{Cursor, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use zeichen::ocr::RecognitionRequest;
use zeichen::{AnalysisConfig, Analyzer, Plugin, RecognitionBackend, Result};
use zip::write::{SimpleFileOptions, ZipWriter};

pub const RED: [u8; 4] = [220, 20, 20, 255];
pub const BLUE: [u8; 4] = [20, 20, 220, 255];
pub const WHITE: [u8; 4] = [255, 255, 255, 255];

/// Reads the dominant color of the image it receives: red images say "로고",
/// blue images say "BLUE SKY", anything else says nothing.
pub struct ColorBackend {
    calls: AtomicUsize,
}

impl ColorBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Plugin for ColorBackend {
    fn name(&self) -> &str {
        "color-backend"
    }

    fn version(&self) -> String {
        "1.0.0".to_string()
    }
}

#[async_trait]
impl RecognitionBackend for ColorBackend {
    async fn recognize(&self, image_bytes: &[u8], _request: &RecognitionRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let image = image::load_from_memory(image_bytes)?.to_rgba8();
        let [r, g, b, _] = image.get_pixel(image.width() / 2, image.height() / 2).0;
        let text = if r > 150 && g < 100 && b < 100 {
            "로고"
        } else if b > 150 && r < 100 && g < 100 {
            "BLUE SKY"
        } else {
            ""
        };
        Ok(text.to_string())
    }
}

/// Default configuration with a small rescale target so tests stay fast.
pub fn test_config() -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    config.ocr.target_long_edge = 64;
    config
}

pub fn analyzer(config: AnalysisConfig, backend: Arc<ColorBackend>) -> Analyzer {
    Analyzer::with_backend(config, backend).expect("valid config")
}

pub fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)));
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
}

pub fn jpeg(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color))).to_rgb8();
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut buffer, ImageFormat::Jpeg)
        .unwrap();
    buffer.into_inner()
}

pub fn build_zip(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = SimpleFileOptions::default();
        for (path, bytes) in entries {
            zip.start_file(*path, options).unwrap();
            zip.write_all(bytes).unwrap();
        }
        zip.finish().unwrap();
    }
    buffer
}

pub fn slide_xml(text: &str) -> Vec<u8> {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld><p:spTree><p:sp><p:txBody><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld>
</p:sld>"#,
        text
    )
    .into_bytes()
}

pub fn slide_rels(media: &[&str]) -> Vec<u8> {
    let relationships: String = media
        .iter()
        .enumerate()
        .map(|(i, name)| {
            format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/{}"/>"#,
                i + 2,
                name
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>{}</Relationships>"#,
        relationships
    )
    .into_bytes()
}

pub fn document_xml(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    )
    .into_bytes()
}

/// PDF with one page per `(text, paints_logo)` entry. Every page inherits a
/// resource dictionary holding one uncompressed RGB image; only the pages
/// flagged with `true` paint it.
#[cfg(feature = "pdf")]
pub fn build_pdf(pages: &[(&str, bool)], image_color: [u8; 4]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object, Stream, dictionary};

    let (side, [r, g, b, _]) = (32_i64, image_color);
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => side,
            "Height" => side,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
        },
        [r, g, b].repeat((side * side) as usize),
    ));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
        "XObject" => dictionary! { "Logo" => image_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for (text, paints_logo) in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 18_i64.into()]),
            Operation::new("Td", vec![72_i64.into(), 700_i64.into()]),
            Operation::new("Tj", vec![Object::string_literal(*text)]),
            Operation::new("ET", vec![]),
        ];
        if *paints_logo {
            operations.push(Operation::new("q", vec![]));
            operations.push(Operation::new("Do", vec![Object::Name(b"Logo".to_vec())]));
            operations.push(Operation::new("Q", vec![]));
        }
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
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0_i64.into(), 0_i64.into(), 595_i64.into(), 842_i64.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}
