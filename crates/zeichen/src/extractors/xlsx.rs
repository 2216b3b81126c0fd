//! Excel (.xlsx) extractor.
//!
//! One unit per worksheet in sheet-number order, named from the workbook. Cell
//! values are resolved against the shared string table; formula results of
//! non-numeric types and booleans are not counted. Images under `xl/media/`
//! form one trailing image collection.

use super::ooxml::{OoxmlPackage, SPREADSHEETML_NS, is_element, parse_xml};
use crate::core::config::AnalysisConfig;
use crate::core::mime::DocumentFormat;
use crate::plugins::{DocumentExtractor, Plugin};
use crate::types::{ExtractedUnit, UnitKind};
use crate::{Result, ZeichenError};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use roxmltree::Node;

static SHEET_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^xl/worksheets/sheet(\d+)\.xml$").expect("valid regex"));

const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
const WORKBOOK_PART: &str = "xl/workbook.xml";
const MEDIA_DIR: &str = "xl/media/";

pub struct XlsxExtractor;

impl XlsxExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for XlsxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for XlsxExtractor {
    fn name(&self) -> &str {
        "xlsx-extractor"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn description(&self) -> &str {
        "Per-sheet cell text and embedded media from Excel workbooks"
    }
}

#[async_trait]
impl DocumentExtractor for XlsxExtractor {
    async fn extract_units(&self, content: &[u8], _config: &AnalysisConfig) -> Result<Vec<ExtractedUnit>> {
        let mut package = OoxmlPackage::open(content, "XLSX")?;

        let shared_strings = match package.read_string(SHARED_STRINGS_PART)? {
            Some(xml) => parse_shared_strings(&xml)?,
            None => Vec::new(),
        };
        let sheet_names = match package.read_string(WORKBOOK_PART)? {
            Some(xml) => parse_sheet_names(&xml)?,
            None => Vec::new(),
        };

        let sheets = package.numbered_parts(&SHEET_PART);
        let mut units = Vec::with_capacity(sheets.len() + 1);

        for (index, (_, path)) in sheets.iter().enumerate() {
            let xml = package
                .read_string(path)?
                .ok_or_else(|| ZeichenError::parsing(format!("Missing worksheet part {}", path)))?;
            let text = sheet_text(&xml, &shared_strings)?;
            let label = sheet_names
                .get(index)
                .filter(|name| !name.is_empty())
                .cloned()
                .unwrap_or_else(|| format!("Sheet {}", index + 1));
            units.push(ExtractedUnit::new(label, UnitKind::Sheet, text));
        }

        let images = package.images_under(MEDIA_DIR)?;
        if !images.is_empty() {
            units.push(ExtractedUnit::new("Images", UnitKind::ImageCollection, "").with_images(images));
        }

        Ok(units)
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Xlsx
    }
}

/// Shared string table: every `t` inside each `si`, concatenated.
fn parse_shared_strings(xml: &str) -> Result<Vec<String>> {
    let doc = parse_xml(xml)?;
    Ok(doc
        .descendants()
        .filter(|n| is_element(n, "si", SPREADSHEETML_NS))
        .map(|si| {
            si.descendants()
                .filter(|n| is_element(n, "t", SPREADSHEETML_NS))
                .filter_map(|t| t.text())
                .collect::<String>()
        })
        .collect())
}

/// Sheet names in workbook order.
fn parse_sheet_names(xml: &str) -> Result<Vec<String>> {
    let doc = parse_xml(xml)?;
    Ok(doc
        .descendants()
        .filter(|n| is_element(n, "sheet", SPREADSHEETML_NS))
        .map(|n| n.attribute("name").unwrap_or_default().to_string())
        .collect())
}

fn sheet_text(xml: &str, shared_strings: &[String]) -> Result<String> {
    let doc = parse_xml(xml)?;
    let texts: Vec<&str> = doc
        .descendants()
        .filter(|n| is_element(n, "c", SPREADSHEETML_NS))
        .filter_map(|cell| cell_text(cell, shared_strings))
        .collect();
    Ok(texts.join(" "))
}

/// Display text of one `c` element, if it counts.
///
/// Cells without a `v` child are skipped even when they carry an inline string.
fn cell_text<'a>(cell: Node<'a, '_>, shared_strings: &'a [String]) -> Option<&'a str> {
    let value = first_child_text(cell, "v")?;
    match cell.attribute("t") {
        Some("s") => {
            let index: usize = value.trim().parse().ok()?;
            shared_strings.get(index).map(String::as_str).filter(|s| !s.is_empty())
        }
        Some("inlineStr") => cell
            .descendants()
            .find(|n| is_element(n, "t", SPREADSHEETML_NS))
            .map(|t| t.text().unwrap_or_default()),
        None | Some("n") => Some(value),
        Some(_) => None,
    }
}

fn first_child_text<'a>(node: Node<'a, '_>, local: &str) -> Option<&'a str> {
    let child = node.descendants().find(|n| is_element(n, local, SPREADSHEETML_NS))?;
    Some(child.text().unwrap_or_default())
}
