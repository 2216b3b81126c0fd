//! Shared helpers for Office Open XML containers.
//!
//! PPTX, DOCX and XLSX files are ZIP archives of XML parts. Parts are looked up
//! by path, numbered parts (`slide3.xml`, `sheet12.xml`) are ordered by their
//! number, and text is collected from elements matched by namespace and local
//! name so both the transitional and strict schemas are accepted.

use crate::core::mime::is_image_name;
use crate::types::RawImage;
use crate::{Result, ZeichenError};
use regex::Regex;
use roxmltree::{Document, Node};
use std::io::{Cursor, Read};
use zip::ZipArchive;
use zip::result::ZipError;

pub(crate) const DRAWINGML_NS: &[&str] = &[
    "http://schemas.openxmlformats.org/drawingml/2006/main",
    "http://purl.oclc.org/ooxml/drawingml/main",
];

pub(crate) const WORDPROCESSINGML_NS: &[&str] = &[
    "http://schemas.openxmlformats.org/wordprocessingml/2006/main",
    "http://purl.oclc.org/ooxml/wordprocessingml/main",
];

pub(crate) const SPREADSHEETML_NS: &[&str] = &[
    "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
    "http://purl.oclc.org/ooxml/spreadsheetml/main",
];

/// Read access to the parts of an OOXML package held in memory.
pub(crate) struct OoxmlPackage<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> OoxmlPackage<'a> {
    /// Open `content` as a ZIP archive. `kind` names the format in errors.
    pub(crate) fn open(content: &'a [u8], kind: &str) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(content))
            .map_err(|e| ZeichenError::parsing_with_source(format!("Failed to open {} archive", kind), e))?;
        Ok(Self { archive })
    }

    /// Raw bytes of the part at `path`, `None` when it does not exist.
    pub(crate) fn read(&mut self, path: &str) -> Result<Option<Vec<u8>>> {
        match self.archive.by_name(path) {
            Ok(mut file) => {
                let mut buffer = Vec::with_capacity(file.size() as usize);
                file.read_to_end(&mut buffer)?;
                Ok(Some(buffer))
            }
            Err(ZipError::FileNotFound) => Ok(None),
            Err(ZipError::Io(io_err)) => Err(io_err.into()),
            Err(e) => Err(ZeichenError::parsing_with_source(format!("Failed to read {}", path), e)),
        }
    }

    /// Part at `path` decoded as UTF-8.
    pub(crate) fn read_string(&mut self, path: &str) -> Result<Option<String>> {
        match self.read(path)? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| ZeichenError::parsing_with_source(format!("{} is not valid UTF-8", path), e)),
            None => Ok(None),
        }
    }

    /// Paths matching `pattern`, ordered by the number captured in group 1.
    pub(crate) fn numbered_parts(&self, pattern: &Regex) -> Vec<(u32, String)> {
        let mut parts: Vec<(u32, String)> = self
            .archive
            .file_names()
            .filter_map(|name| {
                let number = pattern.captures(name)?.get(1)?.as_str().parse::<u32>().ok()?;
                Some((number, name.to_string()))
            })
            .collect();
        parts.sort();
        parts
    }

    /// Every image stored under `prefix` (e.g. `word/media/`), ordered by path.
    pub(crate) fn images_under(&mut self, prefix: &str) -> Result<Vec<RawImage>> {
        let mut names: Vec<String> = self
            .archive
            .file_names()
            .filter(|name| name.starts_with(prefix) && !name.ends_with('/') && is_image_name(name))
            .map(str::to_string)
            .collect();
        names.sort();

        let mut images = Vec::with_capacity(names.len());
        for name in names {
            if let Some(bytes) = self.read(&name)? {
                images.push(RawImage::new(name, bytes));
            }
        }
        Ok(images)
    }
}

pub(crate) fn parse_xml<'input>(xml: &'input str) -> Result<Document<'input>> {
    Ok(Document::parse(xml)?)
}

/// True if `node` is an element named `local` in one of `namespaces`.
pub(crate) fn is_element(node: &Node<'_, '_>, local: &str, namespaces: &[&str]) -> bool {
    node.is_element()
        && node.tag_name().name() == local
        && node.tag_name().namespace().is_some_and(|ns| namespaces.contains(&ns))
}

/// Text of every `local` element below `root`, empty ones skipped.
pub(crate) fn element_texts<'a>(root: Node<'a, '_>, local: &str, namespaces: &[&str]) -> Vec<&'a str> {
    root.descendants()
        .filter(|n| is_element(n, local, namespaces))
        .filter_map(|n| n.text())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Non-empty texts of `local` elements joined with single spaces.
pub(crate) fn joined_text(root: Node<'_, '_>, local: &str, namespaces: &[&str]) -> String {
    element_texts(root, local, namespaces).join(" ")
}
