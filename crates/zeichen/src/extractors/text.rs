//! Plain text extractor.

use crate::Result;
use crate::core::config::AnalysisConfig;
use crate::core::mime::DocumentFormat;
use crate::plugins::{DocumentExtractor, Plugin};
use crate::types::{ExtractedUnit, UnitKind};
use async_trait::async_trait;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Whole file as a single body unit. A leading byte order mark is dropped and
/// invalid UTF-8 sequences are replaced.
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for PlainTextExtractor {
    fn name(&self) -> &str {
        "plain-text-extractor"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn description(&self) -> &str {
        "Reads plain text files as a single unit"
    }
}

#[async_trait]
impl DocumentExtractor for PlainTextExtractor {
    async fn extract_units(&self, content: &[u8], _config: &AnalysisConfig) -> Result<Vec<ExtractedUnit>> {
        let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
        let text = String::from_utf8_lossy(content).into_owned();
        Ok(vec![ExtractedUnit::new("Body", UnitKind::Body, text)])
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Text
    }
}
