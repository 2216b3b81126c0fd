//! Document extractor trait.

use crate::Result;
use crate::core::config::AnalysisConfig;
use crate::core::mime::DocumentFormat;
use crate::plugins::Plugin;
use crate::types::ExtractedUnit;
use async_trait::async_trait;
use std::path::Path;

/// Splits one container format into structural units.
///
/// Each unit carries its native text and the images attached to it. Mapping
/// images to the right unit (relationship files, page resources) is the
/// extractor's job; everything downstream is format-agnostic.
#[async_trait]
pub trait DocumentExtractor: Plugin {
    async fn extract_units(&self, content: &[u8], config: &AnalysisConfig) -> Result<Vec<ExtractedUnit>>;

    async fn extract_file(&self, path: &Path, config: &AnalysisConfig) -> Result<Vec<ExtractedUnit>> {
        let bytes = crate::core::io::read_file_async(path).await?;
        self.extract_units(&bytes, config).await
    }

    fn format(&self) -> DocumentFormat;

    /// Higher wins when two extractors claim the same format.
    fn priority(&self) -> i32 {
        50
    }
}
