//! Extractor lookup by format.

use crate::core::mime::DocumentFormat;
use crate::plugins::DocumentExtractor;
use crate::{Result, ZeichenError};
use ahash::AHashMap;
use std::sync::Arc;

/// Extractors keyed by the format they handle.
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    extractors: AHashMap<DocumentFormat, Arc<dyn DocumentExtractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every extractor compiled into this build.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for extractor in crate::extractors::builtin_extractors() {
            if let Err(e) = registry.register(extractor) {
                tracing::warn!("Failed to register built-in extractor: {}", e);
            }
        }
        registry
    }

    /// Register an extractor. An existing extractor for the same format is
    /// replaced only if the new one has a strictly higher priority.
    pub fn register(&mut self, extractor: Arc<dyn DocumentExtractor>) -> Result<()> {
        let name = extractor.name().to_string();
        if name.is_empty() {
            return Err(ZeichenError::validation("Extractor name cannot be empty"));
        }
        extractor.initialize()?;

        let format = extractor.format();
        match self.extractors.get(&format) {
            Some(existing) if existing.priority() >= extractor.priority() => {
                tracing::debug!(
                    "Keeping extractor '{}' for {}, '{}' has lower priority",
                    existing.name(),
                    format,
                    name
                );
            }
            _ => {
                self.extractors.insert(format, extractor);
            }
        }
        Ok(())
    }

    pub fn get(&self, format: DocumentFormat) -> Result<Arc<dyn DocumentExtractor>> {
        self.extractors.get(&format).cloned().ok_or_else(|| {
            ZeichenError::UnsupportedFormat(format!("No extractor available for {} documents", format))
        })
    }

    /// Names of registered extractors, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.extractors.values().map(|e| e.name().to_string()).collect();
        names.sort();
        names
    }

    /// Shut down and drop every extractor.
    pub fn shutdown_all(&mut self) -> Result<()> {
        for (_, extractor) in self.extractors.drain() {
            extractor.shutdown()?;
        }
        Ok(())
    }
}
