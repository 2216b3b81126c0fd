//! Main analysis entry points.
//!
//! An [`Analyzer`] ties the pieces together for one configuration: it rejects
//! unsupported input by extension, hands the container to the matching
//! extractor, runs every unit's images through the [`OcrOrchestrator`] with a
//! single run-scoped cache and folds the counts into a [`DocumentAnalysis`].
//!
//! Progress is reported on a 0–100 scale: extraction takes the first 10%, the
//! units share 10–95% evenly and 100 marks completion.

use crate::core::config::{AnalysisConfig, DedupScope, OcrConfig};
use crate::core::io::{display_file_name, validate_file_exists};
use crate::core::mime::{DocumentFormat, detect_format};
use crate::ocr::{OcrOrchestrator, ProgressScope, RecognitionCache, TesseractBackend, UnitRecognition};
use crate::plugins::{ExtractorRegistry, RecognitionBackend};
use crate::text::{count_whitespace, count_with_mode};
use crate::types::{DocumentAnalysis, ExtractedUnit, UnitAnalysis, UnitKind};
use crate::{Result, ZeichenError};
use once_cell::sync::Lazy;
use std::path::Path;
use std::sync::Arc;

const EXTRACTION_SHARE: f32 = 0.10;
const UNITS_END: f32 = 0.95;

/// Runtime backing the `_sync` wrappers.
///
/// Creation only fails when the process cannot spawn threads at all, in which
/// case nothing else would work either.
static GLOBAL_RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create global Tokio runtime - system may be out of resources")
});

/// Build the recognition backend named by `config.backend`.
pub fn backend_from_config(config: &OcrConfig) -> Result<Arc<dyn RecognitionBackend>> {
    match config.backend.trim().to_ascii_lowercase().as_str() {
        "tesseract" => Ok(Arc::new(TesseractBackend::from_config(config))),
        other => Err(ZeichenError::validation(format!(
            "Unknown OCR backend '{}'. Available backends: tesseract",
            other
        ))),
    }
}

/// Analyzes documents with a fixed configuration, extractor set and backend.
#[derive(Clone)]
pub struct Analyzer {
    config: AnalysisConfig,
    registry: ExtractorRegistry,
    backend: Arc<dyn RecognitionBackend>,
}

impl Analyzer {
    /// Analyzer with the built-in extractors and the backend named in `config`.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        let backend = backend_from_config(&config.ocr)?;
        Self::with_backend(config, backend)
    }

    /// Analyzer with the built-in extractors and a caller-supplied backend.
    pub fn with_backend(config: AnalysisConfig, backend: Arc<dyn RecognitionBackend>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry: ExtractorRegistry::with_builtins(),
            backend,
        })
    }

    /// Replace the extractor set.
    pub fn with_registry(mut self, registry: ExtractorRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    pub fn backend(&self) -> &Arc<dyn RecognitionBackend> {
        &self.backend
    }

    /// Analyze the file at `path`.
    ///
    /// The format is decided from the extension before the file is opened, so
    /// legacy and unsupported files are rejected without being read.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn analyze_file(&self, path: impl AsRef<Path>, progress: &ProgressScope) -> Result<DocumentAnalysis> {
        let path = path.as_ref();
        let format = detect_format(path)?;
        validate_file_exists(path)?;
        let extractor = self.registry.get(format)?;
        let file_name = display_file_name(path);

        tracing::debug!("Analyzing {} as {} with '{}'", path.display(), format, extractor.name());
        progress.report(0.0, format!("Reading {}", file_name));
        let units = extractor.extract_file(path, &self.config).await?;

        self.analyze_units(file_name, format, units, progress).await
    }

    /// Analyze an in-memory document. `file_name` only supplies the extension
    /// and the name shown in the result.
    #[tracing::instrument(skip(self, content, progress), fields(size_bytes = content.len()))]
    pub async fn analyze_bytes(
        &self,
        content: &[u8],
        file_name: &str,
        progress: &ProgressScope,
    ) -> Result<DocumentAnalysis> {
        let format = detect_format(file_name)?;
        let extractor = self.registry.get(format)?;

        tracing::debug!("Analyzing {} bytes as {} with '{}'", content.len(), format, extractor.name());
        progress.report(0.0, format!("Reading {}", file_name));
        let units = extractor.extract_units(content, &self.config).await?;

        self.analyze_units(file_name.to_string(), format, units, progress).await
    }

    async fn analyze_units(
        &self,
        file_name: String,
        format: DocumentFormat,
        units: Vec<ExtractedUnit>,
        progress: &ProgressScope,
    ) -> Result<DocumentAnalysis> {
        let total = units.len();
        let image_total: usize = units.iter().map(|u| u.images.len()).sum();
        progress.report(EXTRACTION_SHARE, format!("Found {} units with {} images", total, image_total));

        let orchestrator = self.orchestrator(image_total).await;
        let include_whitespace = self.config.include_whitespace_in_totals;
        let units_scope = progress.sub_scope(EXTRACTION_SHARE, UNITS_END);

        let mut cache = RecognitionCache::new();
        let mut unit_scoped_entries = 0;
        let mut analyses = Vec::with_capacity(total);

        for (index, unit) in units.into_iter().enumerate() {
            let scope = units_scope.sub_scope(index as f32 / total as f32, (index + 1) as f32 / total as f32);

            let recognition = match &orchestrator {
                Some(orchestrator) => match self.config.ocr.dedup_scope {
                    DedupScope::Document => orchestrator.recognize_unit(&unit.images, &mut cache, &scope).await,
                    DedupScope::Unit => {
                        let mut local = RecognitionCache::new();
                        let recognition = orchestrator.recognize_unit(&unit.images, &mut local, &scope).await;
                        cache.absorb_stats(&local);
                        unit_scoped_entries += local.len();
                        recognition
                    }
                },
                None => UnitRecognition::default(),
            };

            if unit.kind == UnitKind::ImageCollection && recognition.char_count == 0 {
                tracing::debug!("Dropping '{}': no text recognized in {} images", unit.label, unit.images.len());
                scope.report(1.0, format!("Skipped {}", unit.label));
                continue;
            }

            let analysis = unit_analysis(unit, recognition, include_whitespace);
            scope.report(1.0, format!("Analyzed {}", analysis.label));
            analyses.push(analysis);
        }

        let mut cache_stats = cache.stats();
        cache_stats.entries += unit_scoped_entries;

        let analysis = DocumentAnalysis::from_units(file_name, format, analyses, cache_stats);
        progress.report(1.0, "Analysis complete");

        tracing::info!(
            file = %analysis.file_name,
            format = %analysis.format,
            units = analysis.units.len(),
            native_chars = analysis.total_native_text_chars,
            recognized_chars = analysis.total_recognized_chars,
            total_chars = analysis.total_chars,
            cache_hits = analysis.cache_stats.hits,
            "Document analyzed"
        );
        Ok(analysis)
    }

    /// Orchestrator for this run, or `None` when recognition is disabled,
    /// pointless or impossible.
    async fn orchestrator(&self, image_total: usize) -> Option<OcrOrchestrator> {
        if !self.config.ocr.enabled {
            tracing::debug!("OCR disabled, embedded images are not recognized");
            return None;
        }
        if image_total == 0 {
            return None;
        }
        if !self.backend.is_available().await {
            tracing::warn!(
                "OCR backend '{}' is not available, {} embedded images count as zero characters",
                self.backend.name(),
                image_total
            );
            return None;
        }
        Some(OcrOrchestrator::new(Arc::clone(&self.backend), &self.config))
    }
}

fn unit_analysis(unit: ExtractedUnit, recognition: UnitRecognition, include_whitespace: bool) -> UnitAnalysis {
    UnitAnalysis {
        native_text_char_count: count_with_mode(&unit.native_text, include_whitespace),
        whitespace_count: count_whitespace(&unit.native_text) + count_whitespace(&recognition.text),
        recognized_char_count: recognition.char_count,
        recognized_text: recognition.text,
        image_count: unit.images.len(),
        label: unit.label,
        kind: unit.kind,
    }
}

/// Analyze a file with the backend and extractors named by `config`.
pub async fn analyze_file(path: impl AsRef<Path>, config: &AnalysisConfig) -> Result<DocumentAnalysis> {
    Analyzer::new(config.clone())?
        .analyze_file(path, &ProgressScope::noop())
        .await
}

/// Analyze an in-memory document with the backend and extractors named by `config`.
pub async fn analyze_bytes(content: &[u8], file_name: &str, config: &AnalysisConfig) -> Result<DocumentAnalysis> {
    Analyzer::new(config.clone())?
        .analyze_bytes(content, file_name, &ProgressScope::noop())
        .await
}

/// Synchronous wrapper for [`analyze_file`].
pub fn analyze_file_sync(path: impl AsRef<Path>, config: &AnalysisConfig) -> Result<DocumentAnalysis> {
    GLOBAL_RUNTIME.block_on(analyze_file(path, config))
}

/// Synchronous wrapper for [`analyze_bytes`].
pub fn analyze_bytes_sync(content: &[u8], file_name: &str, config: &AnalysisConfig) -> Result<DocumentAnalysis> {
    GLOBAL_RUNTIME.block_on(analyze_bytes(content, file_name, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::RecognitionRequest;
    use crate::ocr::progress::{ProgressEvent, ProgressSink};
    use crate::plugins::Plugin;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    /// Answers every image with the same text.
    struct FixedBackend {
        text: &'static str,
        available: bool,
        calls: AtomicUsize,
    }

    impl FixedBackend {
        fn new(text: &'static str) -> Arc<Self> {
            Arc::new(Self {
                text,
                available: true,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl Plugin for FixedBackend {
        fn name(&self) -> &str {
            "fixed"
        }

        fn version(&self) -> String {
            "0.0.0".to_string()
        }
    }

    #[async_trait]
    impl RecognitionBackend for FixedBackend {
        async fn recognize(&self, _image: &[u8], _request: &RecognitionRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.text.to_string())
        }

        async fn is_available(&self) -> bool {
            self.available
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl ProgressSink for Recorder {
        fn report(&self, event: ProgressEvent) {
            self.events.lock().push(event);
        }
    }

    fn analyzer(backend: Arc<FixedBackend>) -> Analyzer {
        Analyzer::with_backend(AnalysisConfig::default(), backend).unwrap()
    }

    #[tokio::test]
    async fn test_plain_text_counts() {
        let backend = FixedBackend::new("unused");
        let analysis = analyzer(Arc::clone(&backend))
            .analyze_bytes(b"hello world", "note.txt", &ProgressScope::noop())
            .await
            .unwrap();

        assert_eq!(analysis.format, DocumentFormat::Text);
        assert_eq!(analysis.units.len(), 1);
        assert_eq!(analysis.total_native_text_chars, 10);
        assert_eq!(analysis.total_whitespace, 1);
        assert_eq!(analysis.total_recognized_chars, 0);
        assert_eq!(analysis.total_chars, 10);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_include_whitespace_in_totals() {
        let config = AnalysisConfig {
            include_whitespace_in_totals: true,
            ..Default::default()
        };
        let analysis = Analyzer::with_backend(config, FixedBackend::new(""))
            .unwrap()
            .analyze_bytes(b"hello world", "note.txt", &ProgressScope::noop())
            .await
            .unwrap();
        assert_eq!(analysis.total_chars, 11);
    }

    #[tokio::test]
    async fn test_single_image_is_recognized() {
        let backend = FixedBackend::new("A B");
        let analysis = analyzer(Arc::clone(&backend))
            .analyze_bytes(b"not really a png", "scan.png", &ProgressScope::noop())
            .await
            .unwrap();

        assert_eq!(analysis.units.len(), 1);
        let unit = &analysis.units[0];
        assert_eq!(unit.kind, UnitKind::Image);
        assert_eq!(unit.native_text_char_count, 0);
        assert_eq!(unit.recognized_text, "A B");
        assert_eq!(unit.recognized_char_count, 2);
        assert_eq!(unit.image_count, 1);
        assert_eq!(analysis.total_chars, 2);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ocr_disabled_skips_backend() {
        let backend = FixedBackend::new("AB");
        let mut config = AnalysisConfig::default();
        config.ocr.enabled = false;
        let analysis = Analyzer::with_backend(config, backend.clone())
            .unwrap()
            .analyze_bytes(b"png", "scan.png", &ProgressScope::noop())
            .await
            .unwrap();

        assert_eq!(analysis.total_recognized_chars, 0);
        assert_eq!(analysis.units[0].image_count, 1);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unavailable_backend_counts_zero() {
        let backend = Arc::new(FixedBackend {
            text: "AB",
            available: false,
            calls: AtomicUsize::new(0),
        });
        let analysis = analyzer(Arc::clone(&backend))
            .analyze_bytes(b"png", "scan.png", &ProgressScope::noop())
            .await
            .unwrap();
        assert_eq!(analysis.total_recognized_chars, 0);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_legacy_rejected_before_reading() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("deck.ppt");

        let err = analyzer(FixedBackend::new(""))
            .analyze_file(&missing, &ProgressScope::noop())
            .await
            .unwrap_err();
        assert!(matches!(err, ZeichenError::LegacyFormat { .. }));
        assert!(err.to_string().contains(".pptx"));
    }

    #[tokio::test]
    async fn test_unsupported_extension() {
        let err = analyzer(FixedBackend::new(""))
            .analyze_bytes(b"", "archive.rar", &ProgressScope::noop())
            .await
            .unwrap_err();
        assert!(matches!(err, ZeichenError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_completes() {
        let recorder = Arc::new(Recorder::default());
        let progress = ProgressScope::root(recorder.clone());
        let dir = tempdir().unwrap();
        let path = dir.path().join("note.txt");
        std::fs::write(&path, "안녕 하세요").unwrap();

        let analysis = analyzer(FixedBackend::new(""))
            .analyze_file(&path, &progress)
            .await
            .unwrap();
        assert_eq!(analysis.file_name, "note.txt");
        assert_eq!(analysis.total_chars, 5);

        let events = recorder.events.lock();
        assert!(events.windows(2).all(|w| w[0].percent <= w[1].percent));
        assert_eq!(events.last().map(|e| e.percent), Some(100.0));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let config = OcrConfig {
            backend: "paddle".to_string(),
            ..Default::default()
        };
        let err = backend_from_config(&config).err().unwrap();
        assert!(err.to_string().contains("paddle"));
    }

    #[test]
    fn test_analyze_bytes_sync() {
        let mut config = AnalysisConfig::default();
        config.ocr.enabled = false;
        let analysis = analyze_bytes_sync(b"a b c", "letters.txt", &config).unwrap();
        assert_eq!(analysis.total_chars, 3);
    }
}
