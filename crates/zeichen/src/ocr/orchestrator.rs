use std::sync::Arc;

use ahash::AHashSet;

use crate::core::config::AnalysisConfig;
use crate::image::{
    Capabilities, ImageFingerprint, PreprocessingOptions, encode_png, fingerprint, load_image, normalize, preprocess,
};
use crate::ocr::cache::RecognitionCache;
use crate::ocr::progress::ProgressScope;
use crate::ocr::types::{RecognitionLanguages, RecognitionRequest};
use crate::plugins::RecognitionBackend;
use crate::text::count_with_mode;
use crate::types::RawImage;

/// Recognition outcome for one structural unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitRecognition {
    /// Non-empty texts joined with `\n`, trimmed.
    pub text: String,
    pub char_count: usize,
    /// Images actually sent to the backend.
    pub recognized_images: usize,
    /// Images answered from the run-scoped cache.
    pub cache_hits: usize,
    /// Images skipped because the same picture already appeared in this unit.
    pub duplicates_skipped: usize,
}

/// Sequences fingerprint → dedup → cache → normalize → preprocess → recognize.
///
/// Images are handled one at a time; the backend is never called concurrently
/// by one orchestrator.
pub struct OcrOrchestrator {
    backend: Arc<dyn RecognitionBackend>,
    request: RecognitionRequest,
    options: PreprocessingOptions,
    capabilities: Capabilities,
    target_long_edge: u32,
    include_whitespace: bool,
}

impl OcrOrchestrator {
    pub fn new(backend: Arc<dyn RecognitionBackend>, config: &AnalysisConfig) -> Self {
        let languages = supported_languages(backend.as_ref(), &config.ocr.languages);
        Self {
            request: RecognitionRequest::new(&languages, config.ocr.quality),
            backend,
            options: config.preprocessing.stages.clone(),
            capabilities: Capabilities::with_advanced_allowed(config.preprocessing.advanced),
            target_long_edge: config.ocr.target_long_edge,
            include_whitespace: config.include_whitespace_in_totals,
        }
    }

    pub fn request(&self) -> &RecognitionRequest {
        &self.request
    }

    /// Recognize the images of one unit.
    ///
    /// Per-image failures are logged and contribute empty text; this never fails.
    pub async fn recognize_unit(
        &self,
        images: &[RawImage],
        cache: &mut RecognitionCache,
        progress: &ProgressScope,
    ) -> UnitRecognition {
        let total = images.len();
        let mut seen: AHashSet<ImageFingerprint> = AHashSet::with_capacity(total);
        let mut texts: Vec<String> = Vec::with_capacity(total);
        let mut result = UnitRecognition::default();

        for (index, image) in images.iter().enumerate() {
            let key = self.fingerprint(image).await;

            if !seen.insert(key.clone()) {
                tracing::debug!("Skipping repeated image {} within unit", image.name);
                result.duplicates_skipped += 1;
                progress.report_step(index + 1, total, format!("Skipped duplicate image {}/{}", index + 1, total));
                continue;
            }

            let text = match cache.lookup(&key) {
                Some(cached) => {
                    tracing::debug!("Recognition cache hit for {}", image.name);
                    result.cache_hits += 1;
                    cached
                }
                None => {
                    let text = self.recognize_image(image).await;
                    result.recognized_images += 1;
                    cache.insert(key, text.clone());
                    text
                }
            };

            if !text.is_empty() {
                texts.push(text);
            }
            progress.report_step(index + 1, total, format!("Recognized image {}/{}", index + 1, total));
        }

        result.text = texts.join("\n").trim().to_string();
        result.char_count = count_with_mode(&result.text, self.include_whitespace);
        result
    }

    async fn fingerprint(&self, image: &RawImage) -> ImageFingerprint {
        let bytes = image.bytes.clone();
        match tokio::task::spawn_blocking(move || fingerprint(&bytes)).await {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!("Fingerprint task failed for {}: {}", image.name, e);
                fingerprint(&image.bytes)
            }
        }
    }

    async fn recognize_image(&self, image: &RawImage) -> String {
        let bytes = image.bytes.clone();
        let options = self.options.clone();
        let capabilities = self.capabilities;
        let target = self.target_long_edge;

        let prepared = match tokio::task::spawn_blocking(move || {
            prepare_for_recognition(&bytes, target, &options, capabilities)
        })
        .await
        {
            Ok(prepared) => prepared,
            Err(e) => {
                tracing::warn!("Image preparation task failed for {}: {}", image.name, e);
                image.bytes.clone()
            }
        };

        match self.backend.recognize(&prepared, &self.request).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    "Recognition failed for {} with backend '{}': {}",
                    image.name,
                    self.backend.name(),
                    e
                );
                String::new()
            }
        }
    }
}

/// The configured languages the backend can read.
///
/// Unsupported codes are dropped with a warning. When none is supported the
/// configured set is sent unchanged and the engine decides.
fn supported_languages(backend: &dyn RecognitionBackend, configured: &RecognitionLanguages) -> RecognitionLanguages {
    let (supported, unsupported): (Vec<&String>, Vec<&String>) =
        configured.codes().iter().partition(|code| backend.supports_language(code));

    if unsupported.is_empty() {
        return configured.clone();
    }
    if supported.is_empty() {
        tracing::warn!(
            "Backend '{}' supports none of '{}', sending them unchanged",
            backend.name(),
            configured
        );
        return configured.clone();
    }

    tracing::warn!(
        "Backend '{}' does not support {:?}, recognizing with the remaining languages",
        backend.name(),
        unsupported
    );
    RecognitionLanguages::new(supported).unwrap_or_else(|_| configured.clone())
}

/// Normalize, preprocess and PNG-encode image bytes for the backend.
///
/// Anything that cannot be decoded is passed through untouched; a failed
/// rescale keeps the original resolution.
pub fn prepare_for_recognition(
    bytes: &[u8],
    target_long_edge: u32,
    options: &PreprocessingOptions,
    capabilities: Capabilities,
) -> Vec<u8> {
    let decoded = match load_image(bytes) {
        Ok(image) => image,
        Err(e) => {
            tracing::warn!("Passing undecodable image to recognition as-is: {}", e);
            return bytes.to_vec();
        }
    };

    let normalized = normalize(&decoded, target_long_edge).unwrap_or_else(|e| {
        tracing::warn!("Normalization failed, keeping original size: {}", e);
        decoded
    });
    let processed = preprocess(&normalized, options, capabilities);

    encode_png(&processed).unwrap_or_else(|e| {
        tracing::warn!("Failed to encode preprocessed image: {}", e);
        bytes.to_vec()
    })
}
