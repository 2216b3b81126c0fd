//! Recognition backend trait.
//!
//! The engine is a black box that turns image bytes into text. It is injected
//! into the analyzer as `Arc<dyn RecognitionBackend>`, so nothing in the
//! pipeline depends on a particular engine and tests can use a stub.

use crate::Result;
use crate::ocr::types::RecognitionRequest;
use crate::plugins::Plugin;
use async_trait::async_trait;

#[async_trait]
pub trait RecognitionBackend: Plugin {
    /// Recognize text in one encoded image.
    ///
    /// Implementations may be slow. Errors are caught by the orchestrator and
    /// turned into empty text for that image.
    async fn recognize(&self, image_bytes: &[u8], request: &RecognitionRequest) -> Result<String>;

    /// Whether the backend can be used on this machine right now.
    async fn is_available(&self) -> bool {
        true
    }

    fn supports_language(&self, _lang: &str) -> bool {
        true
    }
}
