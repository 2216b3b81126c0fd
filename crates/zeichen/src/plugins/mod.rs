//! Extension points: extractors per container format and recognition backends.

pub mod extractor;
pub mod ocr;
pub mod registry;
pub mod traits;

pub use extractor::DocumentExtractor;
pub use ocr::RecognitionBackend;
pub use registry::ExtractorRegistry;
pub use traits::Plugin;
