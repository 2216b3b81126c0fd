//! Recognition orchestration.
//!
//! [`OcrOrchestrator`] takes the images of one structural unit, skips repeats,
//! resolves known images from the run-scoped [`RecognitionCache`] and sends the
//! rest through normalize → preprocess → recognize.

pub mod cache;
pub mod orchestrator;
pub mod progress;
pub mod tesseract;
pub mod types;
pub mod validation;

pub use cache::RecognitionCache;
pub use orchestrator::{OcrOrchestrator, UnitRecognition, prepare_for_recognition};
pub use progress::{ChannelProgressSink, NoopProgress, ProgressEvent, ProgressScope, ProgressSink};
pub use tesseract::TesseractBackend;
pub use types::{QualityTier, RecognitionLanguages, RecognitionRequest};
