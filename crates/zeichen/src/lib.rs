//! Zeichen - character counting for documents with embedded images
//!
//! Zeichen counts the characters of a presentation, word-processor document,
//! spreadsheet, PDF, plain text file or image. Text stored natively in the
//! document is counted directly; text that only exists inside embedded images
//! is recognized with OCR and counted separately, per slide, page or sheet.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use zeichen::{AnalysisConfig, analyze_file_sync};
//!
//! # fn main() -> zeichen::Result<()> {
//! let config = AnalysisConfig::default();
//! let analysis = analyze_file_sync("deck.pptx", &config)?;
//! for unit in &analysis.units {
//!     println!("{}: {} + {}", unit.label, unit.native_text_char_count, unit.recognized_char_count);
//! }
//! println!("total: {}", analysis.total_chars);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Core** (`core`): format detection, configuration, the [`Analyzer`]
//! - **Extractors** (`extractors`): per-format splitting into slides, pages and sheets
//! - **Image pipeline** (`image`): fingerprinting, normalization, preprocessing
//! - **OCR** (`ocr`): recognition orchestration, run-scoped cache, Tesseract backend
//! - **Plugins** (`plugins`): the extractor and backend traits

#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod extractors;
pub mod image;
pub mod ocr;
pub mod plugins;
pub mod text;
pub mod types;

pub use error::{Result, ZeichenError};
pub use types::*;

pub use crate::core::analyzer::{Analyzer, analyze_bytes, analyze_bytes_sync, analyze_file, analyze_file_sync};
pub use crate::core::config::{AnalysisConfig, DedupScope, OcrConfig, PreprocessingConfig};
pub use crate::core::mime::{DocumentFormat, detect_format};

pub use crate::image::{PreprocessingOptions, PreprocessingStage};
pub use ocr::{
    ChannelProgressSink, ProgressEvent, ProgressScope, ProgressSink, QualityTier, RecognitionLanguages,
    TesseractBackend,
};
pub use plugins::{DocumentExtractor, ExtractorRegistry, Plugin, RecognitionBackend};
