//! Core analysis orchestration.
//!
//! - **Entry points**: [`Analyzer`] plus the `analyze_file` / `analyze_bytes` shortcuts
//! - **Format detection**: extension-based, with legacy Office formats rejected up front
//! - **Configuration**: [`AnalysisConfig`] loading and discovery
//! - **I/O**: file reading and validation helpers
//!
//! # Example
//!
//! ```rust,no_run
//! use zeichen::core::analyzer::analyze_file;
//! use zeichen::core::config::AnalysisConfig;
//!
//! # async fn example() -> zeichen::Result<()> {
//! let config = AnalysisConfig::default();
//! let analysis = analyze_file("slides.pptx", &config).await?;
//! println!("{} characters", analysis.total_chars);
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod config;
pub mod io;
pub mod mime;

pub use analyzer::{
    Analyzer, analyze_bytes, analyze_bytes_sync, analyze_file, analyze_file_sync, backend_from_config,
};
pub use config::{AnalysisConfig, DedupScope, OcrConfig, PreprocessingConfig};
pub use mime::{DocumentFormat, detect_format};
