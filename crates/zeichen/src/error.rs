//! Error types for Zeichen.
//!
//! All fallible operations return [`ZeichenError`]. Failures are swallowed at the
//! smallest unit where a degraded result still means something (a single image
//! that fails to decode or recognize contributes zero characters), and surface
//! to the caller only when no meaningful partial result exists.
//!
//! **System errors always bubble up unchanged:**
//! - `ZeichenError::Io` (from `std::io::Error`)
//!
//! **Application errors carry context:**
//! - `Parsing` - malformed archives, XML or PDF structures
//! - `Validation` - invalid configuration or parameters
//! - `Ocr` - recognition backend failures
//! - `LegacyFormat` / `UnsupportedFormat` - rejected input, raised before parsing
//!
//! # Example
//!
//! ```rust
//! use zeichen::{Result, ZeichenError};
//!
//! fn read_deck(path: &str) -> Result<Vec<u8>> {
//!     let bytes = std::fs::read(path)?;
//!     if bytes.is_empty() {
//!         return Err(ZeichenError::validation(format!("File is empty: {}", path)));
//!     }
//!     Ok(bytes)
//! }
//! ```
use thiserror::Error;

/// Result type alias using `ZeichenError`.
pub type Result<T> = std::result::Result<T, ZeichenError>;

/// Main error type for all Zeichen operations.
#[derive(Debug, Error)]
pub enum ZeichenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parsing error: {message}")]
    Parsing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("OCR error: {message}")]
    Ocr {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Image processing error: {message}")]
    ImageProcessing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Pre-XML office containers (`.ppt`, `.doc`, `.xls`).
    #[error(
        "Legacy .{extension} files are not supported. Please convert the file to .{modern} first and try again."
    )]
    LegacyFormat { extension: String, modern: String },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Plugin error in '{plugin_name}': {message}")]
    Plugin { message: String, plugin_name: String },

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for ZeichenError {
    fn from(err: serde_json::Error) -> Self {
        ZeichenError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<image::ImageError> for ZeichenError {
    fn from(err: image::ImageError) -> Self {
        ZeichenError::ImageProcessing {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(feature = "office")]
impl From<zip::result::ZipError> for ZeichenError {
    fn from(err: zip::result::ZipError) -> Self {
        ZeichenError::Parsing {
            message: format!("Failed to read archive: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(feature = "office")]
impl From<roxmltree::Error> for ZeichenError {
    fn from(err: roxmltree::Error) -> Self {
        ZeichenError::Parsing {
            message: format!("Failed to parse XML: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(feature = "pdf")]
impl From<lopdf::Error> for ZeichenError {
    fn from(err: lopdf::Error) -> Self {
        ZeichenError::Parsing {
            message: format!("Failed to parse PDF: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl ZeichenError {
    error_constructor!(parsing, Parsing);
    error_constructor!(ocr, Ocr);
    error_constructor!(validation, Validation);
    error_constructor!(image_processing, ImageProcessing);
    error_constructor!(serialization, Serialization);

    /// Rejection for a pre-XML office extension, naming the format to convert to.
    pub fn legacy_format(extension: &str, modern: &str) -> Self {
        Self::LegacyFormat {
            extension: extension.to_ascii_lowercase(),
            modern: modern.to_ascii_lowercase(),
        }
    }

    /// True when the input was turned away before any parsing happened.
    pub fn is_rejected_input(&self) -> bool {
        matches!(self, Self::LegacyFormat { .. } | Self::UnsupportedFormat(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ZeichenError = io_err.into();
        assert!(matches!(err, ZeichenError::Io(_)));
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_parsing_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad data");
        let err = ZeichenError::parsing_with_source("truncated archive", source);
        assert_eq!(err.to_string(), "Parsing error: truncated archive");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_ocr_error() {
        let err = ZeichenError::ocr("tesseract exited with status 1");
        assert_eq!(err.to_string(), "OCR error: tesseract exited with status 1");
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_validation_error() {
        let err = ZeichenError::validation("unknown language code 'xx'");
        assert_eq!(err.to_string(), "Validation error: unknown language code 'xx'");
    }

    #[test]
    fn test_image_processing_error_with_source() {
        let source = std::io::Error::other("resize failed");
        let err = ZeichenError::image_processing_with_source("normalize", source);
        assert_eq!(err.to_string(), "Image processing error: normalize");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_legacy_format_message() {
        let err = ZeichenError::legacy_format("PPT", "pptx");
        assert_eq!(
            err.to_string(),
            "Legacy .ppt files are not supported. Please convert the file to .pptx first and try again."
        );
        assert!(err.is_rejected_input());
    }

    #[test]
    fn test_unsupported_format_differs_from_legacy() {
        let unsupported = ZeichenError::UnsupportedFormat("report.odt".to_string());
        let legacy = ZeichenError::legacy_format("doc", "docx");
        assert!(unsupported.is_rejected_input());
        assert_ne!(unsupported.to_string(), legacy.to_string());
        assert!(!unsupported.to_string().contains("convert"));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ZeichenError = json_err.into();
        assert!(matches!(err, ZeichenError::Serialization { .. }));
    }

    #[test]
    fn test_plugin_error() {
        let err = ZeichenError::Plugin {
            message: "no extractor".to_string(),
            plugin_name: "pptx-extractor".to_string(),
        };
        assert_eq!(err.to_string(), "Plugin error in 'pptx-extractor': no extractor");
        assert!(!err.is_rejected_input());
    }
}
