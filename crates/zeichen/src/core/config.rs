//! Analysis configuration.
//!
//! An [`AnalysisConfig`] is an immutable snapshot threaded through every call;
//! nothing in the pipeline reads ambient settings. It can be loaded from TOML,
//! YAML or JSON, or discovered as `zeichen.toml` in the working directory or
//! any of its parents.

use crate::image::preprocess::PreprocessingOptions;
use crate::ocr::types::{QualityTier, RecognitionLanguages};
use crate::{Result, ZeichenError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up by [`AnalysisConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "zeichen.toml";

/// Long edge, in pixels, every image is rescaled to before recognition.
pub const DEFAULT_TARGET_LONG_EDGE: u32 = 3000;

/// Largest accepted `target_long_edge`. A square image at this size is a
/// 400 MB RGBA buffer.
pub const MAX_TARGET_LONG_EDGE: u32 = 10_000;

/// How far recognition results are shared between structural units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupScope {
    /// One cache for the whole document; an image repeated on many slides is recognized once.
    #[default]
    Document,
    /// Fresh cache per unit; only repeats within the same unit are skipped.
    Unit,
}

/// Main analysis configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub ocr: OcrConfig,

    #[serde(default)]
    pub preprocessing: PreprocessingConfig,

    /// Count whitespace as characters in the totals.
    #[serde(default)]
    pub include_whitespace_in_totals: bool,
}

/// Recognition settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Run recognition on embedded images at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Backend name, looked up by the analyzer (`tesseract`).
    #[serde(default = "default_backend")]
    pub backend: String,

    #[serde(default)]
    pub languages: RecognitionLanguages,

    #[serde(default)]
    pub quality: QualityTier,

    /// Root directory holding `tessdata_fast/`, `tessdata/` and `tessdata_best/`.
    /// Falls back to `TESSDATA_PREFIX` and then to the engine's own default.
    #[serde(default)]
    pub tessdata_dir: Option<PathBuf>,

    #[serde(default)]
    pub dedup_scope: DedupScope,

    #[serde(default = "default_target_long_edge")]
    pub target_long_edge: u32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: default_backend(),
            languages: RecognitionLanguages::default(),
            quality: QualityTier::default(),
            tessdata_dir: None,
            dedup_scope: DedupScope::default(),
            target_long_edge: DEFAULT_TARGET_LONG_EDGE,
        }
    }
}

/// Image preprocessing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    #[serde(default)]
    pub stages: PreprocessingOptions,

    /// Allow the advanced transform engine when it is compiled in.
    #[serde(default = "default_true")]
    pub advanced: bool,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            stages: PreprocessingOptions::default(),
            advanced: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_backend() -> String {
    "tesseract".to_string()
}

fn default_target_long_edge() -> u32 {
    DEFAULT_TARGET_LONG_EDGE
}

impl AnalysisConfig {
    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.ocr.target_long_edge == 0 {
            return Err(ZeichenError::validation("ocr.target_long_edge must be greater than zero"));
        }
        if self.ocr.target_long_edge > MAX_TARGET_LONG_EDGE {
            return Err(ZeichenError::validation(format!(
                "ocr.target_long_edge must be at most {}, got {}",
                MAX_TARGET_LONG_EDGE, self.ocr.target_long_edge
            )));
        }
        if self.ocr.backend.trim().is_empty() {
            return Err(ZeichenError::validation("ocr.backend must not be empty"));
        }
        Ok(())
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| ZeichenError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = serde_yaml_ng::from_str(&content)
            .map_err(|e| ZeichenError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| ZeichenError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration choosing the parser from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase()).as_deref() {
            Some("toml") => Self::from_toml_file(path),
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(ZeichenError::validation(format!(
                "Unsupported config file format: {}. Use .toml, .yaml or .json",
                path.display()
            ))),
        }
    }

    /// Discover a `zeichen.toml` in the current directory or any parent.
    pub fn discover() -> Result<Option<Self>> {
        let current = std::env::current_dir().map_err(ZeichenError::Io)?;
        Self::discover_from(&current)
    }

    /// Discover a `zeichen.toml` starting at `start` and walking up.
    pub fn discover_from(start: &Path) -> Result<Option<Self>> {
        let mut current = start.to_path_buf();

        loop {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                return Ok(Some(Self::from_toml_file(candidate)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| ZeichenError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}
