use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::validation::validate_language_code;
use crate::{Result, ZeichenError};

/// Languages used when the configured set is empty: Korean first, then English.
pub const DEFAULT_LANGUAGES: &[&str] = &["kor", "eng"];

/// Delimiter Tesseract expects between language codes.
pub const LANGUAGE_DELIMITER: &str = "+";

/// Ordered, non-empty, duplicate-free set of recognition language codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct RecognitionLanguages(Vec<String>);

impl RecognitionLanguages {
    /// Build from codes, validating each one.
    ///
    /// Blank entries are ignored and an empty input falls back to
    /// [`DEFAULT_LANGUAGES`]. Order is kept, later duplicates are dropped.
    pub fn new<I, S>(codes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for code in codes {
            let code = code.as_ref().trim().to_lowercase();
            if code.is_empty() {
                continue;
            }
            validate_language_code(&code)?;
            if !unique.contains(&code) {
                unique.push(code);
            }
        }

        if unique.is_empty() {
            return Ok(Self::default());
        }
        Ok(Self(unique))
    }

    /// Codes joined with `+`, as passed to the engine.
    pub fn joined(&self) -> String {
        self.0.join(LANGUAGE_DELIMITER)
    }

    pub fn codes(&self) -> &[String] {
        &self.0
    }
}

impl Default for RecognitionLanguages {
    fn default() -> Self {
        Self(DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect())
    }
}

impl TryFrom<Vec<String>> for RecognitionLanguages {
    type Error = ZeichenError;

    fn try_from(value: Vec<String>) -> Result<Self> {
        Self::new(value)
    }
}

impl From<RecognitionLanguages> for Vec<String> {
    fn from(value: RecognitionLanguages) -> Self {
        value.0
    }
}

impl FromStr for RecognitionLanguages {
    type Err = ZeichenError;

    /// Parse `kor+eng` or `kor,eng`.
    fn from_str(s: &str) -> Result<Self> {
        Self::new(s.split(['+', ',']))
    }
}

impl fmt::Display for RecognitionLanguages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

/// Recognition data profile, trading speed for accuracy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Fast,
    #[default]
    Balanced,
    Accurate,
}

impl QualityTier {
    /// Name of the tessdata profile directory for this tier.
    pub fn tessdata_profile(&self) -> &'static str {
        match self {
            QualityTier::Fast => "tessdata_fast",
            QualityTier::Balanced => "tessdata",
            QualityTier::Accurate => "tessdata_best",
        }
    }
}

impl FromStr for QualityTier {
    type Err = ZeichenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "fast" => Ok(QualityTier::Fast),
            "balanced" => Ok(QualityTier::Balanced),
            "accurate" | "best" => Ok(QualityTier::Accurate),
            other => Err(ZeichenError::validation(format!(
                "Unknown quality tier '{}', expected fast, balanced or accurate",
                other
            ))),
        }
    }
}

/// Everything a backend needs besides the pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionRequest {
    /// `+`-joined language codes, e.g. `kor+eng`.
    pub languages: String,
    pub quality: QualityTier,
}

impl RecognitionRequest {
    pub fn new(languages: &RecognitionLanguages, quality: QualityTier) -> Self {
        Self {
            languages: languages.joined(),
            quality,
        }
    }
}
