//! Tesseract backend driving the `tesseract` command-line tool.
//!
//! The image is piped on stdin and text is read from stdout, so nothing touches
//! the filesystem. Page segmentation is fully automatic (`--psm 3`) and runs of
//! spaces between words are preserved.

use crate::core::config::OcrConfig;
use crate::ocr::types::{QualityTier, RecognitionRequest};
use crate::plugins::{Plugin, RecognitionBackend};
use crate::{Result, ZeichenError};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Automatic page segmentation without orientation detection.
pub const DEFAULT_PSM: u8 = 3;

#[derive(Debug, Clone)]
pub struct TesseractBackend {
    binary: PathBuf,
    tessdata_root: Option<PathBuf>,
    psm: u8,
}

impl TesseractBackend {
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            tessdata_root: std::env::var_os("TESSDATA_PREFIX").map(PathBuf::from),
            psm: DEFAULT_PSM,
        }
    }

    /// Backend honouring `ocr.tessdata_dir`, falling back to `TESSDATA_PREFIX`.
    pub fn from_config(config: &OcrConfig) -> Self {
        let mut backend = Self::new();
        if let Some(dir) = &config.tessdata_dir {
            backend.tessdata_root = Some(dir.clone());
        }
        backend
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_tessdata_root(mut self, root: Option<PathBuf>) -> Self {
        self.tessdata_root = root;
        self
    }

    /// Data directory for `tier`: `<root>/<profile>` when it exists.
    ///
    /// Without a matching profile directory the engine's own default data is used.
    pub fn tessdata_dir(&self, tier: QualityTier) -> Option<PathBuf> {
        let root = self.tessdata_root.as_ref()?;
        let profile = root.join(tier.tessdata_profile());
        if profile.is_dir() {
            Some(profile)
        } else {
            tracing::debug!(
                "No {} directory under {}, using default tessdata",
                tier.tessdata_profile(),
                root.display()
            );
            None
        }
    }

    /// Command-line arguments for one recognition call.
    pub fn build_args(&self, request: &RecognitionRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "stdin".into(),
            "stdout".into(),
            "-l".into(),
            request.languages.clone().into(),
            "--psm".into(),
            self.psm.to_string().into(),
            "-c".into(),
            "preserve_interword_spaces=1".into(),
        ];
        if let Some(dir) = self.tessdata_dir(request.quality) {
            args.push("--tessdata-dir".into());
            args.push(dir.into_os_string());
        }
        args
    }

    fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for TesseractBackend {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn description(&self) -> &str {
        "Tesseract OCR through the tesseract command-line tool"
    }
}

#[async_trait]
impl RecognitionBackend for TesseractBackend {
    async fn recognize(&self, image_bytes: &[u8], request: &RecognitionRequest) -> Result<String> {
        let mut child = Command::new(self.binary())
            .args(self.build_args(request))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ZeichenError::MissingDependency(format!(
                        "{} not found (install tesseract-ocr)",
                        self.binary.display()
                    ))
                } else {
                    ZeichenError::ocr_with_source("Failed to start tesseract", e)
                }
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ZeichenError::ocr("tesseract stdin was not captured"))?;
        let input = image_bytes.to_vec();
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(&input).await;
            drop(stdin);
            result
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ZeichenError::ocr_with_source("Failed to wait for tesseract", e))?;

        match writer.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(ZeichenError::ocr_with_source("Failed to send image to tesseract", e)),
            Err(e) => return Err(ZeichenError::ocr_with_source("tesseract input task failed", e)),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ZeichenError::ocr(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn is_available(&self) -> bool {
        Command::new(self.binary())
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn supports_language(&self, lang: &str) -> bool {
        crate::ocr::validation::validate_language_code(lang).is_ok()
    }
}
