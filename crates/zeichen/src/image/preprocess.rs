//! Image preprocessing ahead of recognition.
//!
//! Stages always run in the order grayscale → denoise → binarize → morphology →
//! deskew, whatever order they were configured in. Binarize and morphology need
//! single-channel input and convert to grayscale themselves when the grayscale
//! stage was not requested.
//!
//! Two implementations sit behind [`ImagePreprocessor`]:
//!
//! - [`AdvancedPreprocessor`] runs the configured stages (requires the
//!   `advanced-preprocessing` feature).
//! - [`MinimalPreprocessor`] only stretches contrast around mid-gray.
//!
//! [`preprocess`] picks one from the runtime [`Capabilities`] and falls back to
//! the minimal transform whenever the advanced path fails. Transparency is
//! always flattened onto white first.

use crate::{Result, ZeichenError};
use image::{DynamicImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Linear contrast factor of the minimal transform.
pub const CONTRAST_FACTOR: f32 = 1.2;

/// One optional preprocessing stage. The derived ordering is the application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreprocessingStage {
    Grayscale,
    Denoise,
    Binarize,
    Morphology,
    Deskew,
}

impl PreprocessingStage {
    pub const ORDER: [PreprocessingStage; 5] = [
        PreprocessingStage::Grayscale,
        PreprocessingStage::Denoise,
        PreprocessingStage::Binarize,
        PreprocessingStage::Morphology,
        PreprocessingStage::Deskew,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PreprocessingStage::Grayscale => "grayscale",
            PreprocessingStage::Denoise => "denoise",
            PreprocessingStage::Binarize => "binarize",
            PreprocessingStage::Morphology => "morphology",
            PreprocessingStage::Deskew => "deskew",
        }
    }
}

impl fmt::Display for PreprocessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PreprocessingStage {
    type Err = ZeichenError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ORDER
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ZeichenError::validation(format!("Unknown preprocessing stage '{}'", s)))
    }
}

/// Set of enabled stages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreprocessingOptions(BTreeSet<PreprocessingStage>);

impl PreprocessingOptions {
    pub fn new(stages: impl IntoIterator<Item = PreprocessingStage>) -> Self {
        Self(stages.into_iter().collect())
    }

    pub fn all() -> Self {
        Self::new(PreprocessingStage::ORDER)
    }

    pub fn contains(&self, stage: PreprocessingStage) -> bool {
        self.0.contains(&stage)
    }

    pub fn insert(&mut self, stage: PreprocessingStage) {
        self.0.insert(stage);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Enabled stages in application order.
    pub fn stages(&self) -> impl Iterator<Item = PreprocessingStage> + '_ {
        PreprocessingStage::ORDER.into_iter().filter(|stage| self.contains(*stage))
    }
}

/// Transform engines available at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub advanced_transforms: bool,
}

impl Capabilities {
    /// Everything compiled into this build.
    pub fn detect() -> Self {
        Self {
            advanced_transforms: cfg!(feature = "advanced-preprocessing"),
        }
    }

    /// Compiled capabilities, further restricted by configuration.
    pub fn with_advanced_allowed(allowed: bool) -> Self {
        let mut caps = Self::detect();
        caps.advanced_transforms &= allowed;
        caps
    }

    pub fn minimal_only() -> Self {
        Self {
            advanced_transforms: false,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::detect()
    }
}

pub trait ImagePreprocessor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Transform an image whose transparency was already flattened.
    fn process(&self, image: &DynamicImage, options: &PreprocessingOptions) -> Result<DynamicImage>;
}

/// Contrast stretch only. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimalPreprocessor;

impl ImagePreprocessor for MinimalPreprocessor {
    fn name(&self) -> &'static str {
        "minimal"
    }

    fn process(&self, image: &DynamicImage, _options: &PreprocessingOptions) -> Result<DynamicImage> {
        Ok(DynamicImage::ImageRgba8(stretch_contrast(&image.to_rgba8())))
    }
}

static MINIMAL: MinimalPreprocessor = MinimalPreprocessor;

#[cfg(feature = "advanced-preprocessing")]
static ADVANCED: AdvancedPreprocessor = AdvancedPreprocessor;

/// Pick the implementation for `options` given what is available.
pub fn select_preprocessor(options: &PreprocessingOptions, caps: Capabilities) -> &'static dyn ImagePreprocessor {
    if options.is_empty() || !caps.advanced_transforms {
        return &MINIMAL;
    }
    advanced_preprocessor()
}

#[cfg(feature = "advanced-preprocessing")]
fn advanced_preprocessor() -> &'static dyn ImagePreprocessor {
    &ADVANCED
}

#[cfg(not(feature = "advanced-preprocessing"))]
fn advanced_preprocessor() -> &'static dyn ImagePreprocessor {
    &MINIMAL
}

/// Run the preprocessing pipeline. Errors degrade to the minimal transform and
/// are logged, never returned.
pub fn preprocess(image: &DynamicImage, options: &PreprocessingOptions, caps: Capabilities) -> DynamicImage {
    let flattened = DynamicImage::ImageRgba8(flatten_onto_white(image));
    let preprocessor = select_preprocessor(options, caps);
    tracing::debug!(
        preprocessor = preprocessor.name(),
        stages = ?options.stages().map(|s| s.as_str()).collect::<Vec<_>>(),
        "Preprocessing image"
    );

    match preprocessor.process(&flattened, options) {
        Ok(processed) => processed,
        Err(e) => {
            tracing::warn!("Preprocessing failed, using contrast-only transform: {}", e);
            DynamicImage::ImageRgba8(stretch_contrast(&flattened.to_rgba8()))
        }
    }
}

/// Alpha-blend every pixel onto an opaque white background.
pub fn flatten_onto_white(image: &DynamicImage) -> RgbaImage {
    let mut rgba = image.to_rgba8();
    for pixel in rgba.pixels_mut() {
        let alpha = pixel[3] as u32;
        if alpha == 255 {
            continue;
        }
        for channel in 0..3 {
            let c = pixel[channel] as u32;
            pixel[channel] = ((c * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        }
        pixel[3] = 255;
    }
    rgba
}

/// `v' = (v - 128) * 1.2 + 128` per colour channel, clamped.
pub fn stretch_contrast(image: &RgbaImage) -> RgbaImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        for channel in 0..3 {
            let v = (pixel[channel] as f32 - 128.0) * CONTRAST_FACTOR + 128.0;
            pixel[channel] = v.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

#[cfg(feature = "advanced-preprocessing")]
pub use advanced::AdvancedPreprocessor;

#[cfg(feature = "advanced-preprocessing")]
mod advanced {
    use super::*;
    use image::{GrayImage, Luma, imageops};
    use imageproc::edges::canny;
    use imageproc::filter::box_filter;
    use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
    use imageproc::hough::{LineDetectionOptions, detect_lines};

    /// Local mean window for binarization, in pixels.
    pub const THRESHOLD_WINDOW: u32 = 11;
    /// Subtracted from the local mean before comparing.
    pub const THRESHOLD_BIAS: i64 = 2;
    /// Rotations smaller than this are treated as noise.
    pub const MIN_SKEW_DEGREES: f32 = 0.5;
    /// Only lines within this many degrees of horizontal count.
    pub const MAX_SKEW_DEGREES: f32 = 45.0;
    /// Skew is estimated on a copy no larger than this.
    const SKEW_ANALYSIS_EDGE: u32 = 1000;

    /// Full stage pipeline backed by `imageproc`.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct AdvancedPreprocessor;

    enum Working {
        Color(RgbaImage),
        Gray(GrayImage),
    }

    impl Working {
        fn into_gray(self) -> GrayImage {
            match self {
                Working::Color(rgba) => imageops::grayscale(&rgba),
                Working::Gray(gray) => gray,
            }
        }

        fn to_gray(&self) -> GrayImage {
            match self {
                Working::Color(rgba) => imageops::grayscale(rgba),
                Working::Gray(gray) => gray.clone(),
            }
        }

        fn into_dynamic(self) -> DynamicImage {
            match self {
                Working::Color(rgba) => DynamicImage::ImageRgba8(rgba),
                Working::Gray(gray) => DynamicImage::ImageLuma8(gray),
            }
        }
    }

    impl ImagePreprocessor for AdvancedPreprocessor {
        fn name(&self) -> &'static str {
            "advanced"
        }

        fn process(&self, image: &DynamicImage, options: &PreprocessingOptions) -> Result<DynamicImage> {
            if image.width() == 0 || image.height() == 0 {
                return Err(ZeichenError::image_processing("Cannot preprocess an empty image"));
            }

            let mut working = Working::Color(image.to_rgba8());
            for stage in options.stages() {
                working = match stage {
                    PreprocessingStage::Grayscale => Working::Gray(working.into_gray()),
                    PreprocessingStage::Denoise => match working {
                        Working::Gray(gray) => Working::Gray(box_filter(&gray, 1, 1)),
                        Working::Color(rgba) => Working::Color(mean_blur_3x3(&rgba)),
                    },
                    PreprocessingStage::Binarize => Working::Gray(adaptive_threshold(
                        &working.into_gray(),
                        THRESHOLD_WINDOW,
                        THRESHOLD_BIAS,
                    )),
                    PreprocessingStage::Morphology => Working::Gray(open_2x2(&working.into_gray())),
                    PreprocessingStage::Deskew => deskew(working),
                };
            }

            Ok(working.into_dynamic())
        }
    }

    /// 3×3 mean of each colour channel, edges clamped.
    fn mean_blur_3x3(image: &RgbaImage) -> RgbaImage {
        let (width, height) = image.dimensions();
        RgbaImage::from_fn(width, height, |x, y| {
            let mut sums = [0u32; 4];
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let sx = (x as i64 + dx).clamp(0, width as i64 - 1) as u32;
                    let sy = (y as i64 + dy).clamp(0, height as i64 - 1) as u32;
                    let p = image.get_pixel(sx, sy);
                    for (sum, value) in sums.iter_mut().zip(p.0.iter()) {
                        *sum += *value as u32;
                    }
                }
            }
            Rgba(sums.map(|s| ((s + 4) / 9) as u8))
        })
    }

    /// Local mean threshold: white where `p > mean(window) - bias`, else black.
    pub(super) fn adaptive_threshold(gray: &GrayImage, window: u32, bias: i64) -> GrayImage {
        let (width, height) = gray.dimensions();
        let radius = window / 2;
        let stride = width as usize + 1;

        let mut integral = vec![0u64; stride * (height as usize + 1)];
        for y in 0..height as usize {
            let mut row_sum = 0u64;
            for x in 0..width as usize {
                row_sum += gray.get_pixel(x as u32, y as u32)[0] as u64;
                integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
            }
        }

        GrayImage::from_fn(width, height, |x, y| {
            let x0 = x.saturating_sub(radius) as usize;
            let y0 = y.saturating_sub(radius) as usize;
            let x1 = (x + radius).min(width - 1) as usize + 1;
            let y1 = (y + radius).min(height - 1) as usize + 1;
            let sum = integral[y1 * stride + x1] + integral[y0 * stride + x0]
                - integral[y0 * stride + x1]
                - integral[y1 * stride + x0];
            let count = ((x1 - x0) * (y1 - y0)) as i64;
            let value = gray.get_pixel(x, y)[0] as i64;
            if value * count > sum as i64 - bias * count {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    /// Opening with a 2×2 square: erosion anchored top-left, dilation anchored bottom-right.
    pub(super) fn open_2x2(gray: &GrayImage) -> GrayImage {
        let (width, height) = gray.dimensions();
        let eroded = GrayImage::from_fn(width, height, |x, y| {
            let x1 = (x + 1).min(width - 1);
            let y1 = (y + 1).min(height - 1);
            let v = [(x, y), (x1, y), (x, y1), (x1, y1)]
                .iter()
                .map(|&(px, py)| gray.get_pixel(px, py)[0])
                .min()
                .unwrap_or(0);
            Luma([v])
        });
        GrayImage::from_fn(width, height, |x, y| {
            let x0 = x.saturating_sub(1);
            let y0 = y.saturating_sub(1);
            let v = [(x0, y0), (x, y0), (x0, y), (x, y)]
                .iter()
                .map(|&(px, py)| eroded.get_pixel(px, py)[0])
                .max()
                .unwrap_or(0);
            Luma([v])
        })
    }

    fn deskew(working: Working) -> Working {
        let Some(angle) = estimate_skew(&working.to_gray()) else {
            tracing::debug!("Deskew: no text lines detected");
            return working;
        };
        if angle.abs() < MIN_SKEW_DEGREES {
            tracing::debug!(angle, "Deskew: below threshold, not rotating");
            return working;
        }

        tracing::debug!(angle, "Deskew: rotating");
        let theta = -angle.to_radians();
        match working {
            Working::Gray(gray) => Working::Gray(rotate_about_center(&gray, theta, Interpolation::Bilinear, Luma([255]))),
            Working::Color(rgba) => Working::Color(rotate_about_center(
                &rgba,
                theta,
                Interpolation::Bilinear,
                Rgba([255, 255, 255, 255]),
            )),
        }
    }

    /// Median deviation from horizontal, in degrees, of the detected lines.
    pub(super) fn estimate_skew(gray: &GrayImage) -> Option<f32> {
        let (width, height) = gray.dimensions();
        if width < 3 || height < 3 {
            return None;
        }

        let long_edge = width.max(height);
        let sample = if long_edge > SKEW_ANALYSIS_EDGE {
            let scale = SKEW_ANALYSIS_EDGE as f32 / long_edge as f32;
            let w = ((width as f32 * scale).round() as u32).max(3);
            let h = ((height as f32 * scale).round() as u32).max(3);
            imageops::resize(gray, w, h, imageops::FilterType::Triangle)
        } else {
            gray.clone()
        };

        let edges = canny(&sample, 50.0, 150.0);
        let options = LineDetectionOptions {
            vote_threshold: (sample.width().min(sample.height()) / 4).max(10),
            suppression_radius: 8,
        };

        let mut skews: Vec<f32> = detect_lines(&edges, options)
            .into_iter()
            .map(|line| line.angle_in_degrees as f32 - 90.0)
            .filter(|skew| skew.abs() <= MAX_SKEW_DEGREES)
            .collect();

        median(&mut skews)
    }

    pub(super) fn median(values: &mut [f32]) -> Option<f32> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(|a, b| a.total_cmp(b));
        let mid = values.len() / 2;
        if values.len() % 2 == 0 {
            Some((values[mid - 1] + values[mid]) / 2.0)
        } else {
            Some(values[mid])
        }
    }
}
