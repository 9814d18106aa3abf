//! Image preprocessing: normalization, optional CLAHE and sharpening.
//!
//! The stage turns raw detector counts into a float image in `[0, 1]`:
//!
//! 1. validate the buffer shape ([`AnalysisError::InvalidImage`]);
//! 2. min-max normalize; a constant image is rejected with
//!    [`AnalysisError::DegenerateImage`] since it carries no edge;
//! 3. optionally equalize local contrast ([`clahe`]);
//! 4. optionally sharpen with a Laplacian kernel ([`sharpen`]).
//!
//! All steps are pure and allocate their outputs.

pub mod clahe;
pub mod sharpen;

pub use clahe::{clahe, ClaheOptions};
pub use sharpen::laplacian_sharpen;

use crate::diagnostics::TimingBreakdown;
use crate::error::AnalysisError;
use crate::image::{ImageF32, ImageView, RawImage};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Knobs of the preprocessing stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessOptions {
    /// Apply contrast-limited adaptive histogram equalization.
    pub enhance_contrast: bool,
    /// Apply Laplacian sharpening after (optional) equalization.
    pub sharpen: bool,
    pub clahe: ClaheOptions,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            enhance_contrast: false,
            sharpen: false,
            clahe: ClaheOptions::default(),
        }
    }
}

/// Float image whose values are guaranteed to lie in `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedImage(ImageF32);

impl NormalizedImage {
    /// Wrap an already normalized image, clamping stray values.
    pub fn from_image(mut image: ImageF32) -> Self {
        image.clamp_unit();
        Self(image)
    }

    #[inline]
    pub fn as_image(&self) -> &ImageF32 {
        &self.0
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.0.w
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.0.h
    }
}

/// Preprocess with default CLAHE settings.
pub fn preprocess(
    raw: &RawImage,
    enhance_contrast: bool,
    sharpen: bool,
) -> Result<NormalizedImage, AnalysisError> {
    preprocess_with(
        raw,
        &PreprocessOptions {
            enhance_contrast,
            sharpen,
            ..Default::default()
        },
    )
}

pub fn preprocess_with(
    raw: &RawImage,
    options: &PreprocessOptions,
) -> Result<NormalizedImage, AnalysisError> {
    preprocess_timed(raw, options, &mut TimingBreakdown::default())
}

/// Run the enabled steps, recording one timing entry per step.
pub fn preprocess_timed(
    raw: &RawImage,
    options: &PreprocessOptions,
    timings: &mut TimingBreakdown,
) -> Result<NormalizedImage, AnalysisError> {
    let stage = Instant::now();
    let mut image = normalize(raw)?;
    timings.push_since("normalize", stage);
    if options.enhance_contrast {
        let stage = Instant::now();
        image = clahe(&image, &options.clahe);
        timings.push_since("clahe", stage);
    }
    if options.sharpen {
        let stage = Instant::now();
        image = laplacian_sharpen(&image);
        timings.push_since("sharpen", stage);
    }
    log::debug!(
        "preprocess {}x{} clahe={} sharpen={}",
        image.w,
        image.h,
        options.enhance_contrast,
        options.sharpen
    );
    Ok(NormalizedImage::from_image(image))
}

/// Min-max normalize raw counts to `[0, 1]`.
pub fn normalize(raw: &RawImage) -> Result<ImageF32, AnalysisError> {
    raw.validate()?;
    let (lo, hi) = raw
        .min_max()
        .ok_or_else(|| AnalysisError::InvalidImage("empty image".to_string()))?;
    if lo == hi {
        return Err(AnalysisError::DegenerateImage {
            value: lo,
            pixels: raw.pixel_count(),
        });
    }
    let offset = lo as f32;
    let range = (hi - lo) as f32;
    let data = raw
        .data
        .iter()
        .map(|&v| ((v as f32 - offset) / range).clamp(0.0, 1.0))
        .collect();
    Ok(ImageF32 {
        w: raw.w,
        h: raw.h,
        data,
    })
}
