//! Analyzer orchestrating the single-image pipeline.
//!
//! normalize → (CLAHE) → (sharpen) → gradient magnitude → per-blade
//! profiles and edges → millimetre measurements → overall status.
//!
//! Modules
//! - [`params`]: configuration of every stage and its validation.
//! - `pipeline`: the [`LeafAnalyzer`] implementation.

pub mod params;
mod pipeline;

pub use params::AnalysisParams;
pub use pipeline::LeafAnalyzer;

use crate::calibration::Calibration;
use crate::error::AnalysisError;
use crate::image::RawImage;
use crate::profile::{ScanPosition, ScanTable};
use crate::types::AnalysisResult;

/// Analyze one image with explicit core parameters and defaults elsewhere.
pub fn analyze(
    raw: &RawImage,
    calibration: &Calibration,
    scan_positions: &[ScanPosition],
    expected_sizes_mm: &[f64],
    tolerance_mm: f64,
    min_separation_px: usize,
    detection_threshold_fraction: f32,
) -> Result<AnalysisResult, AnalysisError> {
    let table = ScanTable::new(scan_positions.to_vec())?;
    let mut params = AnalysisParams::default();
    params.tolerance.expected_sizes_mm = expected_sizes_mm.to_vec();
    params.tolerance.tolerance_mm = tolerance_mm;
    params.edges.min_separation_px = min_separation_px;
    params.edges.detection_threshold_fraction = detection_threshold_fraction;
    LeafAnalyzer::new(params).process(raw, calibration, &table)
}
