#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod analyzer;
pub mod calibration;
pub mod diagnostics;
pub mod error;
pub mod image;
pub mod measure;
pub mod types;

// Stage-level modules, public for tools and tests.
pub mod config;
pub mod edges;
pub mod identify;
pub mod preprocess;
pub mod profile;
pub mod render;

// --- High-level re-exports -------------------------------------------------

// Main entry points: analyzer + results.
pub use crate::analyzer::{analyze, AnalysisParams, LeafAnalyzer};
pub use crate::calibration::Calibration;
pub use crate::error::AnalysisError;
pub use crate::image::RawImage;
pub use crate::types::{
    AnalysisResult, BladeMeasurement, BladeStatus, BladeWarning, EdgePoint, OverallStatus,
};

// High-level diagnostics returned by the analyzer.
pub use crate::diagnostics::{AnalysisReport, PipelineTrace};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use leaf_position_qc::prelude::*;
///
/// # fn main() -> Result<(), AnalysisError> {
/// let raw = RawImage::from_rows(&[vec![0, 10, 0], vec![0, 10, 0], vec![0, 10, 0]])?;
/// let calibration = Calibration::new(0.25, 1.0, 1.0);
/// let table = ScanTable::new(vec![ScanPosition::new(1, 0.0, 1.0)])?;
/// let result = LeafAnalyzer::default().process(&raw, &calibration, &table)?;
/// println!("{:?}", result.overall);
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::measure::{ImageSummary, StatusCounts};
    pub use crate::profile::{LeafBank, ScanPosition, ScanTable};
    pub use crate::{
        AnalysisError, AnalysisParams, AnalysisResult, BladeStatus, Calibration, LeafAnalyzer,
        OverallStatus, RawImage,
    };
}

// --- Stage-level API (for tools & advanced users) ---------------------------

pub mod stages {
    pub use crate::edges::{gradient_magnitude, GradientKernel};
    pub use crate::measure::{classify_overall, compute_measurement};
    pub use crate::preprocess::{
        preprocess, preprocess_timed, preprocess_with, NormalizedImage, PreprocessOptions,
    };
    pub use crate::profile::{find_blade_edges, BladeEdges, EdgeSearchOptions};
    pub use crate::render::render_overlay;
}
