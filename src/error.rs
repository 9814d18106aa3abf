//! Error taxonomy of the analysis core.
//!
//! Only image-level problems and invalid parameters are errors. Blade-level
//! anomalies (closed pairs, scan positions outside the image) are recorded
//! in the per-blade status and never abort an analysis.
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum AnalysisError {
    /// Empty input or a pixel buffer that does not match `w × h`.
    #[error("invalid image: {0}")]
    InvalidImage(String),
    /// Every pixel has the same intensity; no edge can be detected.
    #[error("degenerate image: all {pixels} pixels have intensity {value}")]
    DegenerateImage { value: u16, pixels: usize },
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}
