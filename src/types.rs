//! Result types handed to persistence, rendering and reporting layers.
use crate::measure::{ImageSummary, StatusCounts};
use serde::{Deserialize, Serialize};

/// A detected transition in one blade profile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgePoint {
    /// Pixel row of the peak.
    pub v: usize,
    /// Profile value (averaged gradient magnitude) at the peak.
    pub strength: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BladeStatus {
    Ok,
    OutOfTolerance,
    Closed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    Pass,
    Fail,
    /// Never produced by the analysis; reserved for callers' business rules.
    Warning,
}

/// Measurement of one blade pair.
///
/// Either both edges were found and every optional field is `Some`, or the
/// pair is [`BladeStatus::Closed`] and they are all `None`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BladeMeasurement {
    pub blade_pair_id: u32,
    pub v_superior_px: Option<usize>,
    pub v_inferior_px: Option<usize>,
    pub distance_superior_mm: Option<f64>,
    pub distance_inferior_mm: Option<f64>,
    pub field_size_mm: Option<f64>,
    /// Expected size closest to `field_size_mm`.
    pub nearest_expected_mm: Option<f64>,
    /// `field_size_mm - nearest_expected_mm`.
    pub deviation_mm: Option<f64>,
    pub status: BladeStatus,
    pub status_message: String,
}

impl BladeMeasurement {
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.status == BladeStatus::Closed
    }
}

/// A blade pair that could not be scanned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BladeWarning {
    pub blade_pair_id: u32,
    pub message: String,
}

/// Everything measured on one image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// One entry per scan position, sorted by `blade_pair_id`.
    pub measurements: Vec<BladeMeasurement>,
    pub counts: StatusCounts,
    pub overall: OverallStatus,
    pub summary: ImageSummary,
    pub warnings: Vec<BladeWarning>,
}

impl AnalysisResult {
    pub fn measurement(&self, blade_pair_id: u32) -> Option<&BladeMeasurement> {
        self.measurements
            .binary_search_by_key(&blade_pair_id, |m| m.blade_pair_id)
            .ok()
            .map(|idx| &self.measurements[idx])
    }
}
