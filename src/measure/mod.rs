//! Pixel edges → millimetres → tolerance status.
//!
//! Distances are signed with the image convention (rows grow downward):
//! `distance = (v - center_v) × pixel_spacing_mm`, negative above the
//! centre. The opening is `distance_inferior - distance_superior`.
//!
//! A blade is OK when its opening lies within `tolerance_mm` (inclusive) of
//! the nearest expected size, OUT_OF_TOLERANCE otherwise, and CLOSED when
//! either edge is missing.

pub mod classify;
pub mod summary;

pub use classify::{classify_overall, StatusCounts};
pub use summary::ImageSummary;

use crate::calibration::Calibration;
use crate::error::AnalysisError;
use crate::types::{BladeMeasurement, BladeStatus, EdgePoint};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToleranceOptions {
    /// Nominal openings a blade pair may be set to (mm).
    pub expected_sizes_mm: Vec<f64>,
    /// Accepted deviation from the nearest nominal opening (mm, inclusive).
    pub tolerance_mm: f64,
}

impl Default for ToleranceOptions {
    fn default() -> Self {
        Self {
            expected_sizes_mm: vec![20.0, 30.0, 40.0],
            tolerance_mm: 1.0,
        }
    }
}

impl ToleranceOptions {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.expected_sizes_mm.is_empty() {
            return Err(AnalysisError::InvalidParameters(
                "at least one expected field size is required".to_string(),
            ));
        }
        if let Some(bad) = self
            .expected_sizes_mm
            .iter()
            .find(|s| !s.is_finite() || **s <= 0.0)
        {
            return Err(AnalysisError::InvalidParameters(format!(
                "expected field sizes must be positive, got {bad}"
            )));
        }
        if !self.tolerance_mm.is_finite() || self.tolerance_mm < 0.0 {
            return Err(AnalysisError::InvalidParameters(format!(
                "tolerance must be non-negative, got {}",
                self.tolerance_mm
            )));
        }
        Ok(())
    }
}

/// Nearest expected size; ties keep the earlier entry.
fn nearest_expected(size_mm: f64, expected_sizes_mm: &[f64]) -> Option<f64> {
    let mut best: Option<(f64, f64)> = None;
    for &expected in expected_sizes_mm {
        let diff = (size_mm - expected).abs();
        if best.map_or(true, |(_, d)| diff < d) {
            best = Some((expected, diff));
        }
    }
    best.map(|(expected, _)| expected)
}

/// Measure one blade pair from its (superior, inferior) edges.
///
/// Edges are ordered by row before use, so swapped inputs measure the same
/// opening.
pub fn compute_measurement(
    blade_pair_id: u32,
    edges: (Option<EdgePoint>, Option<EdgePoint>),
    calibration: &Calibration,
    expected_sizes_mm: &[f64],
    tolerance_mm: f64,
) -> BladeMeasurement {
    let (Some(a), Some(b)) = edges else {
        return closed(blade_pair_id, format!("Blade {blade_pair_id}: closed or not detected"));
    };
    let (sup, inf) = if a.v <= b.v { (a, b) } else { (b, a) };

    let distance_sup = calibration.row_to_mm(sup.v as f64);
    let distance_inf = calibration.row_to_mm(inf.v as f64);
    let field_size = distance_inf - distance_sup;

    let nearest = nearest_expected(field_size, expected_sizes_mm);
    let deviation = nearest.map(|n| field_size - n);
    let within = deviation.is_some_and(|d| d.abs() <= tolerance_mm);
    let status = if within {
        BladeStatus::Ok
    } else {
        BladeStatus::OutOfTolerance
    };
    let status_message = match (nearest, deviation) {
        (Some(n), Some(d)) => format!(
            "Blade {}: Length={:.2}mm, nearest expected={}mm, deviation={:.2}mm",
            blade_pair_id, field_size, n, d
        ),
        _ => format!(
            "Blade {blade_pair_id}: Length={field_size:.2}mm, no expected size configured"
        ),
    };

    BladeMeasurement {
        blade_pair_id,
        v_superior_px: Some(sup.v),
        v_inferior_px: Some(inf.v),
        distance_superior_mm: Some(distance_sup),
        distance_inferior_mm: Some(distance_inf),
        field_size_mm: Some(field_size),
        nearest_expected_mm: nearest,
        deviation_mm: deviation,
        status,
        status_message,
    }
}

fn closed(blade_pair_id: u32, status_message: String) -> BladeMeasurement {
    BladeMeasurement {
        blade_pair_id,
        v_superior_px: None,
        v_inferior_px: None,
        distance_superior_mm: None,
        distance_inferior_mm: None,
        field_size_mm: None,
        nearest_expected_mm: None,
        deviation_mm: None,
        status: BladeStatus::Closed,
        status_message,
    }
}

impl BladeMeasurement {
    /// Record for a scan position that could not be searched.
    pub fn skipped(blade_pair_id: u32, reason: &str) -> Self {
        closed(
            blade_pair_id,
            format!("Blade {blade_pair_id}: not measured, {reason}"),
        )
    }
}
