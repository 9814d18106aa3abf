//! Per-image averages used for reporting and position identification.
use crate::types::BladeMeasurement;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSummary {
    /// Mean superior edge distance over measured blades (mm).
    pub top_average_mm: Option<f64>,
    /// Mean inferior edge distance over measured blades (mm).
    pub bottom_average_mm: Option<f64>,
    pub average_field_size_mm: Option<f64>,
    /// Blades with both edges found.
    pub detected_count: usize,
    /// Mean field size rounded to the nearest 10 mm.
    pub nominal_field_size_mm: Option<f64>,
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

impl ImageSummary {
    pub fn from_measurements(measurements: &[BladeMeasurement]) -> Self {
        let measured: Vec<&BladeMeasurement> = measurements
            .iter()
            .filter(|m| m.field_size_mm.is_some())
            .collect();
        let top = mean(measured.iter().filter_map(|m| m.distance_superior_mm));
        let bottom = mean(measured.iter().filter_map(|m| m.distance_inferior_mm));
        let size = mean(measured.iter().filter_map(|m| m.field_size_mm));
        Self {
            top_average_mm: top,
            bottom_average_mm: bottom,
            average_field_size_mm: size,
            detected_count: measured.len(),
            nominal_field_size_mm: size.map(|s| (s / 10.0).round() * 10.0),
        }
    }

    /// `(top, bottom)` when both averages exist.
    pub fn averages(&self) -> Option<(f64, f64)> {
        self.top_average_mm.zip(self.bottom_average_mm)
    }
}
