use crate::types::{BladeMeasurement, BladeStatus, OverallStatus};
use serde::{Deserialize, Serialize};

/// Number of blades per status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub total: usize,
    pub ok: usize,
    pub out_of_tolerance: usize,
    pub closed: usize,
}

impl StatusCounts {
    pub fn from_measurements(measurements: &[BladeMeasurement]) -> Self {
        measurements.iter().fold(Self::default(), |mut acc, m| {
            acc.total += 1;
            match m.status {
                BladeStatus::Ok => acc.ok += 1,
                BladeStatus::OutOfTolerance => acc.out_of_tolerance += 1,
                BladeStatus::Closed => acc.closed += 1,
            }
            acc
        })
    }
}

/// FAIL as soon as one blade is out of tolerance. Closed blades alone do not
/// fail an image, and an empty set passes.
pub fn classify_overall(measurements: &[BladeMeasurement]) -> OverallStatus {
    if measurements
        .iter()
        .any(|m| m.status == BladeStatus::OutOfTolerance)
    {
        OverallStatus::Fail
    } else {
        OverallStatus::Pass
    }
}
