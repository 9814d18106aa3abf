//! Footprint geometry and column-averaged profiles.
use super::{EdgeSearchOptions, ScanPosition};
use crate::calibration::Calibration;
use crate::image::{ImageF32, ImageView};
use serde::Serialize;

/// Half-open row range searched for edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SearchWindow {
    pub row0: usize,
    pub row1: usize,
}

impl SearchWindow {
    /// Rows `round(center_v - above) .. round(center_v + below)`, clipped to
    /// the image. `None` when nothing of the window lies inside.
    pub fn around_center(
        calibration: &Calibration,
        options: &EdgeSearchOptions,
        height: usize,
    ) -> Option<Self> {
        let start = (calibration.center_v - options.search_above_px).round();
        let end = (calibration.center_v + options.search_below_px).round();
        let row0 = start.max(0.0) as usize;
        let row1 = (end.max(0.0) as usize).min(height);
        (row0 < row1).then_some(Self { row0, row1 })
    }
}

/// Half-open column range covered by one blade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Footprint {
    pub col0: usize,
    pub col1: usize,
}

impl Footprint {
    /// Columns centred at `center_u + offset_u_px`, `round(width_px)` wide.
    ///
    /// Returns the signed range as an error when it does not lie entirely
    /// inside `0..width`. Bounds are checked before any integer conversion,
    /// so arbitrarily large offsets are rejected, never wrapped.
    pub fn locate(
        position: &ScanPosition,
        calibration: &Calibration,
        width: usize,
    ) -> Result<Self, (f64, f64)> {
        let span = position.width_px.round().max(1.0);
        let center = calibration.center_u + position.offset_u_px;
        let col0 = (center - 0.5 * position.width_px).round();
        let col1 = col0 + span;
        if !(col0 >= 0.0 && col1 <= width as f64) {
            return Err((col0, col1));
        }
        Ok(Self {
            col0: col0 as usize,
            col1: col1 as usize,
        })
    }

    /// Centre column, where closed blades are marked on the overlay.
    pub fn center(&self) -> f64 {
        0.5 * (self.col0 + self.col1) as f64 - 0.5
    }
}

/// Mean of `image` across the footprint for every row of the window.
pub fn column_profile(image: &ImageF32, footprint: Footprint, window: SearchWindow) -> Vec<f32> {
    let cols = footprint.col1 - footprint.col0;
    let inv = 1.0 / cols as f32;
    (window.row0..window.row1)
        .map(|y| {
            let sum: f32 = image.row(y)[footprint.col0..footprint.col1].iter().sum();
            sum * inv
        })
        .collect()
}
