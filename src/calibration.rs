//! Pixel-to-millimetre calibration of the portal imager.
use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// Geometry needed to turn pixel rows into distances at the isocentre.
///
/// `center_u`/`center_v` are the pixel coordinates of the beam axis
/// (column, row). Rows grow downward.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Physical size of one pixel projected to the isocentre plane (mm).
    pub pixel_spacing_mm: f64,
    pub center_u: f64,
    pub center_v: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            pixel_spacing_mm: 0.216,
            center_u: 511.03,
            center_v: 652.75,
        }
    }
}

impl Calibration {
    pub fn new(pixel_spacing_mm: f64, center_u: f64, center_v: f64) -> Self {
        Self {
            pixel_spacing_mm,
            center_u,
            center_v,
        }
    }

    /// Derive the isocentre pixel spacing from the imager plane spacing and
    /// the source distances: `mean(spacing) * SAD / SID`.
    pub fn from_imager_geometry(
        plane_spacing_mm: (f64, f64),
        sad_mm: f64,
        sid_mm: f64,
        center_u: f64,
        center_v: f64,
    ) -> Result<Self, AnalysisError> {
        let values = [plane_spacing_mm.0, plane_spacing_mm.1, sad_mm, sid_mm];
        if values.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(AnalysisError::InvalidParameters(format!(
                "imager geometry must be positive: spacing={:?}, SAD={}, SID={}",
                plane_spacing_mm, sad_mm, sid_mm
            )));
        }
        let detector_spacing = 0.5 * (plane_spacing_mm.0 + plane_spacing_mm.1);
        let calibration = Self::new(detector_spacing * sad_mm / sid_mm, center_u, center_v);
        calibration.validate()?;
        Ok(calibration)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !self.pixel_spacing_mm.is_finite() || self.pixel_spacing_mm <= 0.0 {
            return Err(AnalysisError::InvalidParameters(format!(
                "pixel spacing must be positive, got {}",
                self.pixel_spacing_mm
            )));
        }
        if !self.center_u.is_finite() || !self.center_v.is_finite() {
            return Err(AnalysisError::InvalidParameters(format!(
                "detector centre must be finite, got ({}, {})",
                self.center_u, self.center_v
            )));
        }
        Ok(())
    }

    /// Signed distance (mm) of pixel row `v` from the centre; negative above.
    #[inline]
    pub fn row_to_mm(&self, v: f64) -> f64 {
        (v - self.center_v) * self.pixel_spacing_mm
    }

    #[inline]
    pub fn mm_to_px(&self, mm: f64) -> f64 {
        mm / self.pixel_spacing_mm
    }
}
