use crate::calibration::Calibration;
use crate::error::AnalysisError;
use crate::profile::LeafBank;
use crate::AnalysisParams;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Analysis report (result and trace) as pretty JSON.
    pub json_out: Option<PathBuf>,
    /// Edge overlay on the normalized image.
    pub overlay_png: Option<PathBuf>,
    /// The normalized image itself, as 8-bit gray.
    pub normalized_png: Option<PathBuf>,
}

/// Detector plane spacing and source distances, from the image header.
///
/// When present, replaces `calibration.pixel_spacing_mm` by the isocentre
/// spacing derived from it.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct ImagerGeometry {
    pub plane_spacing_mm: (f64, f64),
    pub sad_mm: f64,
    pub sid_mm: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RuntimeConfig {
    pub input_path: PathBuf,
    #[serde(default)]
    pub calibration: Calibration,
    #[serde(default)]
    pub imager: Option<ImagerGeometry>,
    #[serde(default)]
    pub leaf_bank: LeafBank,
    #[serde(default)]
    pub params: AnalysisParams,
    #[serde(default)]
    pub output: OutputConfig,
}

impl RuntimeConfig {
    /// Calibration to analyze with, after applying `imager` if given.
    pub fn resolve_calibration(&self) -> Result<Calibration, AnalysisError> {
        match self.imager {
            Some(geom) => Calibration::from_imager_geometry(
                geom.plane_spacing_mm,
                geom.sad_mm,
                geom.sid_mm,
                self.calibration.center_u,
                self.calibration.center_v,
            ),
            None => {
                self.calibration.validate()?;
                Ok(self.calibration)
            }
        }
    }
}

pub fn load_config(path: &Path) -> Result<RuntimeConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    parse_config(&contents).map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

pub fn parse_config(contents: &str) -> Result<RuntimeConfig, serde_json::Error> {
    serde_json::from_str(contents)
}
