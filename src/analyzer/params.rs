//! Parameter types configuring the analysis stages.
//!
//! Every struct deserializes with `#[serde(default)]`, so a JSON config only
//! needs the fields it overrides.

use crate::error::AnalysisError;
use crate::measure::ToleranceOptions;
use crate::preprocess::PreprocessOptions;
use crate::profile::EdgeSearchOptions;
use serde::{Deserialize, Serialize};

/// Analyzer-wide parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    pub preprocess: PreprocessOptions,
    pub edges: EdgeSearchOptions,
    pub tolerance: ToleranceOptions,
}

fn invalid(msg: String) -> AnalysisError {
    AnalysisError::InvalidParameters(msg)
}

impl AnalysisParams {
    /// Reject parameter combinations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.tolerance.validate()?;

        let fraction = self.edges.detection_threshold_fraction;
        if !(0.0..=1.0).contains(&fraction) {
            return Err(invalid(format!(
                "detection threshold fraction must lie in [0, 1], got {fraction}"
            )));
        }
        let (above, below) = (self.edges.search_above_px, self.edges.search_below_px);
        if !above.is_finite() || !below.is_finite() || above + below <= 0.0 {
            return Err(invalid(format!(
                "search window {above} px above / {below} px below the centre is empty"
            )));
        }

        let clahe = &self.preprocess.clahe;
        if !clahe.clip_limit.is_finite() || clahe.clip_limit < 0.0 {
            return Err(invalid(format!(
                "CLAHE clip limit must be non-negative, got {}",
                clahe.clip_limit
            )));
        }
        if clahe.tiles_x == 0 || clahe.tiles_y == 0 {
            return Err(invalid(format!(
                "CLAHE tile grid must be at least 1x1, got {}x{}",
                clahe.tiles_x, clahe.tiles_y
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(AnalysisParams::default().validate(), Ok(()));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut params = AnalysisParams::default();
        params.edges.detection_threshold_fraction = 1.5;
        assert!(params.validate().is_err());

        let mut params = AnalysisParams::default();
        params.edges.detection_threshold_fraction = f32::NAN;
        assert!(params.validate().is_err());

        let mut params = AnalysisParams::default();
        params.preprocess.clahe.clip_limit = -1.0;
        assert!(params.validate().is_err());

        let mut params = AnalysisParams::default();
        params.tolerance.expected_sizes_mm.clear();
        assert!(matches!(
            params.validate(),
            Err(AnalysisError::InvalidParameters(_))
        ));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let params: AnalysisParams = serde_json::from_str(
            r#"{ "edges": { "min_separation_px": 10 }, "tolerance": { "tolerance_mm": 0.5 } }"#,
        )
        .unwrap();
        assert_eq!(params.edges.min_separation_px, 10);
        assert_eq!(params.edges.detection_threshold_fraction, 0.5);
        assert_eq!(params.tolerance.tolerance_mm, 0.5);
        assert_eq!(params.tolerance.expected_sizes_mm, vec![20.0, 30.0, 40.0]);
        assert!(!params.preprocess.enhance_contrast);
    }
}
