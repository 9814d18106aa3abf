//! Analyzer pipeline driving one image end-to-end.
//!
//! ```no_run
//! use leaf_position_qc::prelude::*;
//!
//! # fn example(raw: RawImage) -> Result<(), AnalysisError> {
//! let calibration = Calibration::default();
//! let table = ScanTable::from_leaf_bank(&LeafBank::default(), &calibration)?;
//! let analyzer = LeafAnalyzer::new(AnalysisParams::default());
//! let report = analyzer.process_with_diagnostics(&raw, &calibration, &table)?;
//! println!("{}", report.summary_line());
//! # Ok(())
//! # }
//! ```
use super::params::AnalysisParams;
use crate::calibration::Calibration;
use crate::diagnostics::{
    elapsed_ms, AnalysisReport, InputDescriptor, PipelineTrace, TimingBreakdown,
};
use crate::error::AnalysisError;
use crate::image::RawImage;
use crate::measure::{classify_overall, compute_measurement, ImageSummary, StatusCounts};
use crate::preprocess::{preprocess_timed, NormalizedImage};
use crate::profile::{EdgeSearch, ScanTable};
use crate::types::{AnalysisResult, BladeMeasurement, BladeWarning};
use log::debug;
use std::time::Instant;

/// Blade-pair analyzer. Holds only immutable parameters, so one instance
/// can process any number of images (also from several threads).
#[derive(Clone, Debug, Default)]
pub struct LeafAnalyzer {
    params: AnalysisParams,
}

impl LeafAnalyzer {
    pub fn new(params: AnalysisParams) -> Self {
        Self { params }
    }

    /// Analyze one image and return the measurements.
    pub fn process(
        &self,
        raw: &RawImage,
        calibration: &Calibration,
        table: &ScanTable,
    ) -> Result<AnalysisResult, AnalysisError> {
        self.process_with_diagnostics(raw, calibration, table)
            .map(|report| report.result)
    }

    /// Analyze one image and return the result with a pipeline trace.
    pub fn process_with_diagnostics(
        &self,
        raw: &RawImage,
        calibration: &Calibration,
        table: &ScanTable,
    ) -> Result<AnalysisReport, AnalysisError> {
        self.process_with_image(raw, calibration, table)
            .map(|(report, _)| report)
    }

    /// Like [`process_with_diagnostics`](Self::process_with_diagnostics),
    /// also handing back the preprocessed image the edges were found on.
    pub fn process_with_image(
        &self,
        raw: &RawImage,
        calibration: &Calibration,
        table: &ScanTable,
    ) -> Result<(AnalysisReport, NormalizedImage), AnalysisError> {
        self.params.validate()?;
        calibration.validate()?;
        debug!(
            "LeafAnalyzer::process start w={} h={} blades={}",
            raw.w,
            raw.h,
            table.len()
        );
        let total_start = Instant::now();
        let mut timings = TimingBreakdown::default();
        let options = &self.params.preprocess;

        let image = preprocess_timed(raw, options, &mut timings)?;

        let stage = Instant::now();
        let search = EdgeSearch::prepare(&image, calibration, &self.params.edges);
        timings.push_since("gradient", stage);
        let stage = Instant::now();
        let edges = search.scan_all(table);
        timings.push_since("profiles", stage);

        let stage = Instant::now();
        let tolerance = &self.params.tolerance;
        let mut warnings = Vec::new();
        let measurements: Vec<BladeMeasurement> = edges
            .values()
            .map(|blade| match &blade.skipped {
                Some(reason) => {
                    warnings.push(BladeWarning {
                        blade_pair_id: blade.blade_pair_id,
                        message: reason.clone(),
                    });
                    BladeMeasurement::skipped(blade.blade_pair_id, reason)
                }
                None => compute_measurement(
                    blade.blade_pair_id,
                    blade.pair(),
                    calibration,
                    &tolerance.expected_sizes_mm,
                    tolerance.tolerance_mm,
                ),
            })
            .collect();
        let counts = StatusCounts::from_measurements(&measurements);
        let overall = classify_overall(&measurements);
        let summary = ImageSummary::from_measurements(&measurements);
        timings.push_since("measure", stage);
        timings.total_ms = elapsed_ms(total_start);

        debug!(
            "LeafAnalyzer::process done overall={:?} ok={} oot={} closed={} skipped={} in {:.2} ms",
            overall,
            counts.ok,
            counts.out_of_tolerance,
            counts.closed,
            warnings.len(),
            timings.total_ms
        );

        let (min_value, max_value) = raw.min_max().unwrap_or_default();
        let threshold = search.threshold();
        let trace = PipelineTrace {
            input: InputDescriptor {
                width: raw.w,
                height: raw.h,
                min_value,
                max_value,
                enhance_contrast: options.enhance_contrast,
                sharpen: options.sharpen,
                gradient: self.params.edges.gradient,
            },
            timings,
            threshold: threshold.is_finite().then_some(threshold),
            window: search.window(),
            blades: edges.into_values().collect(),
        };
        let report = AnalysisReport {
            result: AnalysisResult {
                measurements,
                counts,
                overall,
                summary,
                warnings,
            },
            trace,
        };
        Ok((report, image))
    }
}
