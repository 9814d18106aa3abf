use super::TimingBreakdown;
use crate::edges::GradientKernel;
use crate::profile::{BladeEdges, SearchWindow};
use crate::types::AnalysisResult;
use serde::Serialize;

/// Result produced by [`LeafAnalyzer::process_with_diagnostics`](crate::LeafAnalyzer).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub result: AnalysisResult,
    pub trace: PipelineTrace,
}

impl AnalysisReport {
    /// One-line summary for logs and the CLI.
    pub fn summary_line(&self) -> String {
        let counts = &self.result.counts;
        format!(
            "{:?}: {} blades, {} ok, {} out of tolerance, {} closed, nominal {} ({:.1} ms)",
            self.result.overall,
            counts.total,
            counts.ok,
            counts.out_of_tolerance,
            counts.closed,
            format_optional_mm(self.result.summary.nominal_field_size_mm),
            self.trace.timings.total_ms
        )
    }
}

fn format_optional_mm(val: Option<f64>) -> String {
    val.map(|v| format!("{v:.0} mm"))
        .unwrap_or_else(|| "-".to_string())
}

/// Internal execution record of one analysis.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTrace {
    pub input: InputDescriptor,
    pub timings: TimingBreakdown,
    /// Gradient threshold; `None` when the search window missed the image.
    pub threshold: Option<f32>,
    pub window: Option<SearchWindow>,
    /// Per-blade search records, sorted by blade pair id.
    pub blades: Vec<BladeEdges>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub width: usize,
    pub height: usize,
    pub min_value: u16,
    pub max_value: u16,
    pub enhance_contrast: bool,
    pub sharpen: bool,
    pub gradient: GradientKernel,
}
