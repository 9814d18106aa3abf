//! Diagnostics data model returned next to the analysis result.
//!
//! [`AnalysisReport`] bundles the [`AnalysisResult`](crate::AnalysisResult)
//! with a [`PipelineTrace`]: stage timings, the detection threshold, the
//! search window and the candidate/retained edge points of every blade.

pub mod pipeline;
pub mod timing;

pub use pipeline::{AnalysisReport, InputDescriptor, PipelineTrace};
pub use timing::{elapsed_ms, StageTiming, TimingBreakdown};
