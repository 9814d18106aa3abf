//! Blade scan positions and the per-blade edge search.
//!
//! Every blade pair is scanned along a vertical strip of columns (its
//! footprint). The strip's gradient magnitude, averaged across columns,
//! gives a 1-D profile over the search window whose two crests are the
//! superior and inferior leaf tips.
//!
//! Submodules
//! - [`table`]: [`ScanPosition`]/[`ScanTable`] and generation from a
//!   [`LeafBank`] description.
//! - [`extract`]: footprint geometry and column-averaged profiles.
//! - [`peaks`]: candidate search and minimum-separation merging.
//! - [`blades`]: the per-blade driver [`find_blade_edges`].

pub mod blades;
pub mod extract;
pub mod peaks;
pub mod table;

pub use blades::{find_blade_edges, BladeEdges, BladeEdgeMap, EdgeSearch};
pub use extract::{column_profile, Footprint, SearchWindow};
pub use peaks::{find_candidates, merge_candidates, select_edges};
pub use table::{LeafBank, ScanPosition, ScanTable};

use crate::edges::GradientKernel;
use serde::{Deserialize, Serialize};

/// Parameters of the edge search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeSearchOptions {
    /// Candidates closer than this many rows collapse into the stronger one.
    pub min_separation_px: usize,
    /// Peaks must exceed `min + fraction × (max − min)` of the ROI range.
    pub detection_threshold_fraction: f32,
    pub gradient: GradientKernel,
    /// Rows searched above `center_v`.
    pub search_above_px: f64,
    /// Rows searched below `center_v`.
    pub search_below_px: f64,
    /// Columns ignored at the left/right image border when computing the
    /// threshold range.
    pub roi_border_px: usize,
}

impl Default for EdgeSearchOptions {
    fn default() -> Self {
        Self {
            min_separation_px: 23,
            detection_threshold_fraction: 0.5,
            gradient: GradientKernel::CentralDifference,
            search_above_px: 226.0,
            search_below_px: 214.0,
            roi_border_px: 5,
        }
    }
}
