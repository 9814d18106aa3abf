use super::extract::{column_profile, Footprint, SearchWindow};
use super::peaks::{find_candidates, merge_candidates, select_edges};
use super::{EdgeSearchOptions, ScanPosition, ScanTable};
use crate::calibration::Calibration;
use crate::edges::gradient_magnitude;
use crate::image::ImageF32;
use crate::preprocess::NormalizedImage;
use crate::types::EdgePoint;
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Edge search outcome for one blade pair.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BladeEdges {
    pub blade_pair_id: u32,
    pub superior: Option<EdgePoint>,
    pub inferior: Option<EdgePoint>,
    /// Columns averaged; `None` when the position could not be scanned.
    pub footprint: Option<Footprint>,
    /// Local maxima above threshold before merging.
    pub candidates: Vec<EdgePoint>,
    /// Candidates left after the minimum-separation merge.
    pub retained: Vec<EdgePoint>,
    /// Why the position was skipped, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

impl BladeEdges {
    fn skipped(blade_pair_id: u32, reason: String) -> Self {
        Self {
            blade_pair_id,
            superior: None,
            inferior: None,
            footprint: None,
            candidates: Vec::new(),
            retained: Vec::new(),
            skipped: Some(reason),
        }
    }

    #[inline]
    pub fn pair(&self) -> (Option<EdgePoint>, Option<EdgePoint>) {
        (self.superior, self.inferior)
    }
}

pub type BladeEdgeMap = BTreeMap<u32, BladeEdges>;

/// Gradient image and threshold shared by every blade of one image.
pub struct EdgeSearch<'a> {
    magnitude: ImageF32,
    calibration: &'a Calibration,
    options: &'a EdgeSearchOptions,
    window: Option<SearchWindow>,
    threshold: f32,
}

impl<'a> EdgeSearch<'a> {
    /// Compute the gradient magnitude and the detection threshold over the
    /// ROI (search rows, columns minus the border).
    pub fn prepare(
        image: &NormalizedImage,
        calibration: &'a Calibration,
        options: &'a EdgeSearchOptions,
    ) -> Self {
        let magnitude = gradient_magnitude(image.as_image(), options.gradient);
        let window = SearchWindow::around_center(calibration, options, magnitude.h);
        let threshold = window
            .and_then(|win| {
                let border = if magnitude.w > 2 * options.roi_border_px {
                    options.roi_border_px
                } else {
                    0
                };
                magnitude.min_max_in(border, magnitude.w - border, win.row0, win.row1)
            })
            .map(|(lo, hi)| lo + options.detection_threshold_fraction * (hi - lo))
            .unwrap_or(f32::INFINITY);
        debug!(
            "edge search: window={:?} threshold={:.5} kernel={:?}",
            window, threshold, options.gradient
        );
        Self {
            magnitude,
            calibration,
            options,
            window,
            threshold,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn window(&self) -> Option<SearchWindow> {
        self.window
    }

    /// Search one blade pair. Never fails: problems become a skip reason.
    pub fn scan(&self, position: &ScanPosition) -> BladeEdges {
        let id = position.blade_pair_id;
        let Some(window) = self.window else {
            let reason = format!(
                "search window around row {:.2} lies outside the image",
                self.calibration.center_v
            );
            warn!("blade {id}: {reason}");
            return BladeEdges::skipped(id, reason);
        };
        let footprint = match Footprint::locate(position, self.calibration, self.magnitude.w) {
            Ok(fp) => fp,
            Err((col0, col1)) => {
                let reason = format!(
                    "scan columns {col0}..{col1} fall outside the image width {}",
                    self.magnitude.w
                );
                warn!("blade {id}: {reason}");
                return BladeEdges::skipped(id, reason);
            }
        };

        let profile = column_profile(&self.magnitude, footprint, window);
        let candidates = find_candidates(&profile, window.row0, self.threshold);
        let retained = merge_candidates(&candidates, self.options.min_separation_px);
        let (superior, inferior) = match select_edges(&retained, self.calibration.center_v) {
            Some((sup, inf)) => (Some(sup), Some(inf)),
            None => (None, None),
        };
        debug!(
            "blade {id}: cols {}..{} candidates={} retained={} edges={:?}/{:?}",
            footprint.col0,
            footprint.col1,
            candidates.len(),
            retained.len(),
            superior.map(|p| p.v),
            inferior.map(|p| p.v)
        );
        BladeEdges {
            blade_pair_id: id,
            superior,
            inferior,
            footprint: Some(footprint),
            candidates,
            retained,
            skipped: None,
        }
    }

    /// Search every position of the table; results keyed by blade pair id.
    pub fn scan_all(&self, table: &ScanTable) -> BladeEdgeMap {
        #[cfg(feature = "parallel")]
        let edges: Vec<BladeEdges> = table
            .positions()
            .par_iter()
            .map(|pos| self.scan(pos))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let edges: Vec<BladeEdges> = table.iter().map(|pos| self.scan(pos)).collect();

        edges.into_iter().map(|e| (e.blade_pair_id, e)).collect()
    }
}

/// Locate superior/inferior edges for every scan position of the table.
pub fn find_blade_edges(
    image: &NormalizedImage,
    table: &ScanTable,
    calibration: &Calibration,
    options: &EdgeSearchOptions,
) -> BladeEdgeMap {
    EdgeSearch::prepare(image, calibration, options).scan_all(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bright band over rows `top..bottom` in columns `band`, dark elsewhere.
    fn band_image(
        w: usize,
        h: usize,
        band: (usize, usize),
        top: usize,
        bottom: usize,
    ) -> NormalizedImage {
        NormalizedImage::from_image(ImageF32::from_fn(w, h, |x, y| {
            if x >= band.0 && x < band.1 && y >= top && y < bottom {
                1.0
            } else {
                0.0
            }
        }))
    }

    fn options(min_separation_px: usize) -> EdgeSearchOptions {
        EdgeSearchOptions {
            min_separation_px,
            search_above_px: 50.0,
            search_below_px: 50.0,
            roi_border_px: 0,
            ..Default::default()
        }
    }

    #[test]
    fn band_edges_are_found_on_the_first_plateau_row() {
        let image = band_image(60, 120, (0, 60), 40, 75);
        let calib = Calibration::new(0.5, 30.0, 60.0);
        let table = ScanTable::new(vec![ScanPosition::new(7, 0.0, 10.0)]).unwrap();
        let edges = find_blade_edges(&image, &table, &calib, &options(5));
        let blade = &edges[&7];
        assert_eq!(blade.superior.map(|p| p.v), Some(39));
        assert_eq!(blade.inferior.map(|p| p.v), Some(74));
        assert_eq!(blade.footprint, Some(Footprint { col0: 25, col1: 35 }));
    }

    #[test]
    fn narrow_band_collapses_under_large_separation() {
        let image = band_image(60, 120, (0, 60), 50, 58);
        let calib = Calibration::new(0.5, 30.0, 60.0);
        let table = ScanTable::new(vec![ScanPosition::new(1, 0.0, 10.0)]).unwrap();
        let edges = find_blade_edges(&image, &table, &calib, &options(10));
        assert_eq!(edges[&1].candidates.len(), 2);
        assert_eq!(edges[&1].retained.len(), 1);
        assert_eq!(edges[&1].pair(), (None, None));
    }

    #[test]
    fn positions_outside_the_image_are_skipped_not_fatal() {
        let image = band_image(60, 120, (0, 60), 40, 75);
        let calib = Calibration::new(0.5, 30.0, 60.0);
        let table = ScanTable::new(vec![
            ScanPosition::new(1, 0.0, 10.0),
            ScanPosition::new(2, 40.0, 10.0),
        ])
        .unwrap();
        let edges = find_blade_edges(&image, &table, &calib, &options(5));
        assert_eq!(edges.len(), 2);
        assert!(edges[&1].skipped.is_none());
        assert!(edges[&2].skipped.is_some());
        assert_eq!(edges[&2].pair(), (None, None));
    }
}
