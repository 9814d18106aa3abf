use crate::calibration::Calibration;
use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One blade pair to scan.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanPosition {
    pub blade_pair_id: u32,
    /// Horizontal offset of the footprint centre from `center_u` (px).
    pub offset_u_px: f64,
    /// Footprint width (px) averaged into the profile.
    pub width_px: f64,
}

impl ScanPosition {
    pub fn new(blade_pair_id: u32, offset_u_px: f64, width_px: f64) -> Self {
        Self {
            blade_pair_id,
            offset_u_px,
            width_px,
        }
    }
}

/// Ordered scan positions with unique blade pair ids.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScanTable {
    positions: Vec<ScanPosition>,
}

impl ScanTable {
    pub fn new(positions: Vec<ScanPosition>) -> Result<Self, AnalysisError> {
        let mut seen = BTreeSet::new();
        for pos in &positions {
            if !seen.insert(pos.blade_pair_id) {
                return Err(AnalysisError::InvalidParameters(format!(
                    "blade pair {} appears more than once in the scan table",
                    pos.blade_pair_id
                )));
            }
            if !pos.offset_u_px.is_finite() || !pos.width_px.is_finite() || pos.width_px < 1.0 {
                return Err(AnalysisError::InvalidParameters(format!(
                    "blade pair {}: offset {} / width {} px is not a usable footprint",
                    pos.blade_pair_id, pos.offset_u_px, pos.width_px
                )));
            }
        }
        Ok(Self { positions })
    }

    /// Scan positions for a contiguous bank of leaves.
    ///
    /// The leaf pitch in pixels is `leaf_width_mm / pixel_spacing_mm`. Pair
    /// `first_pair_right_of_center` sits immediately right of the beam axis,
    /// so pair `p` is centred at `(p - first_right + 0.5) × pitch`.
    pub fn from_leaf_bank(
        bank: &LeafBank,
        calibration: &Calibration,
    ) -> Result<Self, AnalysisError> {
        calibration.validate()?;
        if bank.first_pair > bank.last_pair {
            return Err(AnalysisError::InvalidParameters(format!(
                "leaf bank is empty: pairs {}..={}",
                bank.first_pair, bank.last_pair
            )));
        }
        if !bank.leaf_width_mm.is_finite() || bank.leaf_width_mm <= 0.0 {
            return Err(AnalysisError::InvalidParameters(format!(
                "leaf width must be positive, got {}",
                bank.leaf_width_mm
            )));
        }
        let pitch = calibration.mm_to_px(bank.leaf_width_mm);
        let footprint = bank.footprint_px.unwrap_or(pitch).min(pitch);
        let positions = (bank.first_pair..=bank.last_pair)
            .map(|pair| {
                let index = pair as f64 - bank.first_pair_right_of_center as f64;
                ScanPosition::new(pair, (index + 0.5) * pitch, footprint)
            })
            .collect();
        Self::new(positions)
    }

    pub fn positions(&self) -> &[ScanPosition] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn get(&self, blade_pair_id: u32) -> Option<&ScanPosition> {
        self.positions
            .iter()
            .find(|p| p.blade_pair_id == blade_pair_id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScanPosition> {
        self.positions.iter()
    }
}

impl<'a> IntoIterator for &'a ScanTable {
    type Item = &'a ScanPosition;
    type IntoIter = std::slice::Iter<'a, ScanPosition>;

    fn into_iter(self) -> Self::IntoIter {
        self.positions.iter()
    }
}

/// Description of the scanned part of the leaf bank.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeafBank {
    pub first_pair: u32,
    pub last_pair: u32,
    /// First pair whose footprint lies right of `center_u`.
    pub first_pair_right_of_center: u32,
    /// Leaf width projected to the isocentre (mm).
    pub leaf_width_mm: f64,
    /// Columns averaged per leaf; `None` uses the full pitch.
    pub footprint_px: Option<f64>,
}

impl Default for LeafBank {
    fn default() -> Self {
        Self {
            first_pair: 27,
            last_pair: 54,
            first_pair_right_of_center: 41,
            leaf_width_mm: 7.18,
            footprint_px: Some(30.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bank_straddles_the_centre() {
        let calib = Calibration::default();
        let table = ScanTable::from_leaf_bank(&LeafBank::default(), &calib).unwrap();
        assert_eq!(table.len(), 28);
        let pitch = 7.18 / 0.216;
        let p40 = table.get(40).unwrap();
        let p41 = table.get(41).unwrap();
        assert!((p40.offset_u_px + 0.5 * pitch).abs() < 1e-9);
        assert!((p41.offset_u_px - 0.5 * pitch).abs() < 1e-9);
        assert!((table.get(27).unwrap().offset_u_px + 13.5 * pitch).abs() < 1e-9);
        assert_eq!(p41.width_px, 30.0);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let positions = vec![ScanPosition::new(3, 0.0, 10.0), ScanPosition::new(3, 20.0, 10.0)];
        assert!(matches!(
            ScanTable::new(positions),
            Err(AnalysisError::InvalidParameters(_))
        ));
    }

    #[test]
    fn footprint_never_exceeds_pitch() {
        let calib = Calibration::new(0.5, 100.0, 100.0);
        let bank = LeafBank {
            first_pair: 1,
            last_pair: 4,
            first_pair_right_of_center: 3,
            leaf_width_mm: 5.0,
            footprint_px: Some(25.0),
        };
        let table = ScanTable::from_leaf_bank(&bank, &calib).unwrap();
        assert!(table.iter().all(|p| p.width_px == 10.0));
        let offsets: Vec<f64> = table.iter().map(|p| p.offset_u_px).collect();
        assert_eq!(offsets, vec![-15.0, -5.0, 5.0, 15.0]);
    }
}
