//! Peak search over a 1-D profile.
//!
//! Two explicit passes:
//!
//! 1. [`find_candidates`] lists every local maximum strictly above the
//!    threshold. A maximum needs a strict rise before it and a strict drop
//!    after it; a flat crest reports its first row.
//! 2. [`merge_candidates`] enforces the minimum separation. Candidates are
//!    visited strongest first and kept only when no kept candidate lies
//!    closer than `min_separation_px`. Equal strengths keep the upper
//!    (first encountered) row. The outcome does not depend on the scan
//!    direction.
//!
//! [`select_edges`] then picks the superior/inferior pair: the nearest
//! retained candidate above the beam centre and the nearest below it.
use crate::types::EdgePoint;
use std::cmp::Ordering;

/// Local maxima of `profile` above `threshold`; `first_row` is the image row
/// of `profile[0]`.
pub fn find_candidates(profile: &[f32], first_row: usize, threshold: f32) -> Vec<EdgePoint> {
    let n = profile.len();
    let mut candidates = Vec::new();
    let mut i = 1;
    while i + 1 < n {
        let value = profile[i];
        if value <= threshold || value <= profile[i - 1] {
            i += 1;
            continue;
        }
        let mut end = i;
        while end + 1 < n && profile[end + 1] == value {
            end += 1;
        }
        if end + 1 < n && profile[end + 1] < value {
            candidates.push(EdgePoint {
                v: first_row + i,
                strength: value,
            });
        }
        i = end + 1;
    }
    candidates
}

/// Strongest first; ties go to the upper row.
fn by_strength(a: &EdgePoint, b: &EdgePoint) -> Ordering {
    b.strength
        .partial_cmp(&a.strength)
        .unwrap_or(Ordering::Equal)
        .then(a.v.cmp(&b.v))
}

/// Collapse candidates closer than `min_separation_px`, keeping the stronger.
///
/// The result is sorted by row.
pub fn merge_candidates(candidates: &[EdgePoint], min_separation_px: usize) -> Vec<EdgePoint> {
    let mut order = candidates.to_vec();
    order.sort_by(by_strength);
    let mut kept: Vec<EdgePoint> = Vec::with_capacity(order.len());
    for cand in order {
        if kept.iter().all(|k| k.v.abs_diff(cand.v) >= min_separation_px) {
            kept.push(cand);
        }
    }
    kept.sort_by_key(|p| p.v);
    kept
}

/// Superior (upper) and inferior (lower) edge from merged candidates.
///
/// Moving away from `center_row`, the first candidate met upward is the
/// superior edge and the first met downward the inferior one. When every
/// candidate lies on one side of the centre, the pair is taken from the two
/// strongest (ties: upper row), ordered by row. Fewer than two candidates
/// means the pair is closed.
pub fn select_edges(merged: &[EdgePoint], center_row: f64) -> Option<(EdgePoint, EdgePoint)> {
    if merged.len() < 2 {
        return None;
    }
    let mut rows = merged.to_vec();
    rows.sort_by_key(|p| p.v);
    let above = rows.iter().rev().find(|p| (p.v as f64) < center_row);
    let below = rows.iter().find(|p| (p.v as f64) >= center_row);
    if let (Some(&sup), Some(&inf)) = (above, below) {
        return Some((sup, inf));
    }
    let mut strongest = rows;
    strongest.sort_by(by_strength);
    let (a, b) = (strongest[0], strongest[1]);
    Some(if a.v <= b.v { (a, b) } else { (b, a) })
}
