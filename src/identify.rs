//! Match images of a leaf-position session to their reference positions.
//!
//! A session is six exposures with the field shifted to known (top, bottom)
//! edge distances. Each image is identified from its [`ImageSummary`]
//! averages by nearest Euclidean distance in the (top, bottom) plane.
//!
//! [`ImageSummary`]: crate::measure::ImageSummary
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Expected (top, bottom) edge distances of one reference position (mm).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceProfile {
    pub position: u32,
    pub top_mm: f64,
    pub bottom_mm: f64,
}

impl ReferenceProfile {
    pub const fn new(position: u32, top_mm: f64, bottom_mm: f64) -> Self {
        Self {
            position,
            top_mm,
            bottom_mm,
        }
    }

    fn distance(&self, top_mm: f64, bottom_mm: f64) -> f64 {
        (top_mm - self.top_mm).hypot(bottom_mm - self.bottom_mm)
    }
}

/// The six standard positions, 20 mm fields stepped from 40 mm above the
/// centre to 40 mm below it.
pub fn default_reference_profiles() -> Vec<ReferenceProfile> {
    vec![
        ReferenceProfile::new(1, -40.0, -20.0),
        ReferenceProfile::new(2, -30.0, -10.0),
        ReferenceProfile::new(3, -20.0, 0.0),
        ReferenceProfile::new(4, 0.0, 20.0),
        ReferenceProfile::new(5, 10.0, 30.0),
        ReferenceProfile::new(6, 20.0, 40.0),
    ]
}

/// Closest profile and its distance, skipping `excluded`. Ties keep the
/// earlier profile.
fn nearest(
    top_mm: f64,
    bottom_mm: f64,
    profiles: &[ReferenceProfile],
    excluded: Option<u32>,
) -> Option<(u32, f64)> {
    let mut best: Option<(u32, f64)> = None;
    for profile in profiles.iter().filter(|p| Some(p.position) != excluded) {
        let d = profile.distance(top_mm, bottom_mm);
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some((profile.position, d));
        }
    }
    best
}

/// Position whose profile is nearest to `(top_mm, bottom_mm)`, with the
/// distance. `None` only for an empty profile list.
pub fn identify_position(
    top_mm: f64,
    bottom_mm: f64,
    profiles: &[ReferenceProfile],
) -> Option<(u32, f64)> {
    let found = nearest(top_mm, bottom_mm, profiles, None);
    if let Some((position, distance)) = found {
        info!(
            "identify: (top={:.2}, bottom={:.2}) -> position {} (distance={:.2})",
            top_mm, bottom_mm, position, distance
        );
    }
    found
}

/// Input to [`identify_images`]: one image of the session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionImage {
    pub label: String,
    /// `(top_average_mm, bottom_average_mm)`; `None` when nothing was measured.
    pub averages: Option<(f64, f64)>,
}

/// Outcome for one image, in input order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Identification {
    pub label: String,
    pub position: Option<u32>,
    pub distance_mm: Option<f64>,
    /// Position first matched, when a conflict moved the image elsewhere.
    pub reassigned_from: Option<u32>,
}

/// Identify every image, then settle positions claimed by several images.
///
/// The image closest to a contested position keeps it (ties: earlier
/// image); the others move to their best position other than the contested
/// one. Conflicts are settled once, so a reassignment can still collide;
/// [`validate_identification`] reports that.
pub fn identify_images(
    images: &[SessionImage],
    profiles: &[ReferenceProfile],
) -> Vec<Identification> {
    let mut out: Vec<Identification> = images
        .iter()
        .map(|img| {
            let found = match img.averages {
                Some((top, bottom)) => identify_position(top, bottom, profiles),
                None => {
                    warn!("identify: image '{}' has no averages, cannot identify", img.label);
                    None
                }
            };
            Identification {
                label: img.label.clone(),
                position: found.map(|(p, _)| p),
                distance_mm: found.map(|(_, d)| d),
                reassigned_from: None,
            }
        })
        .collect();

    let mut claims: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (idx, id) in out.iter().enumerate() {
        if let Some(position) = id.position {
            claims.entry(position).or_default().push(idx);
        }
    }

    for (position, mut claimants) in claims.into_iter().filter(|(_, c)| c.len() > 1) {
        warn!(
            "identify: position {position} matched {} images, keeping the closest",
            claimants.len()
        );
        claimants.sort_by(|&a, &b| {
            let da = out[a].distance_mm.unwrap_or(f64::INFINITY);
            let db = out[b].distance_mm.unwrap_or(f64::INFINITY);
            da.total_cmp(&db)
        });
        for &idx in &claimants[1..] {
            let Some((top, bottom)) = images[idx].averages else {
                continue;
            };
            let alternative = nearest(top, bottom, profiles, Some(position));
            let entry = &mut out[idx];
            warn!(
                "identify: image '{}' reassigned from position {position} to {:?}",
                entry.label,
                alternative.map(|(p, _)| p)
            );
            entry.reassigned_from = Some(position);
            entry.position = alternative.map(|(p, _)| p);
            entry.distance_mm = alternative.map(|(_, d)| d);
        }
    }
    out
}

/// Check that a session covers positions `1..=expected_count` exactly once.
///
/// Returns every problem found, not only the first.
pub fn validate_identification(
    identifications: &[Identification],
    expected_count: usize,
) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    if identifications.len() != expected_count {
        errors.push(format!(
            "expected {expected_count} images, got {}",
            identifications.len()
        ));
    }

    let identified: Vec<u32> = identifications.iter().filter_map(|i| i.position).collect();
    if identified.len() != expected_count {
        errors.push(format!(
            "not all images were identified: {}/{expected_count}",
            identified.len()
        ));
    }

    let mut seen = BTreeSet::new();
    let duplicates: BTreeSet<u32> = identified
        .iter()
        .copied()
        .filter(|p| !seen.insert(*p))
        .collect();
    if !duplicates.is_empty() {
        errors.push(format!("duplicate positions found: {duplicates:?}"));
    }

    let expected: BTreeSet<u32> = (1..=expected_count as u32).collect();
    let missing: Vec<u32> = expected.difference(&seen).copied().collect();
    let unexpected: Vec<u32> = seen.difference(&expected).copied().collect();
    if !missing.is_empty() {
        errors.push(format!("missing positions: {missing:?}"));
    }
    if !unexpected.is_empty() {
        errors.push(format!("unexpected positions: {unexpected:?}"));
    }

    if errors.is_empty() {
        info!("identify: all {expected_count} images uniquely identified");
        Ok(())
    } else {
        warn!("identify: validation failed: {}", errors.join("; "));
        Err(errors)
    }
}
