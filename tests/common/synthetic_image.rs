use leaf_position_qc::profile::ScanPosition;
use leaf_position_qc::{Calibration, RawImage};

/// Columns per synthetic blade strip.
pub const PITCH: usize = 20;
/// Background columns left and right of the strips.
pub const MARGIN: usize = 20;
/// Columns averaged per blade; keeps 6 px clear of the strip sides.
pub const FOOTPRINT: f64 = 8.0;
pub const HEIGHT: usize = 1024;
pub const BACKGROUND: u16 = 1000;
pub const FIELD: u16 = 4000;

pub fn strip_width(count: usize) -> usize {
    2 * MARGIN + count * PITCH
}

/// Portal-like image made of vertical strips, one per blade pair.
///
/// Strip `i` is bright over rows `r0..r1` when `fields[i]` is `Some((r0, r1))`
/// and dark otherwise. The central-difference gradient of such a band peaks
/// on rows `r0 - 1` and `r1 - 1`.
pub fn strip_image(fields: &[Option<(usize, usize)>]) -> RawImage {
    assert!(!fields.is_empty(), "at least one strip is required");
    let width = strip_width(fields.len());
    let mut data = vec![BACKGROUND; width * HEIGHT];
    for (i, field) in fields.iter().enumerate() {
        let Some((r0, r1)) = *field else { continue };
        assert!(r0 < r1 && r1 <= HEIGHT, "field rows out of range");
        let c0 = MARGIN + i * PITCH;
        for y in r0..r1 {
            data[y * width + c0..y * width + c0 + PITCH].fill(FIELD);
        }
    }
    RawImage::new(width, HEIGHT, data)
}

/// Calibration with the beam axis in the middle of the strips.
pub fn strip_calibration(count: usize, pixel_spacing_mm: f64) -> Calibration {
    Calibration::new(pixel_spacing_mm, strip_width(count) as f64 / 2.0, 652.75)
}

/// Scan positions (ids `1..=count`) centred on each strip.
pub fn strip_positions(count: usize) -> Vec<ScanPosition> {
    let center_u = strip_width(count) as f64 / 2.0;
    (0..count)
        .map(|i| {
            let center = MARGIN as f64 + (i as f64 + 0.5) * PITCH as f64;
            ScanPosition::new(i as u32 + 1, center - center_u, FOOTPRINT)
        })
        .collect()
}

/// Field rows whose detected edges sit closest to the given distances.
pub fn field_rows_for_mm(calibration: &Calibration, top_mm: f64, bottom_mm: f64) -> (usize, usize) {
    let row = |mm: f64| (calibration.center_v + mm / calibration.pixel_spacing_mm).round() as usize;
    (row(top_mm) + 1, row(bottom_mm) + 1)
}

/// Overwrite rows `r0..r1` of strip `index` with `value`.
pub fn paint_strip(raw: &mut RawImage, index: usize, (r0, r1): (usize, usize), value: u16) {
    let c0 = MARGIN + index * PITCH;
    for y in r0..r1 {
        raw.data[y * raw.w + c0..y * raw.w + c0 + PITCH].fill(value);
    }
}
