//! Overlay of detected edges on the normalized image.
//!
//! Colours: cyan dashed lines through the beam centre; per blade, red
//! (superior) and green (inferior) edge marks when OK, both orange when out
//! of tolerance, and a black cross on the centre row when closed.
use crate::calibration::Calibration;
use crate::image::{ImageF32, ImageView};
use crate::profile::{Footprint, ScanTable};
use crate::types::{AnalysisResult, BladeStatus};
use image::{Rgb, RgbImage};

pub const CENTER_COLOR: Rgb<u8> = Rgb([0, 255, 255]);
pub const SUPERIOR_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const INFERIOR_COLOR: Rgb<u8> = Rgb([0, 200, 0]);
pub const OUT_OF_TOLERANCE_COLOR: Rgb<u8> = Rgb([255, 165, 0]);
pub const CLOSED_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

const DASH: i64 = 6;
const GAP: i64 = 4;
const CROSS_HALF: i64 = 6;

/// Bounds-checked drawing on an RGB raster.
struct Canvas {
    img: RgbImage,
}

impl Canvas {
    fn put(&mut self, x: i64, y: i64, color: Rgb<u8>) {
        if x >= 0 && y >= 0 && x < self.img.width() as i64 && y < self.img.height() as i64 {
            self.img.put_pixel(x as u32, y as u32, color);
        }
    }

    fn hline(&mut self, x0: i64, x1: i64, y: i64, color: Rgb<u8>) {
        for x in x0..x1 {
            self.put(x, y, color);
        }
    }

    fn dashed_hline(&mut self, y: i64, color: Rgb<u8>) {
        for x in 0..self.img.width() as i64 {
            if x % (DASH + GAP) < DASH {
                self.put(x, y, color);
            }
        }
    }

    fn dashed_vline(&mut self, x: i64, color: Rgb<u8>) {
        for y in 0..self.img.height() as i64 {
            if y % (DASH + GAP) < DASH {
                self.put(x, y, color);
            }
        }
    }

    fn cross(&mut self, cx: i64, cy: i64, half: i64, color: Rgb<u8>) {
        for d in -half..=half {
            self.put(cx + d, cy + d, color);
            self.put(cx + d, cy - d, color);
        }
    }
}

/// Gray `[0, 1]` image as 8-bit RGB.
pub fn to_rgb(image: &ImageF32) -> RgbImage {
    let mut out = RgbImage::new(image.w as u32, image.h as u32);
    for y in 0..image.h {
        for (x, &px) in image.row(y).iter().enumerate() {
            let v = (px * 255.0).round().clamp(0.0, 255.0) as u8;
            out.put_pixel(x as u32, y as u32, Rgb([v, v, v]));
        }
    }
    out
}

/// Draw the measurements of `result` over `image`.
///
/// Blades whose footprint is not entirely inside the image, or that are
/// missing from `table`, are not drawn; the result lists them as warnings.
pub fn render_overlay(
    image: &ImageF32,
    result: &AnalysisResult,
    table: &ScanTable,
    calibration: &Calibration,
) -> RgbImage {
    let mut canvas = Canvas { img: to_rgb(image) };
    let center_row = calibration.center_v.round() as i64;
    canvas.dashed_vline(calibration.center_u.round() as i64, CENTER_COLOR);
    canvas.dashed_hline(center_row, CENTER_COLOR);

    for m in &result.measurements {
        let Some(position) = table.get(m.blade_pair_id) else {
            continue;
        };
        let Ok(footprint) = Footprint::locate(position, calibration, image.w) else {
            continue;
        };
        let (col0, col1) = (footprint.col0 as i64, footprint.col1 as i64);
        let (sup_color, inf_color) = match m.status {
            BladeStatus::Ok => (SUPERIOR_COLOR, INFERIOR_COLOR),
            BladeStatus::OutOfTolerance => (OUT_OF_TOLERANCE_COLOR, OUT_OF_TOLERANCE_COLOR),
            BladeStatus::Closed => {
                let half = CROSS_HALF.min((col1 - col0) / 2);
                let center_col = footprint.center().round() as i64;
                canvas.cross(center_col, center_row, half, CLOSED_COLOR);
                continue;
            }
        };
        if let Some(v) = m.v_superior_px {
            canvas.hline(col0, col1, v as i64, sup_color);
        }
        if let Some(v) = m.v_inferior_px {
            canvas.hline(col0, col1, v as i64, inf_color);
        }
    }
    canvas.img
}
