//! Contrast-limited adaptive histogram equalization (CLAHE).
//!
//! The image is split into a grid of tiles. Each tile gets a 256-bin
//! histogram whose bins are clipped at `clip_limit × mean bin count`; the
//! clipped mass is spread uniformly over all bins before the cumulative
//! distribution becomes the tile's mapping. Pixels are mapped by bilinear
//! interpolation between the four nearest tile centres, which removes block
//! seams.
//!
//! Input and output are in `[0, 1]`. A `clip_limit` of 0 disables clipping
//! (plain adaptive equalization).
use crate::image::{ImageF32, ImageView, ImageViewMut};
use serde::{Deserialize, Serialize};

const BINS: usize = 256;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaheOptions {
    /// Histogram clip level relative to the mean bin height.
    pub clip_limit: f32,
    /// Number of tiles across the image width.
    pub tiles_x: usize,
    /// Number of tiles across the image height.
    pub tiles_y: usize,
}

impl Default for ClaheOptions {
    fn default() -> Self {
        Self {
            clip_limit: 2.0,
            tiles_x: 8,
            tiles_y: 8,
        }
    }
}

struct TileGrid {
    tile_w: usize,
    tile_h: usize,
    nx: usize,
    ny: usize,
}

impl TileGrid {
    fn new(w: usize, h: usize, options: &ClaheOptions) -> Self {
        let tile_w = w.div_ceil(options.tiles_x.clamp(1, w));
        let tile_h = h.div_ceil(options.tiles_y.clamp(1, h));
        Self {
            tile_w,
            tile_h,
            nx: w.div_ceil(tile_w),
            ny: h.div_ceil(tile_h),
        }
    }

    /// Tile index pair and interpolation weight along one axis.
    #[inline]
    fn locate(coord: usize, tile: usize, count: usize) -> (usize, usize, f32) {
        let pos = (coord as f32 + 0.5) / tile as f32 - 0.5;
        if pos <= 0.0 {
            return (0, 0, 0.0);
        }
        let lo = (pos.floor() as usize).min(count - 1);
        let hi = (lo + 1).min(count - 1);
        let t = if hi == lo { 0.0 } else { pos - lo as f32 };
        (lo, hi, t)
    }
}

#[inline]
fn bin_of(v: f32) -> usize {
    ((v.clamp(0.0, 1.0) * (BINS - 1) as f32).round() as usize).min(BINS - 1)
}

fn tile_mapping(
    image: &ImageF32,
    (x0, x1): (usize, usize),
    (y0, y1): (usize, usize),
    clip: f32,
) -> Vec<f32> {
    let mut hist = [0u32; BINS];
    for y in y0..y1 {
        for &v in &image.row(y)[x0..x1] {
            hist[bin_of(v)] += 1;
        }
    }
    let n = ((x1 - x0) * (y1 - y0)) as u32;

    if clip > 0.0 {
        let limit = ((clip * n as f32 / BINS as f32) as u32).max(1);
        let mut excess = 0u32;
        for count in hist.iter_mut() {
            if *count > limit {
                excess += *count - limit;
                *count = limit;
            }
        }
        let per_bin = excess / BINS as u32;
        let residual = (excess % BINS as u32) as usize;
        for count in hist.iter_mut() {
            *count += per_bin;
        }
        if residual > 0 {
            let step = (BINS / residual).max(1);
            for count in hist.iter_mut().step_by(step).take(residual) {
                *count += 1;
            }
        }
    }

    let mut mapping = Vec::with_capacity(BINS);
    let mut cdf = 0u32;
    for count in hist {
        cdf += count;
        mapping.push(cdf as f32 / n as f32);
    }
    mapping
}

/// Equalize local contrast of a `[0, 1]` image.
pub fn clahe(image: &ImageF32, options: &ClaheOptions) -> ImageF32 {
    let (w, h) = (image.w, image.h);
    if w == 0 || h == 0 {
        return image.clone();
    }
    let grid = TileGrid::new(w, h, options);

    let mut mappings = Vec::with_capacity(grid.nx * grid.ny);
    for ty in 0..grid.ny {
        let (y0, y1) = (ty * grid.tile_h, ((ty + 1) * grid.tile_h).min(h));
        for tx in 0..grid.nx {
            let (x0, x1) = (tx * grid.tile_w, ((tx + 1) * grid.tile_w).min(w));
            mappings.push(tile_mapping(image, (x0, x1), (y0, y1), options.clip_limit));
        }
    }
    let map = |tx: usize, ty: usize, bin: usize| mappings[ty * grid.nx + tx][bin];

    let mut out = ImageF32::new(w, h);
    for y in 0..h {
        let (ty0, ty1, wy) = TileGrid::locate(y, grid.tile_h, grid.ny);
        let src = image.row(y);
        let dst = out.row_mut(y);
        for (x, (&v, out_px)) in src.iter().zip(dst.iter_mut()).enumerate() {
            let (tx0, tx1, wx) = TileGrid::locate(x, grid.tile_w, grid.nx);
            let bin = bin_of(v);
            let top = map(tx0, ty0, bin) * (1.0 - wx) + map(tx1, ty0, bin) * wx;
            let bottom = map(tx0, ty1, bin) * (1.0 - wx) + map(tx1, ty1, bin) * wx;
            *out_px = (top * (1.0 - wy) + bottom * wy).clamp(0.0, 1.0);
        }
    }
    out
}
