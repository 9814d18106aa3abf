//! Image gradients with per-pixel magnitude.
//!
//! - `CentralDifference`: `(f[i+1] - f[i-1]) / 2` inside, forward/backward
//!   difference on the first/last sample of each axis.
//! - `Sobel` / `Scharr`: 3×3 kernels with replicated borders.
//!
//! Complexity: O(W·H) per pass; memory: three float buffers.
use crate::image::kernel::{convolve3_into, Kernel3};
use crate::image::{ImageF32, ImageView, ImageViewMut};
use serde::{Deserialize, Serialize};

const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

const SCHARR_KERNEL_X: Kernel3 = [[-3.0, 0.0, 3.0], [-10.0, 0.0, 10.0], [-3.0, 0.0, 3.0]];
const SCHARR_KERNEL_Y: Kernel3 = [[-3.0, -10.0, -3.0], [0.0, 0.0, 0.0], [3.0, 10.0, 3.0]];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientKernel {
    #[default]
    CentralDifference,
    Sobel,
    Scharr,
}

/// Per-pixel gradient buffers.
#[derive(Clone, Debug)]
pub struct Grad {
    /// Horizontal derivative
    pub gx: ImageF32,
    /// Vertical derivative (positive when intensity grows downward)
    pub gy: ImageF32,
    /// Euclidean magnitude per pixel: `sqrt(gx^2 + gy^2)`
    pub mag: ImageF32,
}

#[inline]
fn central_difference(values: impl Fn(usize) -> f32, i: usize, n: usize) -> f32 {
    match n {
        0 | 1 => 0.0,
        _ if i == 0 => values(1) - values(0),
        _ if i == n - 1 => values(n - 1) - values(n - 2),
        _ => 0.5 * (values(i + 1) - values(i - 1)),
    }
}

fn central_gradients(l: &ImageF32) -> (ImageF32, ImageF32) {
    let (w, h) = (l.w, l.h);
    let mut gx = ImageF32::new(w, h);
    let mut gy = ImageF32::new(w, h);
    for y in 0..h {
        let row = l.row(y);
        let out_gx = gx.row_mut(y);
        for (x, out) in out_gx.iter_mut().enumerate() {
            *out = central_difference(|i| row[i], x, w);
        }
        let out_gy = gy.row_mut(y);
        for (x, out) in out_gy.iter_mut().enumerate() {
            *out = central_difference(|i| l.get(x, i), y, h);
        }
    }
    (gx, gy)
}

fn kernel_gradients(l: &ImageF32, kernel_x: &Kernel3, kernel_y: &Kernel3) -> (ImageF32, ImageF32) {
    let mut gx = ImageF32::new(l.w, l.h);
    let mut gy = ImageF32::new(l.w, l.h);
    convolve3_into(l, kernel_x, &mut gx);
    convolve3_into(l, kernel_y, &mut gy);
    (gx, gy)
}

/// Compute `gx`, `gy` and magnitude with the requested kernel.
pub fn image_gradients(l: &ImageF32, kernel: GradientKernel) -> Grad {
    let (gx, gy) = match kernel {
        GradientKernel::CentralDifference => central_gradients(l),
        GradientKernel::Sobel => kernel_gradients(l, &SOBEL_KERNEL_X, &SOBEL_KERNEL_Y),
        GradientKernel::Scharr => kernel_gradients(l, &SCHARR_KERNEL_X, &SCHARR_KERNEL_Y),
    };
    let data = gx
        .data
        .iter()
        .zip(gy.data.iter())
        .map(|(&x, &y)| x.hypot(y))
        .collect();
    let mag = ImageF32 {
        w: l.w,
        h: l.h,
        data,
    };
    Grad { gx, gy, mag }
}

/// Gradient magnitude only; the derivative buffers are dropped.
pub fn gradient_magnitude(l: &ImageF32, kernel: GradientKernel) -> ImageF32 {
    image_gradients(l, kernel).mag
}
