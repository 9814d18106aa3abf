//! 3×3 convolution with border replication.
//!
//! Shared by the Laplacian sharpening step and the Sobel/Scharr gradient
//! kernels. Indices outside the image are clamped to the nearest edge pixel.
use super::{ImageF32, ImageView, ImageViewMut};

pub type Kernel3 = [[f32; 3]; 3];

/// Correlate `image` with `kernel` (no kernel flip), writing into `out`.
///
/// `out` must have the same dimensions as `image`.
pub fn convolve3_into(image: &ImageF32, kernel: &Kernel3, out: &mut ImageF32) {
    debug_assert_eq!((image.w, image.h), (out.w, out.h));
    let (w, h) = (image.w, image.h);
    if w == 0 || h == 0 {
        return;
    }
    for y in 0..h {
        let rows = [
            image.row(y.saturating_sub(1)),
            image.row(y),
            image.row((y + 1).min(h - 1)),
        ];
        let out_row = out.row_mut(y);
        for (x, out_px) in out_row.iter_mut().enumerate() {
            let xs = [x.saturating_sub(1), x, (x + 1).min(w - 1)];
            let mut acc = 0.0;
            for (k_row, row) in kernel.iter().zip(rows.iter()) {
                acc += row[xs[0]] * k_row[0] + row[xs[1]] * k_row[1] + row[xs[2]] * k_row[2];
            }
            *out_px = acc;
        }
    }
}

pub fn convolve3(image: &ImageF32, kernel: &Kernel3) -> ImageF32 {
    let mut out = ImageF32::new(image.w, image.h);
    convolve3_into(image, kernel, &mut out);
    out
}
