use crate::image::kernel::{convolve3, Kernel3};
use crate::image::ImageF32;

/// Identity plus the negated 4-neighbour Laplacian.
const LAPLACIAN_SHARPEN: Kernel3 = [[0.0, -1.0, 0.0], [-1.0, 5.0, -1.0], [0.0, -1.0, 0.0]];

/// Accentuate transitions with a Laplacian kernel, clamped back to `[0, 1]`.
pub fn laplacian_sharpen(image: &ImageF32) -> ImageF32 {
    let mut out = convolve3(image, &LAPLACIAN_SHARPEN);
    out.clamp_unit();
    out
}
