//! Gradient computation used to turn intensity steps into peaks.
//!
//! Leaf edges show up as steps in the normalized image; the gradient
//! magnitude turns every step into a ridge whose crest marks the edge row.
//! Three kernels are available:
//!
//! - central differences (default), one-sided at the borders;
//! - Sobel and Scharr 3×3 kernels, which add smoothing across the edge
//!   direction at the price of a wider response.
//!
//! Only the magnitude is used downstream; its absolute scale does not
//! matter because the detection threshold is relative to the ROI range.

pub mod grad;

pub use grad::{gradient_magnitude, image_gradients, Grad, GradientKernel};
