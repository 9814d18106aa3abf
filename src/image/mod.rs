//! Image buffers used by the analysis pipeline.
//!
//! - [`RawImage`]: owned 16-bit intensities as delivered by the decoder.
//! - [`ImageF32`]: owned float buffer for normalized and derived images.
//! - [`kernel`]: 3×3 convolution with replicated borders.
//! - [`io`]: loading/saving rasters and JSON for tooling.
pub mod f32;
pub mod io;
pub mod kernel;
pub mod traits;
pub mod u16;

pub use self::f32::ImageF32;
pub use self::traits::{ImageView, ImageViewMut};
pub use self::u16::RawImage;
