//! Geometric operations on the source bitmap.
//!
//! - [`crop`]: map a displayed-pixel crop region into source pixels and copy them out
//! - [`affine`]: paint a bitmap through the rotate/flip transform for export

pub mod affine;
pub mod crop;

pub use affine::{paint_transformed, rotation_sin_cos, InterpolationFilter};
pub use crop::{apply_crop, CropError, CropRegion, PixelRect};
