//! Crop regions and source-pixel cropping.
//!
//! A crop is drawn over the *displayed* image, whose CSS size usually
//! differs from the bitmap's natural size. The region is therefore stored
//! in displayed pixels together with the displayed size, and mapped into
//! source pixels through the natural/displayed ratio before any pixels are
//! copied.
//!
//! # Coordinate System
//!
//! - (0, 0) = top-left corner of the displayed image
//! - `x`, `y`, `width`, `height` in displayed pixels
//! - `display_width`, `display_height` = rendered size of the image element

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::DecodedImage;

/// Reasons a crop cannot be performed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CropError {
    /// Crop requested before any image was loaded.
    #[error("No image loaded")]
    NoImage,

    /// Width or height is not positive, or rounds to less than one source pixel.
    #[error("Crop region has no area: {width}x{height}")]
    DegenerateRegion { width: f64, height: f64 },

    /// The displayed size used for mapping is zero or not a number.
    #[error("Invalid displayed image size: {width}x{height}")]
    InvalidDisplaySize { width: f64, height: f64 },

    /// The region does not overlap the image.
    #[error("Crop region lies outside the image")]
    OutOfBounds,
}

/// A rectangle selected over the displayed image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rendered width of the image the region was drawn on.
    pub display_width: f64,
    /// Rendered height of the image the region was drawn on.
    pub display_height: f64,
}

/// A rectangle in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    /// A region drawn on an image displayed at its natural size.
    pub fn natural(x: f64, y: f64, width: f64, height: f64, image: &DecodedImage) -> Self {
        Self {
            x,
            y,
            width,
            height,
            display_width: image.width as f64,
            display_height: image.height as f64,
        }
    }

    /// Natural-to-displayed ratio per axis.
    pub fn scale_factors(&self, natural_width: u32, natural_height: u32) -> (f64, f64) {
        (
            natural_width as f64 / self.display_width,
            natural_height as f64 / self.display_height,
        )
    }

    /// Map the region into source pixels, clamped to the image bounds.
    ///
    /// # Errors
    ///
    /// `DegenerateRegion` for an empty or sub-pixel region, `InvalidDisplaySize` when the
    /// displayed size cannot be used as a ratio, `OutOfBounds` when nothing
    /// of the image is left after clamping.
    pub fn to_source_rect(
        &self,
        natural_width: u32,
        natural_height: u32,
    ) -> Result<PixelRect, CropError> {
        if !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
        {
            return Err(CropError::DegenerateRegion {
                width: self.width,
                height: self.height,
            });
        }

        if !(self.display_width.is_finite() && self.display_height.is_finite())
            || self.display_width <= 0.0
            || self.display_height <= 0.0
        {
            return Err(CropError::InvalidDisplaySize {
                width: self.display_width,
                height: self.display_height,
            });
        }

        if !(self.x.is_finite() && self.y.is_finite()) {
            return Err(CropError::OutOfBounds);
        }

        let (scale_x, scale_y) = self.scale_factors(natural_width, natural_height);

        let left = map_edge(self.x, scale_x, natural_width);
        let right = map_edge(self.x + self.width, scale_x, natural_width);
        let top = map_edge(self.y, scale_y, natural_height);
        let bottom = map_edge(self.y + self.height, scale_y, natural_height);

        if right <= left || bottom <= top {
            let overlaps = self.x * scale_x < natural_width as f64
                && (self.x + self.width) * scale_x > 0.0
                && self.y * scale_y < natural_height as f64
                && (self.y + self.height) * scale_y > 0.0;
            // Overlapping but narrower than a source pixel once rounded.
            if overlaps {
                return Err(CropError::DegenerateRegion {
                    width: self.width,
                    height: self.height,
                });
            }
            return Err(CropError::OutOfBounds);
        }

        Ok(PixelRect {
            left,
            top,
            width: right - left,
            height: bottom - top,
        })
    }
}

/// Scale a displayed coordinate to the nearest source pixel edge in `[0, limit]`.
fn map_edge(coord: f64, scale: f64, limit: u32) -> u32 {
    (coord * scale).round().clamp(0.0, limit as f64) as u32
}

/// Copy a rectangle of source pixels into a new image.
///
/// The rectangle must lie inside the image, as returned by
/// [`CropRegion::to_source_rect`].
pub fn apply_crop(image: &DecodedImage, rect: PixelRect) -> DecodedImage {
    debug_assert!(rect.left + rect.width <= image.width);
    debug_assert!(rect.top + rect.height <= image.height);

    // Fast path: full crop returns a clone
    if rect.left == 0 && rect.top == 0 && rect.width == image.width && rect.height == image.height
    {
        return image.clone();
    }

    let src_stride = image.width as usize * 3;
    let row_len = rect.width as usize * 3;
    let mut output = Vec::with_capacity(row_len * rect.height as usize);

    for y in rect.top..rect.top + rect.height {
        let start = y as usize * src_stride + rect.left as usize * 3;
        output.extend_from_slice(&image.pixels[start..start + row_len]);
    }

    DecodedImage::new(rect.width, rect.height, output)
}
