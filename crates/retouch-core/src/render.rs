//! Rasterizing pipeline for crop and save.
//!
//! Rendering happens only on explicit actions and always from scratch:
//!
//! 1. allocate an output surface at the source's natural size
//! 2. run the filter chain over the source pixels
//! 3. paint the filtered bitmap through the rotate/flip transform
//! 4. encode as JPEG
//!
//! Filters act on source pixels before placement; the transform only
//! decides where those pixels land.

use std::borrow::Cow;

use thiserror::Error;

use crate::config::EditorConfig;
use crate::decode::{decode_image, DecodedImage};
use crate::encode::{encode_image, EncodeError};
use crate::filters::apply_filter_chain;
use crate::state::EditState;
use crate::transform::{apply_crop, paint_transformed, PixelRect};

/// Errors raised while producing output pixels.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Render requested before any image was loaded.
    #[error("No image loaded")]
    NoImage,

    /// The output surface is too large or memory could not be reserved.
    #[error("Could not allocate a {width}x{height} output surface")]
    SurfaceAllocation { width: u32, height: u32 },

    /// Encoding the rendered surface failed.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// A re-encoded crop could not be read back.
    #[error("Re-encoded image could not be read back: {0}")]
    Reload(String),
}

/// An RGB output buffer.
#[derive(Debug)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Surface {
    /// Allocate a black surface.
    ///
    /// # Errors
    ///
    /// `RenderError::SurfaceAllocation` if either side is zero, the area
    /// exceeds `max_pixels`, or the buffer cannot be reserved.
    pub fn allocate(width: u32, height: u32, max_pixels: u64) -> Result<Self, RenderError> {
        let area = check_surface_area(width, height, max_pixels)?;

        let len = usize::try_from(area * 3)
            .map_err(|_| RenderError::SurfaceAllocation { width, height })?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| RenderError::SurfaceAllocation { width, height })?;
        pixels.resize(len, 0);

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn into_image(self) -> DecodedImage {
        DecodedImage::new(self.width, self.height, self.pixels)
    }
}

/// Area of a `width` x `height` surface, if it is non-empty and within `max_pixels`.
fn check_surface_area(width: u32, height: u32, max_pixels: u64) -> Result<u64, RenderError> {
    let area = width as u64 * height as u64;
    if area == 0 || area > max_pixels {
        return Err(RenderError::SurfaceAllocation { width, height });
    }
    Ok(area)
}

/// Render `state` into a bitmap at the source's natural size.
pub fn rasterize(state: &EditState, config: &EditorConfig) -> Result<DecodedImage, RenderError> {
    let source = state.source();
    let (width, height) = state.natural_dimensions();
    let mut surface = Surface::allocate(width, height, config.max_surface_pixels)?;

    let filtered: Cow<'_, DecodedImage> = if state.filters.is_default() {
        Cow::Borrowed(source)
    } else {
        let mut scratch = Surface::allocate(width, height, config.max_surface_pixels)?;
        scratch.pixels.copy_from_slice(&source.pixels);
        apply_filter_chain(&mut scratch.pixels, &state.filters);
        Cow::Owned(scratch.into_image())
    };

    paint_transformed(
        &filtered,
        &state.transform,
        config.interpolation,
        &mut surface.pixels,
        width,
        height,
    );

    log::debug!(
        "rasterized {}x{} surface (rotate {}deg)",
        width,
        height,
        state.transform.rotate
    );
    Ok(surface.into_image())
}

/// Render `state` and encode it as JPEG.
pub fn export_raster(state: &EditState, config: &EditorConfig) -> Result<Vec<u8>, RenderError> {
    let image = rasterize(state, config)?;
    Ok(encode_image(&image, config.jpeg_quality)?)
}

/// Cut `rect` out of the unfiltered source and round-trip it through JPEG.
///
/// The result is what a committed crop leaves behind as the new source.
pub fn rasterize_crop(
    source: &DecodedImage,
    rect: PixelRect,
    config: &EditorConfig,
) -> Result<DecodedImage, RenderError> {
    check_surface_area(rect.width, rect.height, config.max_surface_pixels)?;

    let cropped = apply_crop(source, rect);
    let jpeg = encode_image(&cropped, config.jpeg_quality)?;
    decode_image(&jpeg).map_err(|e| RenderError::Reload(e.to_string()))
}

/// A finished export ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}
