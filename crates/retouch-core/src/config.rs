//! Session configuration.
//!
//! Nothing is persisted. The host builds an [`EditorConfig`] once when it
//! opens a session; every field has a default so a partial object works.

use serde::{Deserialize, Serialize};

use crate::encode::DEFAULT_JPEG_QUALITY;
use crate::transform::InterpolationFilter;

/// Name of the file offered for download on save.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "edited_image.jpg";

/// Largest surface area the renderer will allocate, in pixels (16384 x 16384).
pub const DEFAULT_MAX_SURFACE_PIXELS: u64 = 16_384 * 16_384;

/// Tunables for rendering and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// JPEG quality for saves and committed crops (1-100).
    pub jpeg_quality: u8,
    /// File name attached to saved images.
    pub export_file_name: String,
    /// Sampling used when painting through the transform.
    pub interpolation: InterpolationFilter,
    /// Surface allocations above this many pixels fail with a render error.
    pub max_surface_pixels: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            export_file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
            interpolation: InterpolationFilter::default(),
            max_surface_pixels: DEFAULT_MAX_SURFACE_PIXELS,
        }
    }
}
