//! Session-level error type.
//!
//! Each module reports its own error enum; [`EditorError`] is what the
//! session hands back to the host. None of these are fatal: the session
//! keeps its previous state and the caller may retry.

use thiserror::Error;

use crate::decode::DecodeError;
use crate::render::RenderError;
use crate::state::UnknownFilter;
use crate::transform::CropError;

/// Errors surfaced by [`EditSession`](crate::session::EditSession) operations.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The selected file could not be decoded.
    #[error("Could not load image: {0}")]
    Decode(#[from] DecodeError),

    /// Crop invoked without an image or with an unusable region.
    #[error("Invalid crop: {0}")]
    InvalidCrop(#[from] CropError),

    /// The output surface could not be produced or encoded.
    #[error("Render failed: {0}")]
    Render(#[from] RenderError),

    /// A filter name outside the six known filters.
    #[error(transparent)]
    UnknownFilter(#[from] UnknownFilter),
}
