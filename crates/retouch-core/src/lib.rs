//! Retouch Core - single-image editing library
//!
//! This crate provides the editing model behind the Retouch photo editor:
//! decoding an uploaded image, six CSS-style color filters, quarter-turn
//! rotation and flips, a display-space crop, a live preview described as
//! style directives, and a rasterized JPEG export.
//!
//! The entry point is [`EditSession`]. Everything else is usable on its own.

pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod filters;
pub mod preview;
pub mod render;
pub mod session;
pub mod state;
pub mod transform;

pub use config::EditorConfig;
pub use decode::{decode_image, DecodeError, DecodedImage};
pub use error::EditorError;
pub use filters::apply_filter_chain;
pub use preview::{preview_style, StyleDirective};
pub use render::{export_raster, rasterize, ExportedFile, RenderError};
pub use session::EditSession;
pub use state::{
    ActiveProperty, EditState, FilterKind, FilterSpec, FlipSign, StateSnapshot, TransformSpec,
    UnknownFilter,
};
pub use transform::{CropError, CropRegion, InterpolationFilter};
