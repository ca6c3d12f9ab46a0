//! Image decoding for Retouch.
//!
//! Decoding is the one asynchronous boundary of an editing session: the host
//! runs [`decode_image`] off the interaction thread (in the browser, a Web
//! Worker calling the `decode_image` binding) and hands the result to
//! [`EditSession::install_image`](crate::session::EditSession::install_image).
//! The function itself is pure and synchronous.
//!
//! # Examples
//!
//! ```ignore
//! use retouch_core::decode::decode_image;
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod raster;
mod types;

pub use raster::decode_image;
pub use types::{DecodeError, DecodedImage, Orientation};
