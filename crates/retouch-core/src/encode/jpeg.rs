//! JPEG encoding for crop and save.
//!
//! Both outputs of the pipeline are lossy: a committed crop is re-encoded in
//! memory before it becomes the new source, and a save produces a JPEG file.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;
use thiserror::Error;

use crate::decode::DecodedImage;

/// Quality used when nothing else is configured. Matches the browser canvas
/// `toDataURL("image/jpeg")` default of 0.92.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Errors that can occur during JPEG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// JPEG encoding failed
    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encode RGB pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - JPEG quality, clamped to 1-100
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected_len = width as usize * height as usize * 3;
    if pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }

    let quality = quality.clamp(1, 100);

    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

/// Encode a decoded image to JPEG bytes.
pub fn encode_image(image: &DecodedImage, quality: u8) -> Result<Vec<u8>, EncodeError> {
    encode_jpeg(&image.pixels, image.width, image.height, quality)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Valid input of any shape and quality produces a well-formed JPEG.
        #[test]
        fn prop_valid_input_produces_valid_jpeg(
            width in 1u32..=40,
            height in 1u32..=40,
            quality in 0u8..=255,
            fill in any::<u8>(),
        ) {
            let pixels = vec![fill; width as usize * height as usize * 3];
            let jpeg = encode_jpeg(&pixels, width, height, quality);
            prop_assert!(jpeg.is_ok());

            let jpeg = jpeg.unwrap();
            prop_assert!(jpeg.len() >= 4);
            prop_assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
            prop_assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);
        }

        /// Encoding is deterministic.
        #[test]
        fn prop_deterministic_output(
            width in 1u32..=20,
            height in 1u32..=20,
            quality in 1u8..=100,
        ) {
            let pixels = vec![100u8; width as usize * height as usize * 3];
            let first = encode_jpeg(&pixels, width, height, quality).unwrap();
            let second = encode_jpeg(&pixels, width, height, quality).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
