//! Raster decoding with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageError, ImageReader};

use super::{DecodeError, DecodedImage, Orientation};

/// Decode an image from file bytes, applying EXIF orientation correction.
///
/// The format is sniffed from the content, not from a file name. Any format
/// enabled on the `image` dependency is accepted (JPEG, PNG, GIF, WebP, BMP).
/// Browsers display images EXIF-oriented, so the returned bitmap is too.
///
/// # Errors
///
/// Returns `DecodeError::Empty` for an empty buffer,
/// `DecodeError::InvalidFormat` if the bytes are not a recognized raster format,
/// and `DecodeError::CorruptedFile` if decoding fails partway.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let orientation = extract_orientation(bytes);

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader.decode().map_err(map_image_error)?;
    let oriented = apply_orientation(img, orientation);

    let decoded = DecodedImage::from_rgb_image(oriented.into_rgb8());
    if decoded.is_empty() {
        return Err(DecodeError::CorruptedFile("image has no pixels".to_string()));
    }

    log::debug!(
        "decoded {}x{} image ({:?})",
        decoded.width,
        decoded.height,
        orientation
    );
    Ok(decoded)
}

fn map_image_error(err: ImageError) -> DecodeError {
    match err {
        ImageError::Unsupported(_) => DecodeError::InvalidFormat,
        other => DecodeError::CorruptedFile(other.to_string()),
    }
}

/// Extract EXIF orientation from file bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);

    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

/// Apply EXIF orientation transformation to an image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
