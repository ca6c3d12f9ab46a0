//! JavaScript-facing value types.

use retouch_core::state::FilterUnit;
use retouch_core::{DecodeError, DecodedImage, ExportedFile, FilterKind};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// A decoded bitmap on its way from a decoding worker to the session.
///
/// A worker calls `decode_image`, posts `{ width, height, pixels() }` back,
/// and the interaction thread rebuilds it with the constructor before
/// `JsEditSession.install_image`.
#[wasm_bindgen]
pub struct JsDecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsDecodedImage {
    /// Wrap RGB pixel data (3 bytes per pixel, row-major).
    ///
    /// The buffer length is checked when the image is installed.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsDecodedImage {
        JsDecodedImage {
            width,
            height,
            pixels,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// RGB pixel data as a `Uint8Array` (a copy).
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }
}

impl JsDecodedImage {
    pub(crate) fn from_decoded(image: DecodedImage) -> Self {
        Self {
            width: image.width,
            height: image.height,
            pixels: image.pixels,
        }
    }

    /// Validate and unwrap into a core bitmap.
    pub(crate) fn into_decoded(self) -> Result<DecodedImage, DecodeError> {
        DecodedImage::from_raw(self.width, self.height, self.pixels)
    }
}

/// A saved image ready for download.
///
/// `bytes()` copies the JPEG into JavaScript memory; wrap it in a `Blob`
/// and offer it under `file_name`.
#[wasm_bindgen]
pub struct JsExportedFile {
    file_name: String,
    bytes: Vec<u8>,
}

#[wasm_bindgen]
impl JsExportedFile {
    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> String {
        self.file_name.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.bytes.len()
    }

    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        "image/jpeg".to_string()
    }

    /// JPEG bytes as a `Uint8Array` (a copy).
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}

impl From<ExportedFile> for JsExportedFile {
    fn from(file: ExportedFile) -> Self {
        Self {
            file_name: file.file_name,
            bytes: file.bytes,
        }
    }
}

/// One sidebar entry: a filter the slider can target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterElement {
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f32>,
    pub default_value: f32,
    pub unit: FilterUnit,
}

impl From<FilterKind> for FilterElement {
    fn from(kind: FilterKind) -> Self {
        Self {
            name: kind.name(),
            max_value: kind.max_value(),
            default_value: kind.default_value(),
            unit: kind.unit(),
        }
    }
}

/// The six filters in sidebar order.
pub(crate) fn filter_element_list() -> Vec<FilterElement> {
    FilterKind::ALL.into_iter().map(FilterElement::from).collect()
}
