//! Decoding entry point for Web Workers.
//!
//! Decoding a large photo takes long enough to stall slider input, so the
//! host runs it in a worker that instantiates this module on its own:
//!
//! ```typescript
//! // worker.ts
//! import init, { decode_image } from '@retouch/wasm';
//! await init();
//! self.onmessage = ({ data }) => {
//!   const image = decode_image(data);
//!   const pixels = image.pixels();
//!   self.postMessage({ width: image.width, height: image.height, pixels }, [pixels.buffer]);
//! };
//!
//! // main thread
//! worker.onmessage = ({ data }) => {
//!   session.install_image(new JsDecodedImage(data.width, data.height, data.pixels));
//! };
//! ```

use retouch_core::decode;
use wasm_bindgen::prelude::*;

use crate::types::JsDecodedImage;

/// Decode file bytes (JPEG, PNG, GIF, WebP or BMP) with EXIF orientation applied.
///
/// Needs no session, so it can run in a worker.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsDecodedImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsDecodedImage::from_decoded)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Native tests only reach the success path; errors build a `JsValue`.
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_image_wraps_bitmap() {
        let pixels = vec![90u8; 16 * 8 * 3];
        let jpeg = retouch_core::encode::encode_jpeg(&pixels, 16, 8, 90).unwrap();

        let image = decode_image(&jpeg).unwrap();
        assert_eq!(image.width(), 16);
        assert_eq!(image.height(), 8);
        assert_eq!(image.byte_length(), 16 * 8 * 3);
    }
}
