//! WASM bindings for an editing session.
//!
//! `JsEditSession` wraps one [`EditSession`]. Structured values cross the
//! boundary as plain JS objects via `serde-wasm-bindgen`; failures are
//! written to the browser console and thrown as string errors.

use retouch_core::{CropRegion, EditSession, EditorConfig, EditorError, FilterKind};
use wasm_bindgen::prelude::*;

use crate::types::{JsDecodedImage, JsExportedFile};

/// One open document and its slider.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const session = new JsEditSession();
/// // Small files can be decoded in place; see `decode_image` for the worker path.
/// session.load_image(new Uint8Array(await file.arrayBuffer()));
/// session.set_active_property('contrast');
/// session.set_slider_value(140);
/// Object.assign(img.style, session.preview_style());
/// ```
#[wasm_bindgen]
pub struct JsEditSession {
    inner: EditSession,
}

#[wasm_bindgen]
impl JsEditSession {
    /// Create a session with default settings.
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsEditSession {
        JsEditSession {
            inner: EditSession::default(),
        }
    }

    /// Create a session from a partial `EditorConfig` object.
    ///
    /// `undefined` or `null` means defaults.
    pub fn with_config(config: JsValue) -> Result<JsEditSession, JsValue> {
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        Ok(JsEditSession {
            inner: EditSession::new(config),
        })
    }

    /// Decode and open an image file. A failed load keeps the current image.
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.inner.load_image(bytes).map_err(to_js_error)?;
        Ok(())
    }

    /// Open a bitmap decoded elsewhere, typically by `decode_image` in a worker.
    ///
    /// A pixel buffer that does not match its dimensions is rejected and the
    /// current image stays open.
    pub fn install_image(&mut self, image: JsDecodedImage) -> Result<(), JsValue> {
        let image = image
            .into_decoded()
            .map_err(|e| to_js_error(EditorError::from(e)))?;
        self.inner.install_image(image);
        Ok(())
    }

    #[wasm_bindgen(getter)]
    pub fn has_image(&self) -> bool {
        self.inner.has_image()
    }

    /// Snapshot of every parameter plus the natural size, or `null`.
    pub fn state(&self) -> Result<JsValue, JsValue> {
        match self.inner.state() {
            Some(state) => Ok(serde_wasm_bindgen::to_value(&state.snapshot())?),
            None => Ok(JsValue::NULL),
        }
    }

    // ----- Filters -----

    /// `{ kind, max }` for the slider's current target.
    pub fn active_property(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.inner.active_property())?)
    }

    pub fn set_active_property(&mut self, name: &str) -> Result<(), JsValue> {
        self.inner.set_active_property(name).map_err(to_js_error)?;
        Ok(())
    }

    /// Set a filter value directly, without clamping.
    pub fn set_filter_value(&mut self, name: &str, value: f32) -> Result<(), JsValue> {
        let kind: FilterKind = name
            .parse()
            .map_err(|e| to_js_error(EditorError::from(e)))?;
        self.inner.set_filter_value(kind, value);
        Ok(())
    }

    /// Slider input for the active property, clamped to its range.
    pub fn set_slider_value(&mut self, value: f32) {
        self.inner.set_slider_value(value);
    }

    pub fn slider_value(&self) -> Option<f32> {
        self.inner.slider_value()
    }

    pub fn slider_label(&self) -> String {
        self.inner.slider_label()
    }

    pub fn reset_filters(&mut self) {
        self.inner.reset_filters();
    }

    // ----- Transform -----

    pub fn rotate_left(&mut self) {
        self.inner.rotate_left();
    }

    pub fn rotate_right(&mut self) {
        self.inner.rotate_right();
    }

    pub fn flip_vertical(&mut self) {
        self.inner.flip_vertical();
    }

    pub fn flip_horizontal(&mut self) {
        self.inner.flip_horizontal();
    }

    // ----- Crop -----

    /// Record the selection drawn over the displayed image.
    ///
    /// `region` is `{ x, y, width, height, displayWidth, displayHeight }` in
    /// displayed pixels.
    pub fn set_crop_region(&mut self, region: JsValue) -> Result<(), JsValue> {
        let region: CropRegion = serde_wasm_bindgen::from_value(region)?;
        self.inner.set_crop_region(region);
        Ok(())
    }

    pub fn clear_crop_region(&mut self) {
        self.inner.clear_crop_region();
    }

    /// Whether "Crop Image" should be offered.
    #[wasm_bindgen(getter)]
    pub fn has_pending_crop(&self) -> bool {
        self.inner.pending_crop().is_some()
    }

    /// Crop to the recorded selection.
    pub fn commit_crop(&mut self) -> Result<(), JsValue> {
        self.inner.commit_crop().map_err(to_js_error)?;
        Ok(())
    }

    /// Crop to `region` directly.
    pub fn crop(&mut self, region: JsValue) -> Result<(), JsValue> {
        let region: CropRegion = serde_wasm_bindgen::from_value(region)?;
        self.inner.crop(region).map_err(to_js_error)?;
        Ok(())
    }

    // ----- Output -----

    /// `{ filter, transform }` for the displayed image, or `null`.
    pub fn preview_style(&self) -> Result<JsValue, JsValue> {
        match self.inner.preview_style() {
            Some(style) => Ok(serde_wasm_bindgen::to_value(&style)?),
            None => Ok(JsValue::NULL),
        }
    }

    /// The same directives as an inline style declaration.
    pub fn preview_css(&self) -> Option<String> {
        self.inner.preview_style().map(|style| style.to_css())
    }

    /// Rasterize and encode the current state as JPEG.
    pub fn save_image(&self) -> Result<JsExportedFile, JsValue> {
        self.inner
            .save()
            .map(JsExportedFile::from)
            .map_err(to_js_error)
    }
}

impl Default for JsEditSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Report `err` on the browser console and convert it for throwing.
fn to_js_error(err: EditorError) -> JsValue {
    let message = JsValue::from_str(&err.to_string());
    web_sys::console::error_1(&message);
    message
}
