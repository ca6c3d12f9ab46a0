//! Retouch WASM - WebAssembly bindings for Retouch
//!
//! This crate exposes one `retouch-core` editing session to a browser.
//!
//! # Module Structure
//!
//! - `decode` - `decode_image`, callable from a Web Worker
//! - `session` - `JsEditSession`, one method per editor action
//! - `types` - JS-facing value types (`JsDecodedImage`, `JsExportedFile`, sidebar entries)
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditSession, filter_elements } from '@retouch/wasm';
//!
//! await init();
//!
//! const session = new JsEditSession();
//! session.load_image(new Uint8Array(await file.arrayBuffer()));
//! session.rotate_right();
//!
//! const saved = session.save_image();
//! const url = URL.createObjectURL(new Blob([saved.bytes()], { type: saved.mime_type }));
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod session;
mod types;

pub use decode::decode_image;
pub use session::JsEditSession;
pub use types::{FilterElement, JsDecodedImage, JsExportedFile};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    // A second init (e.g. module re-instantiated by a bundler) keeps the first logger.
    if console_log::init_with_level(log::Level::Info).is_ok() {
        log::info!("Retouch WASM {} ready", version());
    }
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// The six filters in sidebar order: `{ name, maxValue?, defaultValue, unit }`.
#[wasm_bindgen]
pub fn filter_elements() -> Result<JsValue, JsValue> {
    Ok(serde_wasm_bindgen::to_value(&types::filter_element_list())?)
}
