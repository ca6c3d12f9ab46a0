//! The editing session: one document, one active slider property.
//!
//! `EditSession` owns everything the editor mutates. All operations are
//! synchronous. A failed operation returns an error and leaves the session
//! exactly as it was.

use crate::config::EditorConfig;
use crate::decode::{decode_image, DecodedImage};
use crate::error::EditorError;
use crate::preview::{preview_style, StyleDirective};
use crate::render::{export_raster, rasterize_crop, ExportedFile, RenderError};
use crate::state::{ActiveProperty, EditState, FilterKind};
use crate::transform::{CropError, CropRegion};

/// Session state for a single open document.
#[derive(Debug, Default)]
pub struct EditSession {
    config: EditorConfig,
    state: Option<EditState>,
    active: ActiveProperty,
    pending_crop: Option<CropRegion>,
}

impl EditSession {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Current state, `None` until an image is loaded.
    pub fn state(&self) -> Option<&EditState> {
        self.state.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.state.is_some()
    }

    // ----- Loading -----

    /// Decode `bytes` and open the result with every parameter at its default.
    ///
    /// On failure the previous document, if any, stays open.
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<&EditState, EditorError> {
        let image = decode_image(bytes).map_err(|e| {
            log::warn!("image load failed: {e}");
            e
        })?;
        Ok(self.install_image(image))
    }

    /// Open an already-decoded bitmap.
    ///
    /// This is the resume half of an asynchronous load: the host decodes
    /// off the interaction thread and hands the bitmap over here.
    pub fn install_image(&mut self, image: DecodedImage) -> &EditState {
        log::info!("loaded {}x{} image", image.width, image.height);
        self.pending_crop = None;
        self.state.insert(EditState::new(image))
    }

    // ----- Filters -----

    pub fn active_property(&self) -> ActiveProperty {
        self.active
    }

    /// Point the slider at another filter by name.
    pub fn set_active_property(&mut self, name: &str) -> Result<ActiveProperty, EditorError> {
        let kind: FilterKind = name.parse()?;
        self.active = kind.into();
        log::debug!("active property: {kind}");
        Ok(self.active)
    }

    /// Store `value` for `kind` as given. Out-of-domain values are kept.
    pub fn set_filter_value(&mut self, kind: FilterKind, value: f32) -> Option<&EditState> {
        self.replace(|state| state.with_filter(kind, value))
    }

    /// Slider input: clamp to the active property's range, then store.
    pub fn set_slider_value(&mut self, value: f32) -> Option<&EditState> {
        let active = self.active;
        self.set_filter_value(active.kind, active.clamp(value))
    }

    /// Current value of the active property, `None` without an image.
    pub fn slider_value(&self) -> Option<f32> {
        self.state
            .as_ref()
            .map(|state| state.filters.get(self.active.kind))
    }

    /// Label for the slider readout, e.g. `"150%"` or `"45deg"`.
    pub fn slider_label(&self) -> String {
        let value = self.slider_value().unwrap_or(0.0);
        format!("{}{}", value, self.active.kind.unit().suffix())
    }

    // ----- Transform -----

    pub fn rotate_left(&mut self) -> Option<&EditState> {
        self.replace(|state| state.with_transform(state.transform.rotated_left()))
    }

    pub fn rotate_right(&mut self) -> Option<&EditState> {
        self.replace(|state| state.with_transform(state.transform.rotated_right()))
    }

    pub fn flip_vertical(&mut self) -> Option<&EditState> {
        self.replace(|state| state.with_transform(state.transform.flipped_vertical()))
    }

    pub fn flip_horizontal(&mut self) -> Option<&EditState> {
        self.replace(|state| state.with_transform(state.transform.flipped_horizontal()))
    }

    /// Every filter and transform field back to its default, same image.
    pub fn reset_filters(&mut self) -> Option<&EditState> {
        self.replace(EditState::reset)
    }

    // ----- Crop -----

    /// Record the region currently drawn over the image.
    pub fn set_crop_region(&mut self, region: CropRegion) {
        self.pending_crop = Some(region);
    }

    pub fn clear_crop_region(&mut self) {
        self.pending_crop = None;
    }

    /// The region awaiting "Crop Image", if any. The crop action is only
    /// offered while this is `Some`.
    pub fn pending_crop(&self) -> Option<&CropRegion> {
        self.pending_crop.as_ref()
    }

    /// Crop to the pending region.
    pub fn commit_crop(&mut self) -> Result<&EditState, EditorError> {
        let region = self.pending_crop.ok_or_else(|| {
            let err = CropError::DegenerateRegion {
                width: 0.0,
                height: 0.0,
            };
            log::warn!("crop failed: {err}");
            err
        })?;
        self.crop(region)
    }

    /// Replace the source with `region` of the unfiltered source.
    ///
    /// The region is mapped through the natural/displayed ratio, copied,
    /// re-encoded as JPEG and decoded back. Filters and transform reset to
    /// defaults and the pending region is discarded.
    pub fn crop(&mut self, region: CropRegion) -> Result<&EditState, EditorError> {
        let cropped = self.render_crop(&region).map_err(|e| {
            log::warn!("crop failed: {e}");
            e
        })?;

        log::info!("cropped to {}x{}", cropped.width, cropped.height);
        self.pending_crop = None;
        Ok(self.state.insert(EditState::new(cropped)))
    }

    fn render_crop(&self, region: &CropRegion) -> Result<DecodedImage, EditorError> {
        let state = self.state.as_ref().ok_or(CropError::NoImage)?;
        let (width, height) = state.natural_dimensions();
        let rect = region.to_source_rect(width, height)?;
        Ok(rasterize_crop(state.source(), rect, &self.config)?)
    }

    // ----- Output -----

    /// Style directives for the on-screen preview, `None` without an image.
    pub fn preview_style(&self) -> Option<StyleDirective> {
        self.state.as_ref().map(preview_style)
    }

    /// Rasterize and encode the current state for download.
    pub fn save(&self) -> Result<ExportedFile, EditorError> {
        let result = self
            .state
            .as_ref()
            .ok_or(RenderError::NoImage)
            .and_then(|state| export_raster(state, &self.config));

        match result {
            Ok(bytes) => {
                log::info!(
                    "exported {} ({} bytes)",
                    self.config.export_file_name,
                    bytes.len()
                );
                Ok(ExportedFile {
                    file_name: self.config.export_file_name.clone(),
                    bytes,
                })
            }
            Err(e) => {
                log::warn!("export failed: {e}");
                Err(e.into())
            }
        }
    }

    /// Swap in the state produced by `f`. No-op without an image.
    fn replace(&mut self, f: impl FnOnce(&EditState) -> EditState) -> Option<&EditState> {
        let next = f(self.state.as_ref()?);
        Some(self.state.insert(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_image;
    use crate::state::{FilterSpec, FlipSign, TransformSpec};
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes(img: &RgbImage) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    /// Left half dark red, right half light blue, plus a marker in the top-left corner.
    fn test_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            if x < 10 && y < 10 {
                Rgb([250, 250, 0])
            } else if x < width / 2 {
                Rgb([120, 20, 20])
            } else {
                Rgb([80, 120, 200])
            }
        });
        png_bytes(&img)
    }

    fn loaded(width: u32, height: u32) -> EditSession {
        let mut session = EditSession::default();
        session.load_image(&test_png(width, height)).unwrap();
        session
    }

    fn mean(pixels: &[u8]) -> f64 {
        pixels.iter().map(|&p| p as f64).sum::<f64>() / pixels.len() as f64
    }

    fn mean_abs_diff(a: &DecodedImage, b: &DecodedImage) -> f64 {
        let total: u64 = a
            .pixels
            .iter()
            .zip(&b.pixels)
            .map(|(x, y)| (*x as i64 - *y as i64).unsigned_abs())
            .sum();
        total as f64 / a.pixels.len() as f64
    }

    // ===== Loading =====

    #[test]
    fn test_load_starts_at_defaults() {
        let session = loaded(20, 10);
        let state = session.state().unwrap();
        assert_eq!(state.natural_dimensions(), (20, 10));
        assert!(state.filters.is_default());
        assert_eq!(state.transform, TransformSpec::default());
    }

    #[test]
    fn test_no_image_means_no_controls() {
        let mut session = EditSession::default();
        assert!(!session.has_image());
        assert!(session.rotate_left().is_none());
        assert!(session.set_slider_value(50.0).is_none());
        assert!(session.reset_filters().is_none());
        assert!(session.preview_style().is_none());
        assert_eq!(session.slider_label(), "0%");
    }

    #[test]
    fn test_failed_load_keeps_previous_image() {
        let mut session = loaded(20, 10);
        session.rotate_right();

        let err = session.load_image(b"not an image").unwrap_err();
        assert!(matches!(err, EditorError::Decode(_)));

        let state = session.state().unwrap();
        assert_eq!(state.natural_dimensions(), (20, 10));
        assert_eq!(state.transform.rotate, 90);
    }

    #[test]
    fn test_new_image_resets_everything() {
        let mut session = loaded(20, 10);
        session.set_filter_value(FilterKind::Sepia, 80.0);
        session.flip_vertical();

        session.load_image(&test_png(30, 30)).unwrap();
        let state = session.state().unwrap();
        assert!(state.filters.is_default());
        assert_eq!(state.transform, TransformSpec::default());
    }

    // ===== Filters =====

    #[test]
    fn test_active_property_switching() {
        let mut session = loaded(4, 4);
        assert_eq!(session.active_property().kind, FilterKind::Brightness);

        let active = session.set_active_property("hueRotate").unwrap();
        assert_eq!(active.kind, FilterKind::HueRotate);
        assert_eq!(active.max, None);

        let err = session.set_active_property("blur").unwrap_err();
        assert!(matches!(err, EditorError::UnknownFilter(_)));
        assert_eq!(session.active_property().kind, FilterKind::HueRotate);
    }

    #[test]
    fn test_slider_clamps_to_domain() {
        let mut session = loaded(4, 4);
        session.set_active_property("contrast").unwrap();

        session.set_slider_value(350.0);
        assert_eq!(session.slider_value(), Some(200.0));

        session.set_slider_value(-20.0);
        assert_eq!(session.slider_value(), Some(0.0));
    }

    #[test]
    fn test_infinite_hue_from_slider_keeps_preview_valid() {
        let mut session = loaded(4, 4);
        session.set_active_property("hueRotate").unwrap();
        session.set_slider_value(f32::INFINITY);

        assert_eq!(session.slider_label(), "0deg");
        let style = session.preview_style().unwrap();
        assert!(style.filter.ends_with(" hue-rotate(0deg)"));
    }

    #[test]
    fn test_direct_set_keeps_out_of_domain_values() {
        let mut session = loaded(4, 4);
        session.set_filter_value(FilterKind::Saturate, 999.0);
        assert_eq!(session.state().unwrap().filters.saturate, 999.0);
    }

    #[test]
    fn test_slider_label() {
        let mut session = loaded(4, 4);
        session.set_slider_value(150.0);
        assert_eq!(session.slider_label(), "150%");

        session.set_active_property("hueRotate").unwrap();
        session.set_slider_value(45.0);
        assert_eq!(session.slider_label(), "45deg");
    }

    #[test]
    fn test_reset_restores_all_defaults() {
        let mut session = loaded(8, 8);
        for kind in FilterKind::ALL {
            session.set_filter_value(kind, 33.0);
        }
        session.rotate_left();
        session.flip_vertical();
        session.flip_horizontal();

        let state = session.reset_filters().unwrap();
        assert_eq!(state.filters, FilterSpec::default());
        assert_eq!(state.transform.rotate, 0);
        assert_eq!(state.transform.vertical, FlipSign::Positive);
        assert_eq!(state.transform.horizontal, FlipSign::Positive);
        assert_eq!(state.natural_dimensions(), (8, 8));
    }

    // ===== Transform =====

    #[test]
    fn test_rotation_and_flip_actions() {
        let mut session = loaded(4, 4);
        session.rotate_left();
        session.rotate_right();
        assert_eq!(session.state().unwrap().transform.rotate, 0);

        for _ in 0..4 {
            session.rotate_left();
        }
        assert_eq!(session.state().unwrap().transform.rotate, -360);

        session.flip_horizontal();
        assert_eq!(
            session.state().unwrap().transform.horizontal,
            FlipSign::Negative
        );
        session.flip_horizontal();
        assert_eq!(
            session.state().unwrap().transform.horizontal,
            FlipSign::Positive
        );
    }

    #[test]
    fn test_preview_tracks_state() {
        let mut session = loaded(4, 4);
        session.set_slider_value(120.0);
        session.rotate_right();
        session.flip_vertical();

        let style = session.preview_style().unwrap();
        assert!(style.filter.starts_with("brightness(120%)"));
        assert_eq!(style.transform, "rotate(90deg) scale(1, -1)");
    }

    // ===== Crop =====

    #[test]
    fn test_crop_scales_by_display_ratio() {
        // 200x200 natural image shown at 100x100; crop the top-left 50x50.
        let mut session = loaded(200, 200);
        session.set_filter_value(FilterKind::Grayscale, 100.0);
        session.rotate_right();

        let state = session
            .crop(CropRegion {
                x: 0.0,
                y: 0.0,
                width: 50.0,
                height: 50.0,
                display_width: 100.0,
                display_height: 100.0,
            })
            .unwrap();

        assert_eq!(state.natural_dimensions(), (100, 100));
        assert!(state.filters.is_default());
        assert_eq!(state.transform, TransformSpec::default());
    }

    #[test]
    fn test_crop_uses_unfiltered_source() {
        let mut session = loaded(40, 40);
        session.set_filter_value(FilterKind::Brightness, 0.0);

        let state = session
            .crop(CropRegion {
                x: 20.0,
                y: 20.0,
                width: 20.0,
                height: 20.0,
                display_width: 40.0,
                display_height: 40.0,
            })
            .unwrap();

        // Light blue survives; a baked-in brightness(0%) would be black.
        let [r, g, b] = state.source().pixel(10, 10);
        assert!(b > 150, "expected blue, got {:?}", [r, g, b]);
    }

    #[test]
    fn test_full_region_crop_is_visually_equivalent() {
        let mut session = loaded(48, 32);
        let original = session.state().unwrap().source().clone();
        session.set_filter_value(FilterKind::Sepia, 100.0);

        let state = session
            .crop(CropRegion::natural(0.0, 0.0, 48.0, 32.0, &original))
            .unwrap();

        assert_eq!(state.natural_dimensions(), (48, 32));
        assert!(state.filters.is_default());
        assert!(mean_abs_diff(state.source(), &original) < 6.0);
    }

    #[test]
    fn test_crop_without_image() {
        let mut session = EditSession::default();
        let err = session
            .crop(CropRegion {
                x: 0.0,
                y: 0.0,
                width: 10.0,
                height: 10.0,
                display_width: 10.0,
                display_height: 10.0,
            })
            .unwrap_err();
        assert!(matches!(err, EditorError::InvalidCrop(CropError::NoImage)));
    }

    #[test]
    fn test_degenerate_crop_leaves_state_unchanged() {
        let mut session = loaded(20, 20);
        session.set_filter_value(FilterKind::Contrast, 140.0);
        let before = session.state().unwrap().snapshot();

        let err = session
            .crop(CropRegion {
                x: 5.0,
                y: 5.0,
                width: 0.0,
                height: 8.0,
                display_width: 20.0,
                display_height: 20.0,
            })
            .unwrap_err();

        assert!(matches!(
            err,
            EditorError::InvalidCrop(CropError::DegenerateRegion { .. })
        ));
        assert_eq!(session.state().unwrap().snapshot(), before);
    }

    #[test]
    fn test_pending_crop_lifecycle() {
        let mut session = loaded(20, 20);
        assert!(session.pending_crop().is_none());
        assert!(matches!(
            session.commit_crop(),
            Err(EditorError::InvalidCrop(_))
        ));

        session.set_crop_region(CropRegion {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            display_width: 20.0,
            display_height: 20.0,
        });
        assert!(session.pending_crop().is_some());

        let state = session.commit_crop().unwrap();
        assert_eq!(state.natural_dimensions(), (10, 10));
        assert!(session.pending_crop().is_none());
    }

    // ===== Save =====

    #[test]
    fn test_save_without_image() {
        let session = EditSession::default();
        let err = session.save().unwrap_err();
        assert!(matches!(err, EditorError::Render(RenderError::NoImage)));
    }

    #[test]
    fn test_save_names_and_sizes_output() {
        let mut session = loaded(60, 40);
        session.rotate_right();

        let file = session.save().unwrap();
        assert_eq!(file.file_name, "edited_image.jpg");

        let decoded = decode_image(&file.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (60, 40));
    }

    #[test]
    fn test_save_after_crop_uses_cropped_dimensions() {
        let mut session = loaded(100, 100);
        session
            .crop(CropRegion {
                x: 0.0,
                y: 0.0,
                width: 30.0,
                height: 20.0,
                display_width: 50.0,
                display_height: 50.0,
            })
            .unwrap();

        let decoded = decode_image(&session.save().unwrap().bytes).unwrap();
        assert_eq!(decoded.dimensions(), (60, 40));
    }

    #[test]
    fn test_save_failure_is_reported_and_state_kept() {
        let mut session = EditSession::new(EditorConfig {
            max_surface_pixels: 10,
            ..EditorConfig::default()
        });
        session.load_image(&test_png(20, 20)).unwrap();
        session.rotate_right();

        let err = session.save().unwrap_err();
        assert!(matches!(
            err,
            EditorError::Render(RenderError::SurfaceAllocation { .. })
        ));
        assert_eq!(session.state().unwrap().transform.rotate, 90);
    }

    #[test]
    fn test_brighten_and_rotate_scenario() {
        let mut session = loaded(100, 100);
        let source = session.state().unwrap().source().clone();

        session.set_slider_value(150.0);
        session.rotate_right();
        assert_eq!(session.state().unwrap().transform.rotate, 90);

        let decoded = decode_image(&session.save().unwrap().bytes).unwrap();
        assert_eq!(decoded.dimensions(), (100, 100));
        assert!(mean(&decoded.pixels) > mean(&source.pixels) + 10.0);

        // The yellow top-left marker is now in the top-right corner.
        let [r, g, b] = decoded.pixel(95, 4);
        assert!(r > 200 && g > 200 && b < 80, "got {:?}", [r, g, b]);
        let [r, g, _] = decoded.pixel(4, 4);
        assert!(r < 200 || g < 200, "marker should have left the top-left");
    }
}
