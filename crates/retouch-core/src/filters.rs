//! Filter chain rasterization.
//!
//! Applies the six filters of a [`FilterSpec`] to RGB pixel data with CSS
//! Filter Effects semantics, so an export matches what the declarative
//! preview showed.
//!
//! ## Chain Order
//! 1. Brightness
//! 2. Grayscale
//! 3. Sepia
//! 4. Saturate
//! 5. Contrast
//! 6. Hue rotate
//!
//! Each stage clamps its output to `[0, 1]` before the next one runs.
//! Negative amounts behave as 0. Grayscale and sepia saturate at 100%.

use crate::state::{FilterKind, FilterSpec};

type Rgb = (f32, f32, f32);

/// A row-major 3x3 color matrix.
type ColorMatrix = [[f32; 3]; 3];

/// Apply the whole filter chain to an image's pixel data in place.
///
/// # Arguments
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `filters` - The filter values to apply
///
/// A trailing partial pixel is left untouched.
pub fn apply_filter_chain(pixels: &mut [u8], filters: &FilterSpec) {
    let stages = compile(filters);
    if stages.is_empty() {
        return;
    }

    for chunk in pixels.chunks_exact_mut(3) {
        let mut rgb = (
            chunk[0] as f32 / 255.0,
            chunk[1] as f32 / 255.0,
            chunk[2] as f32 / 255.0,
        );

        for stage in &stages {
            rgb = clamp_unit(stage.apply(rgb));
        }

        chunk[0] = to_byte(rgb.0);
        chunk[1] = to_byte(rgb.1);
        chunk[2] = to_byte(rgb.2);
    }
}

/// A single filter primitive with its amount already resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    /// `c * slope + intercept` per channel.
    Linear { slope: f32, intercept: f32 },
    Matrix(ColorMatrix),
}

impl Stage {
    #[inline]
    fn apply(&self, (r, g, b): Rgb) -> Rgb {
        match self {
            Stage::Linear { slope, intercept } => (
                r * slope + intercept,
                g * slope + intercept,
                b * slope + intercept,
            ),
            Stage::Matrix(m) => (
                m[0][0] * r + m[0][1] * g + m[0][2] * b,
                m[1][0] * r + m[1][1] * g + m[1][2] * b,
                m[2][0] * r + m[2][1] * g + m[2][2] * b,
            ),
        }
    }
}

/// Resolve the spec into the stages that actually change pixels.
fn compile(filters: &FilterSpec) -> Vec<Stage> {
    filters
        .iter()
        .filter_map(|(kind, value)| stage_for(kind, value))
        .collect()
}

fn stage_for(kind: FilterKind, value: f32) -> Option<Stage> {
    if !value.is_finite() || value == kind.default_value() {
        return None;
    }

    let stage = match kind {
        FilterKind::Brightness => brightness(percent(value)),
        FilterKind::Grayscale => grayscale(percent(value).min(1.0)),
        FilterKind::Sepia => sepia(percent(value).min(1.0)),
        FilterKind::Saturate => saturate(percent(value)),
        FilterKind::Contrast => contrast(percent(value)),
        FilterKind::HueRotate => hue_rotate(value),
    };
    Some(stage)
}

/// Percent to a non-negative amount (100% = 1.0).
#[inline]
fn percent(value: f32) -> f32 {
    (value / 100.0).max(0.0)
}

/// `brightness(a)`: `c * a`.
fn brightness(amount: f32) -> Stage {
    Stage::Linear {
        slope: amount,
        intercept: 0.0,
    }
}

/// `contrast(a)`: `(c - 0.5) * a + 0.5`.
fn contrast(amount: f32) -> Stage {
    Stage::Linear {
        slope: amount,
        intercept: 0.5 - 0.5 * amount,
    }
}

/// `grayscale(a)`, blends toward BT.709 luminance.
fn grayscale(amount: f32) -> Stage {
    let k = 1.0 - amount;
    Stage::Matrix([
        [0.2126 + 0.7874 * k, 0.7152 - 0.7152 * k, 0.0722 - 0.0722 * k],
        [0.2126 - 0.2126 * k, 0.7152 + 0.2848 * k, 0.0722 - 0.0722 * k],
        [0.2126 - 0.2126 * k, 0.7152 - 0.7152 * k, 0.0722 + 0.9278 * k],
    ])
}

/// `sepia(a)`.
fn sepia(amount: f32) -> Stage {
    let k = 1.0 - amount;
    Stage::Matrix([
        [0.393 + 0.607 * k, 0.769 - 0.769 * k, 0.189 - 0.189 * k],
        [0.349 - 0.349 * k, 0.686 + 0.314 * k, 0.168 - 0.168 * k],
        [0.272 - 0.272 * k, 0.534 - 0.534 * k, 0.131 + 0.869 * k],
    ])
}

/// `saturate(s)`. Values above 1 oversaturate.
fn saturate(s: f32) -> Stage {
    Stage::Matrix([
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ])
}

/// `hue-rotate(θ)`, θ in degrees.
fn hue_rotate(degrees: f32) -> Stage {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Stage::Matrix([
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ])
}

#[inline]
fn clamp_unit((r, g, b): Rgb) -> Rgb {
    (r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0))
}

#[inline]
fn to_byte(v: f32) -> u8 {
    (v * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(r: u8, g: u8, b: u8) -> Vec<u8> {
        vec![r, g, b]
    }

    fn apply(pixels: &[u8], filters: &FilterSpec) -> Vec<u8> {
        let mut result = pixels.to_vec();
        apply_filter_chain(&mut result, filters);
        result
    }

    fn with(kind: FilterKind, value: f32) -> FilterSpec {
        FilterSpec::default().with(kind, value)
    }

    fn close(a: u8, b: u8) -> bool {
        (a as i32 - b as i32).abs() <= 1
    }

    // ===== Identity Tests =====

    #[test]
    fn test_identity_defaults() {
        let pixels = pixel(128, 64, 192);
        assert_eq!(apply(&pixels, &FilterSpec::default()), pixels);
    }

    #[test]
    fn test_identity_compiles_to_nothing() {
        assert!(compile(&FilterSpec::default()).is_empty());
    }

    #[test]
    fn test_full_turn_hue_rotation_is_near_identity() {
        let pixels = pixel(200, 50, 120);
        let result = apply(&pixels, &with(FilterKind::HueRotate, 360.0));
        for (a, b) in result.iter().zip(&pixels) {
            assert!(close(*a, *b), "{result:?} vs {pixels:?}");
        }
    }

    // ===== Brightness Tests =====

    #[test]
    fn test_brightness_scales_channels() {
        let result = apply(&pixel(100, 50, 20), &with(FilterKind::Brightness, 150.0));
        assert_eq!(result, pixel(150, 75, 30));
    }

    #[test]
    fn test_brightness_clips_at_white() {
        let result = apply(&pixel(200, 200, 200), &with(FilterKind::Brightness, 200.0));
        assert_eq!(result, pixel(255, 255, 255));
    }

    #[test]
    fn test_brightness_zero_is_black() {
        let result = apply(&pixel(200, 90, 10), &with(FilterKind::Brightness, 0.0));
        assert_eq!(result, pixel(0, 0, 0));
    }

    // ===== Grayscale Tests =====

    #[test]
    fn test_grayscale_full_equalizes_channels() {
        let result = apply(&pixel(200, 100, 50), &with(FilterKind::Grayscale, 100.0));
        assert!(close(result[0], result[1]) && close(result[1], result[2]));
    }

    #[test]
    fn test_grayscale_above_full_is_capped() {
        let pixels = pixel(200, 100, 50);
        let at_100 = apply(&pixels, &with(FilterKind::Grayscale, 100.0));
        let at_200 = apply(&pixels, &with(FilterKind::Grayscale, 200.0));
        assert_eq!(at_100, at_200);
    }

    #[test]
    fn test_grayscale_keeps_gray() {
        let pixels = pixel(128, 128, 128);
        let result = apply(&pixels, &with(FilterKind::Grayscale, 100.0));
        assert!(result.iter().all(|&c| close(c, 128)));
    }

    // ===== Sepia Tests =====

    #[test]
    fn test_sepia_warms_gray() {
        let result = apply(&pixel(128, 128, 128), &with(FilterKind::Sepia, 100.0));
        assert!(result[0] > result[1], "red should lead green");
        assert!(result[1] > result[2], "green should lead blue");
    }

    #[test]
    fn test_sepia_above_full_is_capped() {
        let pixels = pixel(90, 140, 30);
        assert_eq!(
            apply(&pixels, &with(FilterKind::Sepia, 100.0)),
            apply(&pixels, &with(FilterKind::Sepia, 200.0))
        );
    }

    // ===== Saturate Tests =====

    #[test]
    fn test_saturate_zero_desaturates() {
        let result = apply(&pixel(200, 128, 100), &with(FilterKind::Saturate, 0.0));
        assert!(close(result[0], result[1]) && close(result[1], result[2]));
    }

    #[test]
    fn test_saturate_boost_spreads_channels() {
        let result = apply(&pixel(160, 128, 100), &with(FilterKind::Saturate, 200.0));
        let spread = result[0] as i32 - result[2] as i32;
        assert!(spread > 60, "spread {spread} should grow from 60");
    }

    // ===== Contrast Tests =====

    #[test]
    fn test_contrast_increase() {
        let result = apply(&pixel(64, 128, 192), &with(FilterKind::Contrast, 200.0));
        assert!(result[0] < 64, "dark pixel should get darker");
        assert!(close(result[1], 128), "mid pixel should stay near middle");
        assert_eq!(result[2], 255, "bright pixel should clip at white");
    }

    #[test]
    fn test_contrast_zero_is_mid_gray() {
        let result = apply(&pixel(0, 90, 255), &with(FilterKind::Contrast, 0.0));
        assert!(result.iter().all(|&c| close(c, 128)));
    }

    // ===== Hue Rotate Tests =====

    #[test]
    fn test_hue_rotate_moves_red_toward_green() {
        let result = apply(&pixel(200, 0, 0), &with(FilterKind::HueRotate, 120.0));
        assert!(result[1] > result[0], "green should dominate after 120deg: {result:?}");
    }

    #[test]
    fn test_hue_rotate_leaves_gray_alone() {
        let result = apply(&pixel(100, 100, 100), &with(FilterKind::HueRotate, 90.0));
        assert!(result.iter().all(|&c| close(c, 100)));
    }

    // ===== Out-of-domain Tests =====

    #[test]
    fn test_negative_amounts_behave_as_zero() {
        let pixels = pixel(180, 70, 30);
        assert_eq!(
            apply(&pixels, &with(FilterKind::Brightness, -50.0)),
            apply(&pixels, &with(FilterKind::Brightness, 0.0))
        );
        assert_eq!(
            apply(&pixels, &with(FilterKind::Sepia, -50.0)),
            apply(&pixels, &with(FilterKind::Sepia, 0.0))
        );
    }

    #[test]
    fn test_non_finite_values_are_skipped() {
        let pixels = pixel(10, 20, 30);
        assert_eq!(apply(&pixels, &with(FilterKind::Contrast, f32::NAN)), pixels);
        assert_eq!(
            apply(&pixels, &with(FilterKind::HueRotate, f32::INFINITY)),
            pixels
        );
    }

    // ===== Chain Tests =====

    #[test]
    fn test_chain_order_matters() {
        // Brightness runs before contrast: 0.4 * 2 = 0.8, then (0.8 - 0.5) * 2 + 0.5 = 1.1 -> 1.0.
        let filters = FilterSpec::default()
            .with(FilterKind::Brightness, 200.0)
            .with(FilterKind::Contrast, 200.0);
        let result = apply(&pixel(102, 102, 102), &filters);
        assert_eq!(result, pixel(255, 255, 255));
    }

    #[test]
    fn test_empty_pixels() {
        let mut pixels: Vec<u8> = vec![];
        apply_filter_chain(&mut pixels, &with(FilterKind::Brightness, 150.0));
        assert!(pixels.is_empty());
    }

    #[test]
    fn test_incomplete_pixel_ignored() {
        let mut pixels = vec![100, 100, 100, 64];
        apply_filter_chain(&mut pixels, &with(FilterKind::Brightness, 200.0));
        assert_eq!(pixels[0], 200);
        assert_eq!(pixels[3], 64);
    }
}
