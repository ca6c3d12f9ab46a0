//! Painting a bitmap through the rotate/flip transform.
//!
//! The output surface keeps the source's natural size. The bitmap is drawn
//! centered, the same way a 2D canvas is set up for export:
//!
//! ```text
//! translate(out_w / 2, out_h / 2)
//! rotate(θ)              // clockwise, y axis points down
//! scale(horizontal, vertical)
//! draw(image, -w / 2, -h / 2)
//! ```
//!
//! # Algorithm
//!
//! Inverse mapping: for each output pixel center we undo the translation,
//! the rotation and then the scale to find the source position, and sample
//! there. Output pixels the bitmap does not cover stay black, which is what
//! a transparent canvas turns into once encoded as JPEG.
//!
//! ```text
//! v   = p - out_center
//! u.x = ( cos θ * v.x + sin θ * v.y) * horizontal
//! u.y = (-sin θ * v.x + cos θ * v.y) * vertical
//! src = u + src_center
//! ```

use serde::{Deserialize, Serialize};

use crate::decode::DecodedImage;
use crate::state::TransformSpec;

/// Interpolation filter used when a transformed pixel falls between source pixels.
///
/// Quarter turns and flips land exactly on source pixel centers, where both
/// filters give identical results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InterpolationFilter {
    /// Nearest source pixel.
    Nearest,
    /// Weighted average of the four nearest source pixels.
    #[default]
    Bilinear,
}

/// `(sin θ, cos θ)` for clockwise degrees, exact for quarter turns.
pub fn rotation_sin_cos(degrees: i32) -> (f64, f64) {
    match degrees.rem_euclid(360) {
        0 => (0.0, 1.0),
        90 => (1.0, 0.0),
        180 => (0.0, -1.0),
        270 => (-1.0, 0.0),
        other => (other as f64).to_radians().sin_cos(),
    }
}

/// Paint `image` into an RGB buffer of `out_width` x `out_height` through `transform`.
///
/// # Arguments
///
/// * `image` - Source bitmap, already filtered
/// * `transform` - Rotation and flips
/// * `filter` - Interpolation for positions between pixel centers
/// * `out` - Destination RGB buffer, `out_width * out_height * 3` bytes
pub fn paint_transformed(
    image: &DecodedImage,
    transform: &TransformSpec,
    filter: InterpolationFilter,
    out: &mut [u8],
    out_width: u32,
    out_height: u32,
) {
    debug_assert_eq!(out.len(), out_width as usize * out_height as usize * 3);

    if out_width == 0 || out_height == 0 || image.is_empty() {
        return;
    }

    // Fast path: nothing moves
    if transform.is_identity() && image.dimensions() == (out_width, out_height) {
        out.copy_from_slice(&image.pixels);
        return;
    }

    let (sin, cos) = rotation_sin_cos(transform.rotate);
    let flip_x = transform.horizontal.as_f64();
    let flip_y = transform.vertical.as_f64();

    let (src_w, src_h) = (image.width as f64, image.height as f64);
    let (src_cx, src_cy) = (src_w / 2.0, src_h / 2.0);
    let (dst_cx, dst_cy) = (out_width as f64 / 2.0, out_height as f64 / 2.0);

    for (dst_y, row) in out
        .chunks_exact_mut(out_width as usize * 3)
        .enumerate()
    {
        let vy = dst_y as f64 + 0.5 - dst_cy;

        for (dst_x, px) in row.chunks_exact_mut(3).enumerate() {
            let vx = dst_x as f64 + 0.5 - dst_cx;

            let src_x = (cos * vx + sin * vy) * flip_x + src_cx;
            let src_y = (-sin * vx + cos * vy) * flip_y + src_cy;

            let pixel = if src_x < 0.0 || src_y < 0.0 || src_x >= src_w || src_y >= src_h {
                [0, 0, 0]
            } else {
                match filter {
                    InterpolationFilter::Nearest => sample_nearest(image, src_x, src_y),
                    InterpolationFilter::Bilinear => sample_bilinear(image, src_x, src_y),
                }
            };

            px.copy_from_slice(&pixel);
        }
    }
}

/// Sample the pixel whose square contains `(x, y)` (continuous coordinates).
fn sample_nearest(image: &DecodedImage, x: f64, y: f64) -> [u8; 3] {
    let px = (x.floor() as u32).min(image.width - 1);
    let py = (y.floor() as u32).min(image.height - 1);
    image.pixel(px, py)
}

/// Sample with bilinear interpolation between pixel centers.
///
/// `(x, y)` is in continuous coordinates; pixel `(i, j)` has its center at
/// `(i + 0.5, j + 0.5)`. Neighbors past the edge are clamped.
fn sample_bilinear(image: &DecodedImage, x: f64, y: f64) -> [u8; 3] {
    let max_x = image.width as i64 - 1;
    let max_y = image.height as i64 - 1;

    let fx = x - 0.5;
    let fy = y - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;

    let clamp_x = |v: i64| v.clamp(0, max_x) as u32;
    let clamp_y = |v: i64| v.clamp(0, max_y) as u32;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let p00 = image.pixel(clamp_x(x0), clamp_y(y0));
    let p10 = image.pixel(clamp_x(x0 + 1), clamp_y(y0));
    let p01 = image.pixel(clamp_x(x0), clamp_y(y0 + 1));
    let p11 = image.pixel(clamp_x(x0 + 1), clamp_y(y0 + 1));

    let mut result = [0u8; 3];
    for i in 0..3 {
        let v = p00[i] as f64 * (1.0 - tx) * (1.0 - ty)
            + p10[i] as f64 * tx * (1.0 - ty)
            + p01[i] as f64 * (1.0 - tx) * ty
            + p11[i] as f64 * tx * ty;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }
    result
}
