//! Decoder and renderer boundaries.
//!
//! [`decode_and_grayscale`] turns compressed image bytes (PNG, JPEG, BMP,
//! WebP) into a single-channel buffer. [`to_rgba`] goes the other way and
//! expands a grayscale buffer into an opaque RGBA raster for display.

use image::{GrayImage, Luma, Rgba};

use crate::types::{PipelineError, RgbaImage};

/// Rec. 709 luma weights for R, G, B.
const LUMA_WEIGHTS: [f64; 3] = [0.2126, 0.7152, 0.0722];

/// Decode raw image bytes and convert to grayscale.
///
/// Every pixel becomes `round(0.2126*R + 0.7152*G + 0.0722*B)`. Alpha is
/// ignored.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
#[must_use = "returns the decoded grayscale image"]
pub fn decode_and_grayscale(bytes: &[u8]) -> Result<GrayImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    log::debug!(
        "decoded {}x{} image from {} bytes",
        rgba.width(),
        rgba.height(),
        bytes.len()
    );
    Ok(rgba_to_gray(&rgba))
}

/// Convert an RGBA raster to grayscale with Rec. 709 luma weights.
#[must_use]
pub fn rgba_to_gray(rgba: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, _] = rgba.get_pixel(x, y).0;
        Luma([luma(r, g, b)])
    })
}

/// Weighted sum of plain products, evaluated left to right (no fused
/// multiply-add).
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops
)]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let [wr, wg, wb] = LUMA_WEIGHTS;
    let value = wr * f64::from(r) + wg * f64::from(g) + wb * f64::from(b);
    value.round().clamp(0.0, 255.0) as u8
}

/// Expand a grayscale buffer into an opaque RGBA raster: `(v, v, v, 255)`.
#[must_use]
pub fn to_rgba(gray: &GrayImage) -> RgbaImage {
    RgbaImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = gray.get_pixel(x, y).0[0];
        Rgba([v, v, v, 255])
    })
}
