//! PNG rendering of grayscale buffers.
//!
//! Every gray value `v` is drawn as the opaque RGBA pixel `(v, v, v, 255)`
//! and the result is PNG-encoded, ready to be written or displayed.

use grayflow_pipeline::GrayImage;
use grayflow_pipeline::grayscale::to_rgba;
use image::ImageEncoder;

/// Errors that can occur during PNG rendering.
#[derive(Debug, thiserror::Error)]
pub enum PngError {
    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Render `image` as an RGBA PNG.
///
/// # Errors
///
/// Returns [`PngError::Encode`] if PNG encoding fails.
pub fn encode_png(image: &GrayImage) -> Result<Vec<u8>, PngError> {
    let rgba = to_rgba(image);
    let mut png_bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    encoder.write_image(
        rgba.as_raw(),
        rgba.width(),
        rgba.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(png_bytes)
}
