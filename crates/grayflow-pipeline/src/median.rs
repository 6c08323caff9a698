//! Median filter for impulse-noise removal.
//!
//! Shares the convolution edge policy: pixels within `window_size / 2` of
//! an edge pass through unchanged.

use image::GrayImage;

use crate::types::PipelineError;

/// Replace every interior pixel by the median of its neighbourhood.
///
/// The neighbourhood spans `radius = window_size / 2` pixels on every side,
/// a `(2 * radius + 1)²` square, so an even window behaves like the next
/// odd one. The values are sorted ascending and the element at index
/// `count / 2` is taken. A window of 1 is the identity.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidParameter`] if `window_size` is zero.
pub fn median_filter(image: &GrayImage, window_size: u32) -> Result<GrayImage, PipelineError> {
    if window_size == 0 {
        return Err(PipelineError::InvalidParameter(
            "median window size must be positive, got 0".to_string(),
        ));
    }

    let width = image.width() as usize;
    let height = image.height() as usize;
    let radius = window_size as usize / 2;
    let side = 2 * radius + 1;

    let src = image.as_raw();
    let mut out = image.clone();
    let dst: &mut [u8] = &mut out;
    let mut values = Vec::with_capacity(side * side);

    for y in radius..height.saturating_sub(radius) {
        for x in radius..width.saturating_sub(radius) {
            values.clear();
            for wy in y - radius..=y + radius {
                let row = wy * width;
                values.extend_from_slice(&src[row + x - radius..=row + x + radius]);
            }
            values.sort_unstable();
            dst[y * width + x] = values[values.len() / 2];
        }
    }
    Ok(out)
}
