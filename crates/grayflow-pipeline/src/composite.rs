//! Side-by-side comparison canvas.
//!
//! Unlike [`difference`](crate::difference::difference), the two images
//! may have any sizes. Each half of the canvas is `max(wA, wB)` wide and
//! each image is centred vertically on its own.

use image::GrayImage;

use crate::types::Dimensions;

/// Where [`compare_composite`] places its two inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeLayout {
    /// Size of the output canvas.
    pub canvas: Dimensions,
    /// Top-left corner of the first image.
    pub first_origin: (u32, u32),
    /// Top-left corner of the second image.
    pub second_origin: (u32, u32),
}

impl CompositeLayout {
    /// Compute the layout for two images of the given sizes.
    ///
    /// `canvas = (2 * max(wA, wB), max(hA, hB))`, first image at
    /// `(0, (H - hA) / 2)`, second at `(max(wA, wB), (H - hB) / 2)`.
    #[must_use]
    pub fn new(first: Dimensions, second: Dimensions) -> Self {
        let half_width = first.width.max(second.width);
        let height = first.height.max(second.height);
        Self {
            canvas: Dimensions::new(half_width.saturating_mul(2), height),
            first_origin: (0, (height - first.height) / 2),
            second_origin: (half_width, (height - second.height) / 2),
        }
    }
}

/// Draw `a` and `b` side by side on a black canvas.
#[must_use = "returns the composite canvas"]
pub fn compare_composite(a: &GrayImage, b: &GrayImage) -> GrayImage {
    let layout = CompositeLayout::new(Dimensions::of(a), Dimensions::of(b));
    let mut canvas = GrayImage::new(layout.canvas.width, layout.canvas.height);

    let (ax, ay) = layout.first_origin;
    let (bx, by) = layout.second_origin;
    image::imageops::replace(&mut canvas, a, i64::from(ax), i64::from(ay));
    image::imageops::replace(&mut canvas, b, i64::from(bx), i64::from(by));
    canvas
}
