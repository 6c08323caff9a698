//! Shared types for the grayflow processing engine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can handle pixel buffers
/// without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbaImage` so downstream crates can consume rendered
/// rasters without depending on `image` directly.
pub use image::RgbaImage;

/// Opaque identifier of an image held by an [`ImageStore`](crate::ImageStore).
///
/// Identifiers are allocated monotonically and never reused by the store
/// that issued them, so a stale identifier is detectable (it resolves to
/// [`PipelineError::NotFound`]) rather than silently aliasing a newer image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(u64);

impl ImageId {
    /// Wrap a raw identifier value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw identifier value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "img_{}", self.0)
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create new dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Dimensions of an existing image.
    #[must_use]
    pub fn of(image: &GrayImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }

    /// Total number of pixels (`width * height`), computed without overflow.
    #[must_use]
    pub const fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Returns `true` if either side is zero.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Errors raised by the store and the transform operations.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The identifier has no entry in the store.
    #[error("image {0} not found")]
    NotFound(ImageId),

    /// A multi-image operation was given images of different sizes.
    #[error("image dimensions differ: {first} vs {second}")]
    DimensionMismatch {
        /// Dimensions of the first operand.
        first: Dimensions,
        /// Dimensions of the second operand.
        second: Dimensions,
    },

    /// A pixel buffer does not hold `width * height` bytes.
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    SizeMismatch {
        /// Byte count required by the dimensions.
        expected: u64,
        /// Byte count actually supplied.
        actual: u64,
    },

    /// An operation parameter is out of range or malformed.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Failed to decode a compressed input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// A flow step index is outside the step list.
    #[error("step index {index} out of bounds for flow of {len} steps")]
    StepOutOfBounds {
        /// The requested index.
        index: usize,
        /// Number of steps in the flow.
        len: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_id_display_uses_img_prefix() {
        assert_eq!(ImageId::new(7).to_string(), "img_7");
    }

    #[test]
    fn image_id_orders_by_allocation() {
        assert!(ImageId::new(2) < ImageId::new(10));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn image_id_serializes_as_bare_integer() {
        let json = serde_json::to_string(&ImageId::new(3)).unwrap();
        assert_eq!(json, "3");
        let back: ImageId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ImageId::new(3));
    }

    #[test]
    fn dimensions_pixel_count_does_not_overflow() {
        let d = Dimensions::new(u32::MAX, 2);
        assert_eq!(d.pixel_count(), u64::from(u32::MAX) * 2);
    }

    #[test]
    fn dimensions_display() {
        assert_eq!(Dimensions::new(640, 480).to_string(), "640x480");
    }

    #[test]
    fn dimensions_of_image() {
        let img = GrayImage::new(3, 5);
        assert_eq!(Dimensions::of(&img), Dimensions::new(3, 5));
    }

    #[test]
    fn empty_dimensions() {
        assert!(Dimensions::new(0, 4).is_empty());
        assert!(!Dimensions::new(1, 1).is_empty());
    }

    #[test]
    fn error_display_messages() {
        assert_eq!(
            PipelineError::NotFound(ImageId::new(4)).to_string(),
            "image img_4 not found",
        );
        assert_eq!(
            PipelineError::DimensionMismatch {
                first: Dimensions::new(2, 2),
                second: Dimensions::new(3, 2),
            }
            .to_string(),
            "image dimensions differ: 2x2 vs 3x2",
        );
        assert_eq!(
            PipelineError::EmptyInput.to_string(),
            "input image data is empty",
        );
        assert_eq!(
            PipelineError::StepOutOfBounds { index: 5, len: 2 }.to_string(),
            "step index 5 out of bounds for flow of 2 steps",
        );
    }
}
