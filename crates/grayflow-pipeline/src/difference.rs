//! Pixel-wise absolute difference of two equally sized images.

use image::GrayImage;

use crate::types::{Dimensions, PipelineError};

/// `|a - b|` per pixel.
///
/// # Errors
///
/// Returns [`PipelineError::DimensionMismatch`] unless both images have the
/// same width and height.
pub fn difference(a: &GrayImage, b: &GrayImage) -> Result<GrayImage, PipelineError> {
    let (first, second) = (Dimensions::of(a), Dimensions::of(b));
    if first != second {
        return Err(PipelineError::DimensionMismatch { first, second });
    }

    let mut out = a.clone();
    for (o, p) in out.pixels_mut().zip(b.pixels()) {
        o.0[0] = o.0[0].abs_diff(p.0[0]);
    }
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn self_difference_is_zero() {
        let img = GrayImage::from_fn(5, 3, |x, y| image::Luma([u8::try_from(x * 40 + y).unwrap()]));
        let out = difference(&img, &img).unwrap();
        assert_eq!(Dimensions::of(&out), Dimensions::new(5, 3));
        assert!(out.as_raw().iter().all(|&p| p == 0));
    }

    #[test]
    fn difference_is_absolute_and_symmetric() {
        let a = GrayImage::from_raw(3, 1, vec![0, 100, 255]).unwrap();
        let b = GrayImage::from_raw(3, 1, vec![255, 40, 0]).unwrap();
        let ab = difference(&a, &b).unwrap();
        assert_eq!(ab.as_raw(), &vec![255, 60, 255]);
        assert_eq!(difference(&b, &a).unwrap(), ab);
    }

    #[test]
    fn width_mismatch_is_rejected() {
        let a = GrayImage::new(4, 2);
        let b = GrayImage::new(3, 2);
        let result = difference(&a, &b);
        assert!(matches!(
            result,
            Err(PipelineError::DimensionMismatch { first, second })
                if first == Dimensions::new(4, 2) && second == Dimensions::new(3, 2)
        ));
    }

    #[test]
    fn height_mismatch_is_rejected() {
        let result = difference(&GrayImage::new(2, 2), &GrayImage::new(2, 3));
        assert!(matches!(result, Err(PipelineError::DimensionMismatch { .. })));
    }
}
