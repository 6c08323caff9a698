//! Point operations: every output pixel depends only on the input pixel
//! at the same position.

use image::GrayImage;

/// Add `delta` to every pixel, saturating at 0 and 255.
///
/// `delta` may be any signed value; the sum is computed in `i64` so even
/// `i32::MIN`/`i32::MAX` clamp cleanly.
#[must_use = "returns the adjusted image"]
pub fn brightness(image: &GrayImage, delta: i32) -> GrayImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = clamp_to_u8(i64::from(pixel.0[0]) + i64::from(delta));
    }
    out
}

/// Binarize: pixels strictly greater than `t` become 255, the rest 0.
#[must_use = "returns the binarized image"]
pub fn threshold(image: &GrayImage, t: u8) -> GrayImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = if pixel.0[0] > t { 255 } else { 0 };
    }
    out
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn clamp_to_u8(value: i64) -> u8 {
    value.clamp(0, 255) as u8
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ramp() -> GrayImage {
        GrayImage::from_raw(4, 2, vec![0, 1, 50, 127, 128, 200, 254, 255]).unwrap()
    }

    #[test]
    fn brightness_matches_clamped_sum() {
        let img = ramp();
        for delta in [-300, -255, -60, -1, 1, 60, 255, 300] {
            let out = brightness(&img, delta);
            for (o, i) in out.as_raw().iter().zip(img.as_raw()) {
                let expected = (i32::from(*i) + delta).clamp(0, 255);
                assert_eq!(i32::from(*o), expected, "delta {delta}, input {i}");
            }
        }
    }

    #[test]
    fn brightness_zero_is_identity() {
        let img = ramp();
        assert_eq!(brightness(&img, 0), img);
    }

    #[test]
    fn brightness_extreme_deltas_do_not_overflow() {
        let img = ramp();
        assert!(brightness(&img, i32::MAX).as_raw().iter().all(|&p| p == 255));
        assert!(brightness(&img, i32::MIN).as_raw().iter().all(|&p| p == 0));
    }

    #[test]
    fn brightness_does_not_mutate_input() {
        let img = ramp();
        let before = img.clone();
        let _ = brightness(&img, 40);
        assert_eq!(img, before);
    }

    #[test]
    fn threshold_is_strictly_greater_than() {
        let img = ramp();
        let out = threshold(&img, 127);
        assert_eq!(out.as_raw(), &vec![0, 0, 0, 0, 255, 255, 255, 255]);
    }

    #[test]
    fn threshold_output_is_binary() {
        let img = ramp();
        for t in [0, 1, 100, 200, 255] {
            let out = threshold(&img, t);
            assert!(out.as_raw().iter().all(|&p| p == 0 || p == 255));
        }
    }

    #[test]
    fn threshold_is_idempotent() {
        let img = ramp();
        for t in [0, 50, 128, 254, 255] {
            let once = threshold(&img, t);
            let twice = threshold(&once, t);
            assert_eq!(once, twice, "t = {t}");
        }
    }

    #[test]
    fn threshold_255_is_all_black() {
        let out = threshold(&ramp(), 255);
        assert!(out.as_raw().iter().all(|&p| p == 0));
    }
}
