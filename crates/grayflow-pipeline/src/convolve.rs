//! Spatial convolution with a square kernel.
//!
//! Only pixels whose whole kernel footprint lies inside the image are
//! recomputed. Pixels within `radius` of any edge are copied from the input
//! unchanged; there is no reflection, replication, or zero padding.

use image::GrayImage;

use crate::kernel::Kernel;

/// Convolve `image` with `kernel`.
///
/// Each interior output pixel is the weighted sum over the kernel
/// footprint, accumulated row-major as plain products, rounded to the
/// nearest integer and clamped to `[0, 255]`.
/// An image smaller than the kernel has no interior and is returned as a
/// copy.
#[must_use = "returns the filtered image"]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops
)]
pub fn convolve(image: &GrayImage, kernel: &Kernel) -> GrayImage {
    let width = image.width() as usize;
    let height = image.height() as usize;
    let size = kernel.size();
    let radius = kernel.radius();

    let src = image.as_raw();
    let mut out = image.clone();
    let dst: &mut [u8] = &mut out;

    for y in radius..height.saturating_sub(radius) {
        for x in radius..width.saturating_sub(radius) {
            let mut sum = 0.0;
            for ky in 0..size {
                let row = (y + ky - radius) * width;
                for kx in 0..size {
                    let pixel = src[row + x + kx - radius];
                    sum += f64::from(pixel) * kernel.weight(ky, kx);
                }
            }
            dst[y * width + x] = sum.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Deterministic pseudo-random test image.
    #[allow(clippy::cast_possible_truncation)]
    fn noisy(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            image::Luma([((x * 37 + y * 91 + x * y * 13) % 256) as u8])
        })
    }

    fn assert_border_unchanged(input: &GrayImage, output: &GrayImage, radius: u32) {
        let (w, h) = input.dimensions();
        for y in 0..h {
            for x in 0..w {
                let on_border = x < radius || y < radius || x >= w - radius || y >= h - radius;
                if on_border {
                    assert_eq!(
                        input.get_pixel(x, y),
                        output.get_pixel(x, y),
                        "border pixel ({x},{y}) changed",
                    );
                }
            }
        }
    }

    #[test]
    fn uniform_field_mean_is_unchanged() {
        let img = GrayImage::from_pixel(4, 4, image::Luma([100]));
        let out = convolve(&img, &Kernel::mean(3).unwrap());
        assert!(out.as_raw().iter().all(|&p| p == 100));
    }

    #[test]
    fn border_pixels_are_copied() {
        let img = noisy(9, 7);
        for (kernel, radius) in [
            (Kernel::mean(3).unwrap(), 1),
            (Kernel::mean(5).unwrap(), 2),
            (Kernel::laplacian8(), 1),
        ] {
            let out = convolve(&img, &kernel);
            assert_border_unchanged(&img, &out, radius);
        }
    }

    #[test]
    fn laplacian_of_flat_region_is_zero() {
        let img = GrayImage::from_pixel(5, 5, image::Luma([80]));
        let out = convolve(&img, &Kernel::laplacian4());
        for y in 1..4 {
            for x in 1..4 {
                assert_eq!(out.get_pixel(x, y).0[0], 0);
            }
        }
        assert_eq!(out.get_pixel(0, 0).0[0], 80);
    }

    #[test]
    fn laplacian_highlights_isolated_point() {
        let mut img = GrayImage::new(5, 5);
        img.put_pixel(2, 2, image::Luma([10]));
        let out = convolve(&img, &Kernel::laplacian8());
        assert_eq!(out.get_pixel(2, 2).0[0], 80);
        // Neighbours go negative and clamp to zero.
        assert_eq!(out.get_pixel(1, 2).0[0], 0);
    }

    #[test]
    fn results_are_rounded_then_clamped() {
        // Centre of a 3x3 mean over [0..9] * 10 = 40.0; a 7x centre gain
        // pushes the sum past 255 and must clamp.
        let img = GrayImage::from_raw(3, 3, vec![0, 10, 20, 30, 40, 50, 60, 70, 80]).unwrap();
        let out = convolve(&img, &Kernel::mean(3).unwrap());
        assert_eq!(out.get_pixel(1, 1).0[0], 40);

        let gain = Kernel::from_rows(&[vec![0.0, 0.0, 0.0], vec![0.0, 7.0, 0.0], vec![0.0; 3]])
            .unwrap();
        let out = convolve(&img, &gain);
        assert_eq!(out.get_pixel(1, 1).0[0], 255);

        let half = Kernel::from_rows(&[vec![0.0; 3], vec![0.0, 0.25, 0.0], vec![0.0; 3]]).unwrap();
        let img = GrayImage::from_raw(3, 3, vec![0, 0, 0, 0, 10, 0, 0, 0, 0]).unwrap();
        // 10 * 0.25 = 2.5 rounds up to 3.
        assert_eq!(convolve(&img, &half).get_pixel(1, 1).0[0], 3);
    }

    #[test]
    fn products_are_accumulated_in_order() {
        // Row-major sum of 0.3 * p is 79.49999999999999, which rounds down.
        let box3 = Kernel::from_rows(&[vec![0.3; 3], vec![0.3; 3], vec![0.3; 3]]).unwrap();
        let img = GrayImage::from_raw(3, 3, vec![44, 40, 37, 33, 29, 26, 22, 19, 15]).unwrap();
        assert_eq!(convolve(&img, &box3).get_pixel(1, 1).0[0], 79);
    }

    #[test]
    fn asymmetric_kernel_is_not_flipped() {
        // Kernel picks the pixel to the right of centre.
        let shift = Kernel::from_rows(&[vec![0.0; 3], vec![0.0, 0.0, 1.0], vec![0.0; 3]]).unwrap();
        let img = GrayImage::from_raw(3, 3, vec![0, 0, 0, 1, 2, 3, 0, 0, 0]).unwrap();
        assert_eq!(convolve(&img, &shift).get_pixel(1, 1).0[0], 3);
    }

    #[test]
    fn image_smaller_than_kernel_is_copied() {
        let img = noisy(4, 4);
        let out = convolve(&img, &Kernel::mean(5).unwrap());
        assert_eq!(out, img);
    }

    #[test]
    fn input_is_not_mutated() {
        let img = noisy(6, 6);
        let before = img.clone();
        let _ = convolve(&img, &Kernel::laplacian4());
        assert_eq!(img, before);
    }
}
