//! Intensity histogram.

use image::GrayImage;
use serde::{Deserialize, Serialize};

/// Number of pixels at each of the 256 intensity levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Histogram {
    counts: Vec<u32>,
}

impl Histogram {
    /// Count the pixels of `image` per intensity level.
    #[must_use]
    pub fn of(image: &GrayImage) -> Self {
        let channels = imageproc::stats::histogram(image).channels;
        let counts = channels.first().map_or_else(|| vec![0; 256], |c| c.to_vec());
        Self { counts }
    }

    /// All 256 counts, indexed by intensity.
    #[must_use]
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Number of pixels with intensity `value`.
    #[must_use]
    pub fn count(&self, value: u8) -> u32 {
        self.counts.get(usize::from(value)).copied().unwrap_or(0)
    }

    /// Sum of all counts; equals `width * height` of the source image.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }

    /// Largest single count.
    #[must_use]
    pub fn max_count(&self) -> u32 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Most frequent intensity (lowest value on ties), or `None` for an
    /// empty histogram.
    #[must_use]
    pub fn mode(&self) -> Option<u8> {
        let max = self.max_count();
        if max == 0 {
            return None;
        }
        self.counts
            .iter()
            .position(|&c| c == max)
            .and_then(|i| u8::try_from(i).ok())
    }
}

/// Compute the histogram of `image`.
#[must_use]
pub fn histogram(image: &GrayImage) -> Histogram {
    Histogram::of(image)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn has_256_bins() {
        let h = histogram(&GrayImage::new(3, 3));
        assert_eq!(h.counts().len(), 256);
    }

    #[test]
    fn counts_each_value() {
        let img = GrayImage::from_raw(3, 2, vec![0, 0, 7, 255, 7, 7]).unwrap();
        let h = histogram(&img);
        assert_eq!(h.count(0), 2);
        assert_eq!(h.count(7), 3);
        assert_eq!(h.count(255), 1);
        assert_eq!(h.count(1), 0);
        assert_eq!(h.mode(), Some(7));
        assert_eq!(h.max_count(), 3);
    }

    #[test]
    fn total_equals_pixel_count() {
        let img = GrayImage::from_fn(13, 7, |x, y| image::Luma([u8::try_from((x * y) % 256).unwrap()]));
        assert_eq!(histogram(&img).total(), 13 * 7);
    }

    #[test]
    fn serializes_as_count_list() {
        let h = histogram(&GrayImage::from_pixel(1, 1, image::Luma([2])));
        let json = serde_json::to_string(&h).unwrap();
        assert!(json.starts_with(r#"{"counts":[0,0,1,0"#));
    }
}
