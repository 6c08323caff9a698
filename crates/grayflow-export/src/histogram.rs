//! Bar-chart rendering of intensity histograms.
//!
//! The chart is a white [`PLOT_WIDTH`] x [`PLOT_HEIGHT`] canvas with one bar
//! per intensity level, [`BAR_WIDTH`] pixels wide. Bar heights are scaled so
//! the most frequent level reaches [`PLOT_HEIGHT`] minus [`TOP_MARGIN`].
//! A black axis runs along the bottom row and the left column.

use grayflow_pipeline::{GrayImage, Histogram};
use image::Luma;
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::png::{PngError, encode_png};

/// Pixels per intensity bar.
pub const BAR_WIDTH: u32 = 2;

/// Canvas width: 256 bars.
pub const PLOT_WIDTH: u32 = 256 * BAR_WIDTH;

/// Canvas height.
pub const PLOT_HEIGHT: u32 = 200;

/// Rows not available to bars: the space above the tallest bar plus the
/// axis row.
pub const TOP_MARGIN: u32 = 20;

const BACKGROUND: Luma<u8> = Luma([255]);
const BAR: Luma<u8> = Luma([123]);
const AXIS: Luma<u8> = Luma([0]);

/// Height in pixels of the bar for `count`, given the tallest count.
///
/// `round(count / max_count * (PLOT_HEIGHT - TOP_MARGIN))`; zero when the
/// histogram is empty.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn bar_height(count: u32, max_count: u32) -> u32 {
    if max_count == 0 {
        return 0;
    }
    let scale = f64::from(PLOT_HEIGHT - TOP_MARGIN);
    (f64::from(count) / f64::from(max_count) * scale).round() as u32
}

/// Draw `histogram` as a grayscale bar chart.
#[must_use = "returns the rendered chart"]
pub fn render_histogram(histogram: &Histogram) -> GrayImage {
    let mut canvas = GrayImage::from_pixel(PLOT_WIDTH, PLOT_HEIGHT, BACKGROUND);
    let max_count = histogram.max_count();
    let baseline = PLOT_HEIGHT - 1;

    for (level, &count) in (0u32..).zip(histogram.counts()) {
        let height = bar_height(count, max_count);
        if height == 0 {
            continue;
        }
        let x = level * BAR_WIDTH;
        let top = baseline - height;
        draw_filled_rect_mut(
            &mut canvas,
            Rect::at(x.cast_signed(), top.cast_signed()).of_size(BAR_WIDTH, height),
            BAR,
        );
    }

    draw_filled_rect_mut(
        &mut canvas,
        Rect::at(0, baseline.cast_signed()).of_size(PLOT_WIDTH, 1),
        AXIS,
    );
    draw_filled_rect_mut(&mut canvas, Rect::at(0, 0).of_size(1, PLOT_HEIGHT), AXIS);
    canvas
}

/// Render `histogram` as a bar chart and encode it as PNG.
///
/// # Errors
///
/// Returns [`PngError::Encode`] if PNG encoding fails.
pub fn histogram_png(histogram: &Histogram) -> Result<Vec<u8>, PngError> {
    encode_png(&render_histogram(histogram))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Number of bar pixels in the column at `x`, excluding the axis row.
    fn column_fill(chart: &GrayImage, x: u32) -> u32 {
        (0..PLOT_HEIGHT - 1)
            .map(|y| u32::from(*chart.get_pixel(x, y) == BAR))
            .sum()
    }

    #[test]
    fn bar_heights_scale_to_max_count() {
        assert_eq!(bar_height(10, 10), 180);
        assert_eq!(bar_height(5, 10), 90);
        assert_eq!(bar_height(1, 3), 60);
        assert_eq!(bar_height(0, 10), 0);
        assert_eq!(bar_height(0, 0), 0);
    }

    #[test]
    fn tallest_bar_leaves_top_margin() {
        // Two pixels at 10, one at 200: bars of 180 and 90.
        let img = GrayImage::from_raw(3, 1, vec![10, 10, 200]).unwrap();
        let chart = render_histogram(&Histogram::of(&img));
        assert_eq!(chart.dimensions(), (PLOT_WIDTH, PLOT_HEIGHT));

        let x10 = 10 * BAR_WIDTH;
        let x200 = 200 * BAR_WIDTH + 1;
        assert_eq!(column_fill(&chart, x10), 180);
        assert_eq!(column_fill(&chart, x200), 90);
        assert_eq!(column_fill(&chart, 50 * BAR_WIDTH), 0);

        // Bars stand on the axis and stop below the margin.
        assert_eq!(*chart.get_pixel(x10, PLOT_HEIGHT - 2), BAR);
        assert_eq!(*chart.get_pixel(x10, PLOT_HEIGHT - 1 - 180), BAR);
        assert_eq!(*chart.get_pixel(x10, PLOT_HEIGHT - 2 - 180), BACKGROUND);
        assert_eq!(*chart.get_pixel(x10, 0), BACKGROUND);
    }

    #[test]
    fn axes_are_drawn() {
        let chart = render_histogram(&Histogram::of(&GrayImage::new(1, 1)));
        assert_eq!(*chart.get_pixel(PLOT_WIDTH - 1, PLOT_HEIGHT - 1), AXIS);
        assert_eq!(*chart.get_pixel(0, 0), AXIS);
        assert_eq!(*chart.get_pixel(PLOT_WIDTH - 1, 0), BACKGROUND);
    }

    #[test]
    fn png_has_plot_dimensions() {
        let img = GrayImage::from_pixel(4, 4, Luma([77]));
        let png = histogram_png(&Histogram::of(&img)).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), PLOT_WIDTH);
        assert_eq!(decoded.height(), PLOT_HEIGHT);
    }
}
