//! RAW grayscale codec.
//!
//! Layout: an optional 8-byte header of two big-endian `u32`s (`width`,
//! `height`) followed by `width * height` bytes of row-major pixels.
//!
//! [`encode`] always writes the header, so every file grayflow produces is
//! self-describing. [`decode`] also accepts legacy headerless files when the
//! caller supplies the dimensions.
//!
//! ## Header detection
//!
//! A headerless file has no marker, so the header is recognised by a size
//! heuristic (see [`detect_header`]). An implausible header is never an
//! error: it just means "no header".

use grayflow_pipeline::{Dimensions, GrayImage};

/// Size of the dimension header in bytes.
pub const HEADER_LEN: usize = 8;

/// Header dimensions must be strictly below this value.
pub const MAX_HEADER_DIMENSION: u32 = 100_000;

/// Errors that can occur while decoding a RAW file.
#[derive(Debug, thiserror::Error)]
pub enum RawError {
    /// No valid header and no dimensions supplied.
    #[error("RAW data has no dimension header; width and height must be supplied")]
    NeedsDimensions,

    /// The payload is shorter than the dimensions require.
    #[error("RAW payload holds {actual} bytes, expected at least {expected}")]
    SizeMismatch {
        /// Payload bytes required (`width * height`).
        expected: u64,
        /// Payload bytes present after the header offset.
        actual: u64,
    },

    /// Caller-supplied dimensions are zero.
    #[error("invalid RAW dimensions {width}x{height}")]
    InvalidDimensions {
        /// Supplied width.
        width: u32,
        /// Supplied height.
        height: u32,
    },
}

/// Look for a valid dimension header at the start of `bytes`.
///
/// The header is accepted only when:
///
/// - at least [`HEADER_LEN`] bytes are present,
/// - `0 < width < 100000` and `0 < height < 100000`,
/// - the total size is between `8 + w*h` and `2 * (8 + w*h)` bytes
///   inclusive (trailing padding is tolerated).
///
/// Anything else returns `None`.
#[must_use]
pub fn detect_header(bytes: &[u8]) -> Option<Dimensions> {
    let Some(header) = bytes.first_chunk::<HEADER_LEN>() else {
        log::debug!("raw: {} bytes, too short for a header", bytes.len());
        return None;
    };
    let width = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
    let height = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);

    let plausible = |v: u32| v > 0 && v < MAX_HEADER_DIMENSION;
    if !plausible(width) || !plausible(height) {
        log::debug!("raw: implausible header dimensions {width}x{height}");
        return None;
    }

    let file_size = bytes.len() as u64;
    let expected = u64::from(width) * u64::from(height);
    let expected_total = HEADER_LEN as u64 + expected;

    if file_size >= expected_total {
        let max_size = expected_total * 2;
        if file_size <= max_size {
            log::debug!(
                "raw: header {width}x{height} accepted ({file_size} bytes, expected {expected_total})"
            );
            return Some(Dimensions::new(width, height));
        }
        log::debug!(
            "raw: {file_size} bytes is too large for header {width}x{height} (max {max_size})"
        );
    } else if file_size == expected {
        log::debug!("raw: {file_size} bytes is exactly {width}x{height} of pixels, no header");
    } else {
        log::debug!(
            "raw: {file_size} bytes is too small for header {width}x{height} (expected {expected_total})"
        );
    }
    None
}

/// Decode a RAW file.
///
/// With `dimensions`, the data is read as a legacy headerless file starting
/// at offset 0; explicit dimensions always win over a header. Without,
/// the header is detected and skipped.
///
/// Bytes beyond `width * height` are ignored.
///
/// # Errors
///
/// Returns [`RawError::InvalidDimensions`] for zero supplied dimensions,
/// [`RawError::NeedsDimensions`] when no header is found and none were
/// supplied, and [`RawError::SizeMismatch`] when the payload is short.
pub fn decode(bytes: &[u8], dimensions: Option<Dimensions>) -> Result<GrayImage, RawError> {
    let (dimensions, offset) = match dimensions {
        Some(d) if d.is_empty() => {
            return Err(RawError::InvalidDimensions {
                width: d.width,
                height: d.height,
            });
        }
        Some(d) => (d, 0),
        None => (
            detect_header(bytes).ok_or(RawError::NeedsDimensions)?,
            HEADER_LEN,
        ),
    };

    let expected = dimensions.pixel_count();
    let payload = bytes.get(offset..).unwrap_or_default();
    let actual = payload.len() as u64;
    let size_mismatch = RawError::SizeMismatch { expected, actual };
    if actual < expected {
        return Err(size_mismatch);
    }
    let len = usize::try_from(expected).map_err(|_| RawError::SizeMismatch { expected, actual })?;

    log::debug!(
        "raw: decoding {dimensions} from {} bytes at offset {offset}",
        bytes.len()
    );
    GrayImage::from_raw(dimensions.width, dimensions.height, payload[..len].to_vec())
        .ok_or(size_mismatch)
}

/// Encode an image as header + payload.
#[must_use]
pub fn encode(image: &GrayImage) -> Vec<u8> {
    let pixels = image.as_raw();
    let mut out = Vec::with_capacity(HEADER_LEN + pixels.len());
    out.extend_from_slice(&image.width().to_be_bytes());
    out.extend_from_slice(&image.height().to_be_bytes());
    out.extend_from_slice(pixels);
    out
}
