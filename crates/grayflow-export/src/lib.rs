//! grayflow-export: Pure file-format codecs (sans-IO)
//!
//! Converts grayscale buffers to and from bytes. Supports the RAW format
//! (optional big-endian dimension header + payload) for import/export, PNG
//! for rendering, and histogram bar charts.

pub mod histogram;
pub mod png;
pub mod raw;

pub use histogram::{histogram_png, render_histogram};
pub use png::{PngError, encode_png};
pub use raw::{RawError, decode as decode_raw, detect_header, encode as encode_raw};
