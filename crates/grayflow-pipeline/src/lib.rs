//! grayflow-pipeline: Pure grayscale image-processing engine (sans-IO).
//!
//! Holds 8-bit single-channel images in an [`ImageStore`] and runs linear
//! [`Flow`]s of pixel transforms over them:
//!
//! - point operations: [`brightness`](point::brightness),
//!   [`threshold`](point::threshold)
//! - neighbourhood operations: [`convolve`](convolve::convolve),
//!   [`median_filter`](median::median_filter)
//! - multi-image operations: [`difference`](difference::difference),
//!   [`compare_composite`](composite::compare_composite)
//! - analysis: [`histogram`](histogram::histogram)
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns structured data. File formats live in
//! `grayflow-export`, filesystem interaction in the `grayflow` CLI.

pub mod composite;
pub mod convolve;
pub mod diagnostics;
pub mod difference;
pub mod flow;
pub mod grayscale;
pub mod histogram;
pub mod kernel;
pub mod median;
pub mod point;
pub mod store;
pub mod types;

pub use diagnostics::{RunReport, StepRecord};
pub use flow::{Flow, FlowDocument, FlowError, FlowState, FlowStep, StepKind, StepOutput};
pub use histogram::Histogram;
pub use kernel::{Kernel, KernelSpec};
pub use store::{ImageEntry, ImageStore};
pub use types::{Dimensions, GrayImage, ImageId, PipelineError, RgbaImage};
