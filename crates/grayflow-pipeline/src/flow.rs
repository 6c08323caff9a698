//! Flow engine: an ordered list of steps run against a "current image".
//!
//! A [`Flow`] is built by appending [`FlowStep`]s and executed with
//! [`Flow::run`] against an [`ImageStore`]:
//!
//! ```rust
//! # use grayflow_pipeline::{Flow, FlowStep, GrayImage, ImageStore, KernelSpec};
//! # fn demo() -> Result<(), grayflow_pipeline::FlowError> {
//! let mut store = ImageStore::new();
//! let source = store.put(GrayImage::from_pixel(8, 8, image::Luma([90])));
//!
//! let mut flow = Flow::new();
//! flow.add_step(FlowStep::ReadFile { image: source });
//! flow.add_step(FlowStep::Convolution { kernel: KernelSpec::Mean { size: 3 } });
//! flow.add_step(FlowStep::Threshold { value: 64 });
//!
//! let report = flow.run(&mut store)?;
//! assert_eq!(store.len(), 3);
//! assert_ne!(report.final_image, source);
//! # Ok(())
//! # }
//! ```
//!
//! Steps never modify an image in place. Every transform stores its result
//! as a new entry and moves the current-image cursor to it, so each step's
//! output stays inspectable after the run, including after a failure.

use std::fmt;

use image::GrayImage;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::composite::compare_composite;
use crate::convolve::convolve;
use crate::diagnostics::{RunReport, StepRecord};
use crate::difference::difference;
use crate::histogram::Histogram;
use crate::kernel::KernelSpec;
use crate::median::median_filter;
use crate::point::{brightness, threshold};
use crate::store::ImageStore;
use crate::types::{ImageId, PipelineError};

/// One operation in a flow, with its parameters.
///
/// Serialized as `{"type": "<snake_case name>", ...params}`. Parameters are
/// not validated when a step is added; bad values surface when the step
/// runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlowStep {
    /// Marks the source image. The first such step seeds the current image;
    /// every `read_file` step is skipped during execution.
    ReadFile {
        /// The already-loaded source image.
        image: ImageId,
    },
    /// Ask the caller to display an image (the current one by default).
    DisplayImage {
        /// Image to display instead of the current one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<ImageId>,
    },
    /// Add a signed offset to every pixel.
    Brightness {
        /// Offset, any signed value.
        value: i32,
    },
    /// Binarize at a threshold in `0..=255`.
    Threshold {
        /// Pixels strictly above this become 255.
        value: i32,
    },
    /// Convolve with a kernel.
    Convolution {
        /// The kernel to apply.
        kernel: KernelSpec,
    },
    /// Median filter.
    Median {
        /// Window side length; the neighbourhood radius is `window_size / 2`.
        window_size: u32,
    },
    /// Absolute difference of two explicit images. Becomes the current image.
    Difference {
        /// Minuend.
        first: ImageId,
        /// Subtrahend.
        second: ImageId,
    },
    /// Intensity histogram of an image (the current one by default).
    Histogram {
        /// Image to analyse instead of the current one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<ImageId>,
    },
    /// Side-by-side composite of two images, handed to the caller for display.
    CompareImages {
        /// Left image.
        first: ImageId,
        /// Right image.
        second: ImageId,
    },
    /// Ask the caller to export an image (the current one by default) as RAW.
    SaveFile {
        /// Image to export instead of the current one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<ImageId>,
        /// Output file name; defaults to `image_<id>_<w>x<h>.raw`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
    },
}

impl FlowStep {
    /// The operation type of this step.
    #[must_use]
    pub const fn kind(&self) -> StepKind {
        match self {
            Self::ReadFile { .. } => StepKind::ReadFile,
            Self::DisplayImage { .. } => StepKind::DisplayImage,
            Self::Brightness { .. } => StepKind::Brightness,
            Self::Threshold { .. } => StepKind::Threshold,
            Self::Convolution { .. } => StepKind::Convolution,
            Self::Median { .. } => StepKind::Median,
            Self::Difference { .. } => StepKind::Difference,
            Self::Histogram { .. } => StepKind::Histogram,
            Self::CompareImages { .. } => StepKind::CompareImages,
            Self::SaveFile { .. } => StepKind::SaveFile,
        }
    }
}

/// Operation type of a [`FlowStep`], without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    ReadFile,
    DisplayImage,
    Brightness,
    Threshold,
    Convolution,
    Median,
    Difference,
    Histogram,
    CompareImages,
    SaveFile,
}

impl StepKind {
    /// The snake_case name used in flow documents.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ReadFile => "read_file",
            Self::DisplayImage => "display_image",
            Self::Brightness => "brightness",
            Self::Threshold => "threshold",
            Self::Convolution => "convolution",
            Self::Median => "median",
            Self::Difference => "difference",
            Self::Histogram => "histogram",
            Self::CompareImages => "compare_images",
            Self::SaveFile => "save_file",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a single step produced.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepOutput {
    /// `read_file`: nothing to do, the image is already loaded.
    Skipped,
    /// A transform stored a new image, which is now the current image.
    Produced {
        /// The new image.
        image: ImageId,
    },
    /// Display request for a stored image.
    Display {
        /// Image to display.
        image: ImageId,
    },
    /// Side-by-side composite, not stored.
    Composite {
        /// Left image.
        first: ImageId,
        /// Right image.
        second: ImageId,
        /// The composite canvas.
        #[serde(skip)]
        canvas: GrayImage,
    },
    /// Histogram of a stored image.
    Histogram {
        /// Image that was analysed.
        image: ImageId,
        /// The counts.
        histogram: Histogram,
    },
    /// Export request for a stored image.
    Save {
        /// Image to export.
        image: ImageId,
        /// Requested file name.
        filename: String,
    },
}

impl StepOutput {
    /// One-line description for reports.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Skipped => "-".to_string(),
            Self::Produced { image } => format!("-> {image}"),
            Self::Display { image } => format!("display {image}"),
            Self::Composite {
                first,
                second,
                canvas,
            } => format!(
                "{first} | {second} ({}x{})",
                canvas.width(),
                canvas.height()
            ),
            Self::Histogram { image, histogram } => {
                format!("{image}: {} px", histogram.total())
            }
            Self::Save { filename, .. } => format!("save {filename}"),
        }
    }
}

/// Lifecycle of a [`Flow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    /// No steps.
    Empty,
    /// Steps present, not run since the last edit.
    Built,
    /// A run is in progress.
    Running,
    /// The last run finished every step.
    Completed,
    /// The last run stopped at a failing step.
    Failed,
}

/// Errors from [`Flow::run`].
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// The flow has no `read_file` step to seed the current image.
    #[error("flow has no read_file step to provide a source image")]
    NoSourceImage,

    /// A step failed; the remaining steps were not run.
    #[error("step {index} ({kind}) failed: {source}")]
    Step {
        /// Position of the failing step.
        index: usize,
        /// Operation type of the failing step.
        kind: StepKind,
        /// The underlying error.
        #[source]
        source: PipelineError,
    },
}

impl FlowError {
    /// Index of the failing step, if the failure belongs to a step.
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        match self {
            Self::NoSourceImage => None,
            Self::Step { index, .. } => Some(*index),
        }
    }
}

/// Serialized form of a [`Flow`]: just its steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowDocument {
    /// Steps in execution order.
    pub steps: Vec<FlowStep>,
}

/// An ordered, append-only list of steps plus the run-time cursor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "FlowDocument", into = "FlowDocument")]
pub struct Flow {
    steps: Vec<FlowStep>,
    state: FlowState,
    current: Option<ImageId>,
}

impl Default for Flow {
    fn default() -> Self {
        Self::new()
    }
}

impl From<FlowDocument> for Flow {
    fn from(document: FlowDocument) -> Self {
        Self::from_steps(document.steps)
    }
}

impl From<Flow> for FlowDocument {
    fn from(flow: Flow) -> Self {
        Self { steps: flow.steps }
    }
}

impl Flow {
    /// An empty flow.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            steps: Vec::new(),
            state: FlowState::Empty,
            current: None,
        }
    }

    /// A flow holding `steps`, not yet run.
    #[must_use]
    pub fn from_steps(steps: Vec<FlowStep>) -> Self {
        let state = if steps.is_empty() {
            FlowState::Empty
        } else {
            FlowState::Built
        };
        Self {
            steps,
            state,
            current: None,
        }
    }

    /// Append a step. Parameters are checked only when the step runs.
    pub fn add_step(&mut self, step: FlowStep) {
        self.steps.push(step);
        self.state = FlowState::Built;
    }

    /// Remove and return the step at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::StepOutOfBounds`] if `index >= len`; the
    /// flow is left unchanged.
    pub fn remove_step(&mut self, index: usize) -> Result<FlowStep, PipelineError> {
        if index >= self.steps.len() {
            return Err(PipelineError::StepOutOfBounds {
                index,
                len: self.steps.len(),
            });
        }
        let step = self.steps.remove(index);
        self.state = if self.steps.is_empty() {
            FlowState::Empty
        } else {
            FlowState::Built
        };
        Ok(step)
    }

    /// Remove every step.
    pub fn clear(&mut self) {
        self.steps.clear();
        self.state = FlowState::Empty;
        self.current = None;
    }

    /// Steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[FlowStep] {
        &self.steps
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if the flow has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> FlowState {
        self.state
    }

    /// The current image as left by the last run, if any.
    #[must_use]
    pub const fn current_image(&self) -> Option<ImageId> {
        self.current
    }

    /// The image named by the first `read_file` step.
    #[must_use]
    pub fn source_image(&self) -> Option<ImageId> {
        self.steps.iter().find_map(|step| match step {
            FlowStep::ReadFile { image } => Some(*image),
            _ => None,
        })
    }

    /// Execute every step in order.
    ///
    /// The first `read_file` step seeds the current image. Transform steps
    /// (`brightness`, `threshold`, `convolution`, `median`, `difference`)
    /// store a new image and make it current; the other steps only read.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::NoSourceImage`] if there is no `read_file` step,
    /// or [`FlowError::Step`] for the first step that fails. Images stored
    /// by earlier steps remain in `store`.
    pub fn run(&mut self, store: &mut ImageStore) -> Result<RunReport, FlowError> {
        self.state = FlowState::Running;
        self.current = None;
        let result = self.execute(store);
        self.state = match &result {
            Ok(report) => {
                log::info!(
                    "flow completed: {} steps, final image {}",
                    report.steps.len(),
                    report.final_image
                );
                FlowState::Completed
            }
            Err(e) => {
                log::warn!("flow failed: {e}");
                FlowState::Failed
            }
        };
        result
    }

    fn execute(&mut self, store: &mut ImageStore) -> Result<RunReport, FlowError> {
        let started = Instant::now();
        let source = self.source_image().ok_or(FlowError::NoSourceImage)?;
        if !store.contains(source) {
            let index = self
                .steps
                .iter()
                .position(|step| matches!(step, FlowStep::ReadFile { .. }))
                .unwrap_or_default();
            return Err(FlowError::Step {
                index,
                kind: StepKind::ReadFile,
                source: PipelineError::NotFound(source),
            });
        }
        self.current = Some(source);
        let mut current = source;

        let mut records = Vec::with_capacity(self.steps.len());
        for (index, step) in self.steps.iter().enumerate() {
            let kind = step.kind();
            log::debug!("step {index} ({kind}) on {current}");
            let step_started = Instant::now();

            let output = apply(step, current, store).map_err(|source| FlowError::Step {
                index,
                kind,
                source,
            })?;
            if let StepOutput::Produced { image } = output {
                current = image;
                self.current = Some(image);
            }

            records.push(StepRecord {
                index,
                kind,
                output,
                duration: step_started.elapsed(),
            });
        }

        Ok(RunReport {
            final_image: current,
            steps: records,
            total_duration: started.elapsed(),
        })
    }
}

/// Run one step against the current image.
fn apply(
    step: &FlowStep,
    current: ImageId,
    store: &mut ImageStore,
) -> Result<StepOutput, PipelineError> {
    let output = match step {
        FlowStep::ReadFile { .. } => StepOutput::Skipped,
        FlowStep::DisplayImage { image } => {
            let image = image.unwrap_or(current);
            store.dimensions(image)?;
            StepOutput::Display { image }
        }
        FlowStep::Brightness { value } => {
            let out = brightness(&store.get(current)?, *value);
            StepOutput::Produced {
                image: store.put(out),
            }
        }
        FlowStep::Threshold { value } => {
            let t = u8::try_from(*value).map_err(|_| {
                PipelineError::InvalidParameter(format!(
                    "threshold must be within 0..=255, got {value}"
                ))
            })?;
            let out = threshold(&store.get(current)?, t);
            StepOutput::Produced {
                image: store.put(out),
            }
        }
        FlowStep::Convolution { kernel } => {
            let kernel = kernel.build()?;
            let out = convolve(&store.get(current)?, &kernel);
            StepOutput::Produced {
                image: store.put(out),
            }
        }
        FlowStep::Median { window_size } => {
            let out = median_filter(&store.get(current)?, *window_size)?;
            StepOutput::Produced {
                image: store.put(out),
            }
        }
        FlowStep::Difference { first, second } => {
            let out = difference(&store.get(*first)?, &store.get(*second)?)?;
            StepOutput::Produced {
                image: store.put(out),
            }
        }
        FlowStep::Histogram { image } => {
            let image = image.unwrap_or(current);
            let histogram = Histogram::of(&store.get(image)?);
            StepOutput::Histogram { image, histogram }
        }
        FlowStep::CompareImages { first, second } => StepOutput::Composite {
            first: *first,
            second: *second,
            canvas: compare_composite(&store.get(*first)?, &store.get(*second)?),
        },
        FlowStep::SaveFile { image, filename } => {
            let image = image.unwrap_or(current);
            let dimensions = store.dimensions(image)?;
            let filename = filename
                .clone()
                .unwrap_or_else(|| format!("image_{image}_{dimensions}.raw"));
            StepOutput::Save { image, filename }
        }
    };
    Ok(output)
}
