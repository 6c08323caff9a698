//! Run diagnostics: what each flow step produced and how long it took.
//!
//! Durations are measured with the `web-time` crate (`performance.now()` on
//! WASM, `std::time::Instant` on native) and serialized as fractional
//! seconds (`f64`) for JSON compatibility.

use std::fmt::Write;
use std::time::Duration;

use serde::Serialize;

use crate::flow::{StepKind, StepOutput};
use crate::types::ImageId;

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }
}

/// Outcome of one executed flow step.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    /// Position of the step in the flow.
    pub index: usize,
    /// Which operation ran.
    pub kind: StepKind,
    /// What the step produced.
    pub output: StepOutput,
    /// Wall-clock duration of the step (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

/// Result of a successful [`Flow::run`](crate::Flow::run).
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// The current image after the last step.
    pub final_image: ImageId,
    /// One record per step, in execution order.
    pub steps: Vec<StepRecord>,
    /// Total wall-clock duration of the run (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
}

impl RunReport {
    /// Identifiers of every image the run added to the store, in order.
    #[must_use]
    pub fn produced_images(&self) -> Vec<ImageId> {
        self.steps
            .iter()
            .filter_map(|record| match record.output {
                StepOutput::Produced { image } => Some(image),
                _ => None,
            })
            .collect()
    }

    /// Human-readable table of steps and timings.
    #[must_use]
    pub fn report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{:<4} {:<16} {:<28} {:>10}", "#", "Step", "Output", "Time (ms)");
        let _ = writeln!(out, "{}", "-".repeat(61));
        for record in &self.steps {
            let _ = writeln!(
                out,
                "{:<4} {:<16} {:<28} {:>10.3}",
                record.index,
                record.kind.to_string(),
                record.output.summary(),
                record.duration.as_secs_f64() * 1000.0,
            );
        }
        let _ = writeln!(out, "{}", "-".repeat(61));
        let _ = writeln!(
            out,
            "Final image: {}  total: {:.3}ms",
            self.final_image,
            self.total_duration.as_secs_f64() * 1000.0,
        );
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> RunReport {
        RunReport {
            final_image: ImageId::new(3),
            steps: vec![
                StepRecord {
                    index: 0,
                    kind: StepKind::ReadFile,
                    output: StepOutput::Skipped,
                    duration: Duration::from_micros(5),
                },
                StepRecord {
                    index: 1,
                    kind: StepKind::Brightness,
                    output: StepOutput::Produced {
                        image: ImageId::new(2),
                    },
                    duration: Duration::from_millis(2),
                },
                StepRecord {
                    index: 2,
                    kind: StepKind::Threshold,
                    output: StepOutput::Produced {
                        image: ImageId::new(3),
                    },
                    duration: Duration::from_millis(1),
                },
            ],
            total_duration: Duration::from_millis(3),
        }
    }

    #[test]
    fn produced_images_in_order() {
        assert_eq!(
            sample().produced_images(),
            vec![ImageId::new(2), ImageId::new(3)]
        );
    }

    #[test]
    fn report_lists_every_step() {
        let text = sample().report();
        assert!(text.contains("read_file"));
        assert!(text.contains("brightness"));
        assert!(text.contains("-> img_3"));
        assert!(text.contains("Final image: img_3"));
    }

    #[test]
    fn durations_serialize_as_seconds() {
        let json = serde_json::to_value(sample()).unwrap();
        let total = json["total_duration"].as_f64().unwrap();
        assert!((total - 0.003).abs() < 1e-12);
        assert_eq!(json["steps"][1]["kind"], "brightness");
    }
}
