//! Convolution kernels (masks).

use serde::{Deserialize, Serialize};

use crate::types::PipelineError;

/// A square, odd-sized matrix of convolution weights, stored row-major.
///
/// Weights are used as given: asymmetric and non-normalized kernels are
/// valid.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    size: usize,
    weights: Vec<f64>,
}

impl Kernel {
    /// Build a kernel from a list of rows.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidParameter`] if `rows` is empty, any
    /// row length differs from the number of rows, the size is even, or a
    /// weight is not finite.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, PipelineError> {
        let size = rows.len();
        if size == 0 {
            return Err(PipelineError::InvalidParameter(
                "kernel must have at least one row".to_string(),
            ));
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != size) {
            return Err(PipelineError::InvalidParameter(format!(
                "kernel is not square: row {i} has {} weights, expected {size}",
                row.len()
            )));
        }
        if size % 2 == 0 {
            return Err(PipelineError::InvalidParameter(format!(
                "kernel size must be odd, got {size}"
            )));
        }
        let weights: Vec<f64> = rows.iter().flatten().copied().collect();
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(PipelineError::InvalidParameter(
                "kernel weights must be finite".to_string(),
            ));
        }
        Ok(Self { size, weights })
    }

    /// Mean (box) kernel: `size x size` weights of `1 / size²`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidParameter`] if `size` is zero or even.
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(size: usize) -> Result<Self, PipelineError> {
        if size == 0 || size % 2 == 0 {
            return Err(PipelineError::InvalidParameter(format!(
                "mean kernel size must be odd and positive, got {size}"
            )));
        }
        let weight = 1.0 / (size * size) as f64;
        Ok(Self {
            size,
            weights: vec![weight; size * size],
        })
    }

    /// 4-neighbour Laplacian.
    #[must_use]
    pub fn laplacian4() -> Self {
        Self {
            size: 3,
            weights: vec![0.0, -1.0, 0.0, -1.0, 4.0, -1.0, 0.0, -1.0, 0.0],
        }
    }

    /// 8-neighbour Laplacian.
    #[must_use]
    pub fn laplacian8() -> Self {
        Self {
            size: 3,
            weights: vec![-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0],
        }
    }

    /// Side length.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Neighbourhood radius, `size / 2`.
    #[must_use]
    pub const fn radius(&self) -> usize {
        self.size / 2
    }

    /// Weight at row `ky`, column `kx`.
    #[must_use]
    pub fn weight(&self, ky: usize, kx: usize) -> f64 {
        self.weights[ky * self.size + kx]
    }

    /// All weights, row-major.
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Weights as a list of rows.
    #[must_use]
    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.weights.chunks(self.size).map(<[f64]>::to_vec).collect()
    }
}

/// Serializable description of a kernel, as written in flow documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KernelSpec {
    /// Box blur of the given odd size.
    Mean {
        /// Side length.
        size: usize,
    },
    /// 4-neighbour Laplacian.
    Laplacian4,
    /// 8-neighbour Laplacian.
    Laplacian8,
    /// Caller-supplied weights.
    Custom {
        /// Rows of weights; must form an odd-sized square.
        weights: Vec<Vec<f64>>,
    },
}

impl KernelSpec {
    /// Materialize the kernel.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidParameter`] for an even or zero mean
    /// size, or a malformed custom kernel.
    pub fn build(&self) -> Result<Kernel, PipelineError> {
        match self {
            Self::Mean { size } => Kernel::mean(*size),
            Self::Laplacian4 => Ok(Kernel::laplacian4()),
            Self::Laplacian8 => Ok(Kernel::laplacian8()),
            Self::Custom { weights } => Kernel::from_rows(weights),
        }
    }
}
