//! Builds a graph Laplacian from a subject's affinity matrix.
//!
//! The affinity matrix W is a V×V symmetric matrix of Fisher-transformed
//! connection strengths between cortical vertices. The Laplacian is either
//! the combinatorial form `L = D - W` (D = diagonal degree matrix) or the
//! symmetric-normalised form `L = I - D^{-1/2} W D^{-1/2}`.
//!
//! Construction is deterministic and side-effect free; the only failure mode
//! is a non-square input, which is a data-contract violation from the loader.

use smartcore::linalg::basic::arrays::{Array, Array2};
use smartcore::linalg::basic::matrix::DenseMatrix;

use log::{debug, info, trace};

use crate::error::CorticomapError;

/// Graph Laplacian of one subject's affinity matrix.
///
/// Owned transiently by the embedding stage; never persisted into the
/// multi-layer graph.
#[derive(Debug, Clone)]
pub struct GraphLaplacian {
    pub matrix: DenseMatrix<f64>,
    pub nnodes: usize,
    pub normalised: bool,
}

impl GraphLaplacian {
    /// Matrix dimensions as (rows, cols).
    pub fn shape(&self) -> (usize, usize) {
        self.matrix.shape()
    }

    /// Diagonal entries (vertex degrees for the combinatorial form).
    pub fn degrees(&self) -> Vec<f64> {
        (0..self.nnodes).map(|i| *self.matrix.get((i, i))).collect()
    }

    /// Maximum absolute row sum; ≈ 0 for a valid combinatorial Laplacian.
    pub fn max_row_sum_error(&self) -> f64 {
        let mut max_err: f64 = 0.0;
        for i in 0..self.nnodes {
            let row_sum: f64 = (0..self.nnodes).map(|j| *self.matrix.get((i, j))).sum();
            max_err = max_err.max(row_sum.abs());
        }
        max_err
    }
}

/// Builds the Laplacian of an affinity matrix.
///
/// # Arguments
///
/// * `affinity` - V×V symmetric affinity matrix W
/// * `normalised` - when true, build `I - D^{-1/2} W D^{-1/2}` instead of `D - W`
///
/// # Errors
///
/// Returns [`CorticomapError::ShapeMismatch`] if `affinity` is not square.
pub fn build_laplacian(
    affinity: &DenseMatrix<f64>,
    normalised: bool,
) -> Result<GraphLaplacian, CorticomapError> {
    let (nrows, ncols) = affinity.shape();
    if nrows != ncols {
        return Err(CorticomapError::shape(
            "laplacian",
            "square affinity matrix",
            format!("{}x{}", nrows, ncols),
        ));
    }
    let n = nrows;

    info!(
        "Building {} Laplacian for {} vertices",
        if normalised { "normalised" } else { "combinatorial" },
        n
    );

    trace!("Computing vertex degrees");
    let degrees: Vec<f64> = (0..n)
        .map(|i| (0..n).map(|j| *affinity.get((i, j))).sum())
        .collect();

    let (min_deg, max_deg) = degrees
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &d| {
            (lo.min(d), hi.max(d))
        });
    debug!("Degree range: [{:.6}, {:.6}]", min_deg, max_deg);

    let mut data = Vec::with_capacity(n * n);
    if normalised {
        // Isolated vertices (zero degree) get a zero row rather than a
        // division blow-up.
        let inv_sqrt: Vec<f64> = degrees
            .iter()
            .map(|&d| if d.abs() > 1e-15 { 1.0 / d.abs().sqrt() } else { 0.0 })
            .collect();
        for i in 0..n {
            for j in 0..n {
                let w = *affinity.get((i, j));
                let scaled = inv_sqrt[i] * w * inv_sqrt[j];
                if i == j {
                    data.push(if degrees[i].abs() > 1e-15 { 1.0 - scaled } else { 0.0 });
                } else {
                    data.push(-scaled);
                }
            }
        }
    } else {
        for i in 0..n {
            for j in 0..n {
                let w = *affinity.get((i, j));
                if i == j {
                    data.push(degrees[i] - w);
                } else {
                    data.push(-w);
                }
            }
        }
    }

    let matrix = DenseMatrix::from_iterator(data.into_iter(), n, n, 0);
    let lap = GraphLaplacian { matrix, nnodes: n, normalised };

    debug!(
        "Laplacian built: {}x{}, max row-sum error {:.2e}",
        n,
        n,
        lap.max_row_sum_error()
    );
    Ok(lap)
}
