//! Aligns two independently computed spectral embeddings into comparable
//! coordinate systems.
//!
//! Laplacian eigenvectors are defined only up to sign, and up to rotation
//! within near-degenerate eigenspaces, so two subjects' embeddings cannot be
//! compared by Euclidean distance as-is. The aligner resolves both ambiguities
//! with a deterministic greedy assignment:
//!
//! 1. Axes of subject A are kept in their natural (ascending-eigenvalue)
//!    order, truncated to `num_ordered`.
//! 2. For each A axis in turn, the not-yet-assigned B axis with the largest
//!    absolute Pearson correlation against it is selected; ties break toward
//!    the lowest axis index.
//! 3. The selected B axis is sign-flipped when the correlation is negative.
//!
//! The transform is applied identically to every row of a subject's
//! embedding; there is no per-vertex special-casing, so nearest-neighbor
//! distances in the aligned space remain meaningful.

use smartcore::linalg::basic::arrays::{Array, Array2};
use smartcore::linalg::basic::matrix::DenseMatrix;

use log::{debug, info, trace};

use crate::embedding::Embedding;
use crate::error::CorticomapError;
use crate::operators::{matrix_col, pearson};

/// Two embeddings in a shared coordinate convention, truncated to
/// `num_ordered` axes. Transient: recomputed per subject pair.
#[derive(Debug, Clone)]
pub struct AlignedPair {
    pub xs: DenseMatrix<f64>,
    pub ys: DenseMatrix<f64>,
}

impl AlignedPair {
    /// Shared dimensionality of the aligned pair.
    pub fn dim(&self) -> usize {
        self.xs.shape().1
    }

    /// Number of vertices per subject.
    pub fn nvertices(&self) -> usize {
        self.xs.shape().0
    }
}

/// Aligns embeddings `x` (subject A) and `y` (subject B) onto `num_ordered`
/// shared axes.
///
/// # Errors
///
/// [`CorticomapError::ShapeMismatch`] when the vertex counts differ or
/// `num_ordered` exceeds either embedding's dimensionality.
pub fn align_embeddings(
    x: &Embedding,
    y: &Embedding,
    num_ordered: usize,
) -> Result<AlignedPair, CorticomapError> {
    let (vx, dx) = x.coords.shape();
    let (vy, dy) = y.coords.shape();

    if vx != vy {
        return Err(CorticomapError::shape(
            "alignment",
            format!("{} vertices in both embeddings", vx),
            format!("{} vs {}", vx, vy),
        ));
    }
    if num_ordered == 0 || num_ordered > dx.min(dy) {
        return Err(CorticomapError::shape(
            "alignment",
            format!("1 <= num_ordered <= {}", dx.min(dy)),
            format!("num_ordered = {}", num_ordered),
        ));
    }

    info!(
        "Aligning embeddings: {} vertices, {}/{} axes -> {} ordered axes",
        vx, dx, dy, num_ordered
    );

    let x_cols: Vec<Vec<f64>> = (0..num_ordered).map(|m| matrix_col(&x.coords, m)).collect();
    let y_cols: Vec<Vec<f64>> = (0..dy).map(|m| matrix_col(&y.coords, m)).collect();

    // Greedy axis assignment: strict > comparison while scanning candidates
    // in ascending index order makes ties deterministic.
    let mut used = vec![false; dy];
    let mut chosen: Vec<(usize, f64)> = Vec::with_capacity(num_ordered);
    for (m, xc) in x_cols.iter().enumerate() {
        let mut best_axis = usize::MAX;
        let mut best_abs = f64::NEG_INFINITY;
        let mut best_r = 0.0;
        for (b, yc) in y_cols.iter().enumerate() {
            if used[b] {
                continue;
            }
            let r = pearson(xc, yc);
            if r.abs() > best_abs {
                best_abs = r.abs();
                best_axis = b;
                best_r = r;
            }
        }
        used[best_axis] = true;
        let sign = if best_r < 0.0 { -1.0 } else { 1.0 };
        trace!(
            "Axis {} of A matched to axis {} of B (r={:.4}, sign={})",
            m, best_axis, best_r, sign
        );
        chosen.push((best_axis, sign));
    }

    debug!(
        "Axis assignment: {:?}",
        chosen.iter().map(|&(b, s)| (b, s as i8)).collect::<Vec<_>>()
    );

    let mut xs_data = Vec::with_capacity(vx * num_ordered);
    let mut ys_data = Vec::with_capacity(vx * num_ordered);
    for row in 0..vx {
        for m in 0..num_ordered {
            xs_data.push(*x.coords.get((row, m)));
        }
        for &(b, sign) in &chosen {
            ys_data.push(sign * *y.coords.get((row, b)));
        }
    }

    let xs = DenseMatrix::from_iterator(xs_data.into_iter(), vx, num_ordered, 0);
    let ys = DenseMatrix::from_iterator(ys_data.into_iter(), vx, num_ordered, 0);

    info!("Alignment complete: {} shared axes", num_ordered);
    Ok(AlignedPair { xs, ys })
}
