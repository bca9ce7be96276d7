//! Shared numeric kernels used across the matching pipeline.
//!
//! - Euclidean norm, dot product and squared distance over slices
//! - Pearson correlation with zero-variance guard
//! - Fisher z (hyperbolic arctangent) transform with saturation cap
//! - Row/column extraction from smartcore dense matrices

use smartcore::linalg::basic::arrays::{Array, Array2};
use smartcore::linalg::basic::matrix::DenseMatrix;

/// Correlations are clamped below 1.0 before the Fisher transform so that
/// perfectly correlated fingerprints produce a finite, saturated weight
/// instead of +inf.
pub const MAX_CORRELATION: f64 = 1.0 - 1e-7;

/// Computes the Euclidean norm (L2) without allocating.
#[inline]
pub fn norm(a: &[f64]) -> f64 {
    a.iter().map(|&x| x * x).sum::<f64>().sqrt()
}

/// Dot product of two slices.
///
/// # Panics
///
/// Panics if the lengths differ.
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len(), "Dimension mismatch");
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Squared Euclidean distance between two slices.
///
/// # Panics
///
/// Panics if the lengths differ.
#[inline]
pub fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len(), "Dimension mismatch");
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Pearson correlation coefficient between two slices.
///
/// Returns 0.0 when either input has (near-)zero variance, so constant
/// fingerprints never produce an edge downstream.
///
/// # Panics
///
/// Panics if the lengths differ.
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len(), "Dimension mismatch");
    let n = a.len();
    if n == 0 {
        return 0.0;
    }
    let mean_a = a.iter().sum::<f64>() / n as f64;
    let mean_b = b.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for i in 0..n {
        let da = a[i] - mean_a;
        let db = b[i] - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    let denom = (var_a * var_b).sqrt();
    if denom > 1e-15 {
        (cov / denom).clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Fisher z transform of a correlation coefficient: `atanh(r)` with the
/// argument capped at [`MAX_CORRELATION`] in magnitude to keep weights finite.
#[inline]
pub fn fisher_z(r: f64) -> f64 {
    r.clamp(-MAX_CORRELATION, MAX_CORRELATION).atanh()
}

/// Extracts row `i` of a dense matrix as an owned vector.
pub fn matrix_row(m: &DenseMatrix<f64>, i: usize) -> Vec<f64> {
    m.get_row(i).iterator(0).copied().collect()
}

/// Extracts column `j` of a dense matrix as an owned vector.
pub fn matrix_col(m: &DenseMatrix<f64>, j: usize) -> Vec<f64> {
    m.get_col(j).iterator(0).copied().collect()
}

/// Extracts every row of a dense matrix as owned vectors.
///
/// The matcher and weigher scan rows repeatedly and want contiguous slices
/// rather than per-access views.
pub fn matrix_rows(m: &DenseMatrix<f64>) -> Vec<Vec<f64>> {
    let (nrows, _) = m.shape();
    (0..nrows).map(|i| matrix_row(m, i)).collect()
}
