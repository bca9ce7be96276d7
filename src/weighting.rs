//! Fingerprint-weighted cross-edges between two matched subjects.
//!
//! A vertex's connectivity fingerprint is its row in the subject's V×V
//! timeseries correlation matrix. For each matched vertex pair (k of subject
//! A, m of subject B) the Pearson correlation of the two fingerprints is
//! computed; positive correlations become Fisher-z edge weights in the sparse
//! cross-edge matrix, non-positive correlations are discarded. Sparsity is
//! intentional: an entirely empty cross-edge matrix is a legitimate result,
//! not a failure.
//!
//! Both correspondence directions accumulate into the same matrix: the
//! forward map writes entry (k, forward[k]) and the backward map writes
//! (backward[m], m). A forward and a backward hit on the same cell carry the
//! same correlation, so entries are collected through a `BTreeMap` (last
//! write wins, deterministic iteration order) rather than summed.

use std::collections::BTreeMap;

use rayon::prelude::*;
use smartcore::linalg::basic::arrays::{Array, Array2};
use smartcore::linalg::basic::matrix::DenseMatrix;
use sprs::{CsMat, TriMat};

use log::{debug, info, trace};

use crate::error::CorticomapError;
use crate::matching::Correspondence;
use crate::operators::{fisher_z, matrix_rows, pearson};

/// Computes a subject's V×V fingerprint matrix: the row-wise Pearson
/// correlation of the raw timeseries (rows = vertices, columns = samples).
///
/// Computed once per subject when the assembler first encounters it, and
/// immutable afterwards.
pub fn fingerprint_matrix(timeseries: &DenseMatrix<f64>) -> DenseMatrix<f64> {
    let (v, samples) = timeseries.shape();
    info!(
        "Computing fingerprint matrix: {} vertices, {} timepoints",
        v, samples
    );

    let rows = matrix_rows(timeseries);
    let data: Vec<f64> = (0..v)
        .into_par_iter()
        .flat_map_iter(|i| {
            let rows = &rows;
            (0..v).map(move |j| pearson(&rows[i], &rows[j]))
        })
        .collect();

    let fp = DenseMatrix::from_iterator(data.into_iter(), v, v, 0);
    debug!("Fingerprint matrix complete: {}x{}", v, v);
    fp
}

/// Weighs a correspondence into a sparse V×V cross-edge matrix.
///
/// Entry (k, m) is `atanh(r)` for the fingerprint correlation `r` of matched
/// pair (k, m) when `r > 0`; matches with `r <= 0` leave the cell zero.
/// All stored weights are therefore strictly positive.
///
/// # Errors
///
/// [`CorticomapError::ShapeMismatch`] when the fingerprint matrices or the
/// correspondence maps disagree on the vertex count.
pub fn weigh_correspondences(
    corrs_x: &DenseMatrix<f64>,
    corrs_y: &DenseMatrix<f64>,
    correspondence: &Correspondence,
) -> Result<CsMat<f64>, CorticomapError> {
    let (vx, cx) = corrs_x.shape();
    let (vy, cy) = corrs_y.shape();
    if vx != cx || vy != cy || vx != vy {
        return Err(CorticomapError::shape(
            "weighting",
            format!("{}x{} fingerprint matrices for both subjects", vx, vx),
            format!("{}x{} vs {}x{}", vx, cx, vy, cy),
        ));
    }
    if correspondence.forward.len() != vx || correspondence.backward.len() != vx {
        return Err(CorticomapError::shape(
            "weighting",
            format!("correspondence maps of length {}", vx),
            format!(
                "forward {} / backward {}",
                correspondence.forward.len(),
                correspondence.backward.len()
            ),
        ));
    }

    info!("Weighting correspondences for {} vertices", vx);

    let x_rows = matrix_rows(corrs_x);
    let y_rows = matrix_rows(corrs_y);

    // Candidate edges from both directions; computed in parallel, folded
    // sequentially for a deterministic sparse layout.
    let forward_edges: Vec<Option<((usize, usize), f64)>> = correspondence
        .forward
        .par_iter()
        .enumerate()
        .map(|(k, &m)| {
            let r = pearson(&x_rows[k], &y_rows[m]);
            if r > 0.0 {
                Some(((k, m), fisher_z(r)))
            } else {
                None
            }
        })
        .collect();
    let backward_edges: Vec<Option<((usize, usize), f64)>> = correspondence
        .backward
        .par_iter()
        .enumerate()
        .map(|(m, &k)| {
            let r = pearson(&x_rows[k], &y_rows[m]);
            if r > 0.0 {
                Some(((k, m), fisher_z(r)))
            } else {
                None
            }
        })
        .collect();

    let mut edges: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    for entry in forward_edges.into_iter().chain(backward_edges).flatten() {
        edges.insert(entry.0, entry.1);
    }

    trace!("Converting {} edges to CSR", edges.len());
    let mut triplets = TriMat::new((vx, vx));
    for (&(k, m), &w) in edges.iter() {
        triplets.add_triplet(k, m, w);
    }
    let cross: CsMat<f64> = triplets.to_csr();

    debug!(
        "Cross-edge matrix complete: {} non-zeros out of {} matched pairs",
        cross.nnz(),
        2 * vx
    );
    Ok(cross)
}
