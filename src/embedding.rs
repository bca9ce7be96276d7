//! Spectral embedding: low eigenpairs of a subject's graph Laplacian.
//!
//! The embedder computes the `num_eigvectors` smallest-magnitude eigenpairs
//! of the Laplacian, sorts them by ascending eigenvalue, and discards the
//! first column (the near-zero trivial mode tied to the graph's connected-
//! component structure). The result is a V×(k−1) coordinate matrix whose rows
//! correspond 1:1 to the vertex indices of the source affinity matrix.
//!
//! [`Embedder`] is the seam for the eigensolver: the default [`EvdEmbedder`]
//! runs smartcore's dense symmetric EVD, and tests inject failing
//! implementations to exercise the skip-on-non-convergence path.

use smartcore::linalg::basic::arrays::{Array, Array2};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linalg::traits::evd::EVDDecomposable;

use log::{debug, info, trace, warn};

use crate::error::CorticomapError;
use crate::laplacian::GraphLaplacian;
use crate::operators::matrix_row;

/// Spectral coordinates of one subject's vertices.
#[derive(Debug, Clone)]
pub struct Embedding {
    /// V×(k−1) coordinate matrix; the trivial mode is already removed.
    pub coords: DenseMatrix<f64>,
    /// The k retained eigenvalues in non-decreasing order, trivial mode
    /// included (its coordinates are not).
    pub eigenvalues: Vec<f64>,
}

impl Embedding {
    /// Number of embedded vertices (rows).
    pub fn nvertices(&self) -> usize {
        self.coords.shape().0
    }

    /// Embedding dimensionality (columns), i.e. `num_eigvectors - 1`.
    pub fn dim(&self) -> usize {
        self.coords.shape().1
    }

    /// Spectral coordinates of vertex `i`.
    pub fn vertex(&self, i: usize) -> Vec<f64> {
        matrix_row(&self.coords, i)
    }
}

/// Eigensolver seam: produces an [`Embedding`] from a Laplacian or reports
/// a per-subject convergence failure.
pub trait Embedder: Send + Sync {
    /// Embeds one subject's Laplacian.
    ///
    /// # Errors
    ///
    /// [`CorticomapError::Convergence`] when the solver fails for this
    /// subject (recoverable: the assembler skips the subject's pairs);
    /// [`CorticomapError::ShapeMismatch`] when the requested eigencount
    /// exceeds the vertex count (a contract violation, fatal).
    fn embed(&self, subject: &str, lap: &GraphLaplacian) -> Result<Embedding, CorticomapError>;
}

/// Default embedder: dense symmetric eigendecomposition.
#[derive(Debug, Clone)]
pub struct EvdEmbedder {
    /// Number of eigenpairs to retain (k ≥ 2); the embedding has k−1 columns.
    pub num_eigvectors: usize,
}

impl EvdEmbedder {
    pub fn new(num_eigvectors: usize) -> Self {
        assert!(num_eigvectors >= 2, "num_eigvectors must be at least 2");
        Self { num_eigvectors }
    }
}

impl Embedder for EvdEmbedder {
    fn embed(&self, subject: &str, lap: &GraphLaplacian) -> Result<Embedding, CorticomapError> {
        let v = lap.nnodes;
        let k = self.num_eigvectors;

        if k > v {
            return Err(CorticomapError::shape(
                "embedding",
                format!("num_eigvectors <= {} vertices", v),
                format!("num_eigvectors = {}", k),
            ));
        }

        info!(
            "Embedding subject '{}': {} vertices, {} eigenpairs requested",
            subject, v, k
        );

        let evd = lap.matrix.evd(true).map_err(|e| {
            warn!("EVD failed for subject '{}': {:?}", subject, e);
            CorticomapError::Convergence { subject: subject.to_string() }
        })?;

        // Select the k smallest-magnitude eigenpairs, then order the
        // selection by ascending eigenvalue. For a PSD Laplacian the two
        // orderings coincide; the magnitude pass guards the normalised /
        // mixed-sign case.
        trace!("Sorting {} eigenpairs", evd.d.len());
        let mut order: Vec<usize> = (0..evd.d.len()).collect();
        order.sort_by(|&a, &b| {
            evd.d[a]
                .abs()
                .partial_cmp(&evd.d[b].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.cmp(&b))
        });
        order.truncate(k);
        order.sort_by(|&a, &b| {
            evd.d[a]
                .partial_cmp(&evd.d[b])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.cmp(&b))
        });

        let eigenvalues: Vec<f64> = order.iter().map(|&idx| evd.d[idx]).collect();
        debug!(
            "Retained eigenvalues: first={:.6e}, last={:.6e}",
            eigenvalues[0],
            eigenvalues[k - 1]
        );

        // Drop the trivial mode (first sorted column), keep columns 1..k.
        let mut data = Vec::with_capacity(v * (k - 1));
        for row in 0..v {
            for &idx in order.iter().skip(1) {
                data.push(*evd.V.get((row, idx)));
            }
        }
        let coords = DenseMatrix::from_iterator(data.into_iter(), v, k - 1, 0);

        info!(
            "Embedding complete for '{}': {}x{} coordinates",
            subject,
            v,
            k - 1
        );
        Ok(Embedding { coords, eigenvalues })
    }
}
