//! Population-level multi-layer block structure.
//!
//! An N×N block matrix over a cohort of N subjects with V vertices each:
//! block (i,i) holds subject i's dense symmetric affinity matrix, block (i,j)
//! the sparse fingerprint-weighted cross-edge matrix between subjects i and
//! j. Off-diagonal symmetry is enforced by construction: [`set_cross`]
//! stores the (i,j) block and its transpose at (j,i) in one operation, and
//! off-diagonal blocks are never computed independently in both directions.
//!
//! Blocks follow a write-once discipline: diagonal blocks are populated at
//! most once (lazily, the first time a subject is encountered) and cross
//! blocks at most once per unordered pair. Violations are programmer errors
//! and panic. Absent blocks are legitimate: a pair skipped over an embedding
//! failure simply leaves its slots empty.
//!
//! [`set_cross`]: MultiLayerGraph::set_cross

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use sprs::CsMat;

use log::{debug, trace};

/// N×N block store for one hemisphere's cohort graph.
#[derive(Debug, Clone)]
pub struct MultiLayerGraph {
    nsubjects: usize,
    /// Vertex count shared by every block; fixed by the first diagonal write.
    nvertices: usize,
    diagonal: Vec<Option<DenseMatrix<f64>>>,
    cross: HashMap<(usize, usize), CsMat<f64>>,
}

/// Plain-data summary of a graph, serializable for external persistence and
/// reporting collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiLayerStats {
    pub nsubjects: usize,
    pub nvertices: usize,
    pub diagonal_set: usize,
    pub cross_pairs: usize,
    pub cross_nnz: usize,
}

impl MultiLayerGraph {
    /// Creates an empty block structure for `nsubjects` subjects. The vertex
    /// count is fixed by the first diagonal block stored.
    pub fn new(nsubjects: usize) -> Self {
        debug!("Creating MultiLayerGraph for {} subjects", nsubjects);
        Self {
            nsubjects,
            nvertices: 0,
            diagonal: vec![None; nsubjects],
            cross: HashMap::new(),
        }
    }

    /// Cohort size N.
    pub fn nsubjects(&self) -> usize {
        self.nsubjects
    }

    /// Vertex count V, or 0 while no diagonal block has been stored yet.
    pub fn nvertices(&self) -> usize {
        self.nvertices
    }

    /// Stores subject `i`'s affinity matrix at block (i,i).
    ///
    /// # Panics
    ///
    /// Panics if the block is already set, the matrix is not square, or its
    /// size disagrees with previously stored blocks.
    pub fn set_diagonal(&mut self, i: usize, affinity: DenseMatrix<f64>) {
        assert!(i < self.nsubjects, "subject index {} out of bounds", i);
        assert!(
            self.diagonal[i].is_none(),
            "diagonal block ({},{}) written twice",
            i,
            i
        );
        let (rows, cols) = affinity.shape();
        assert_eq!(rows, cols, "affinity matrix must be square, got {}x{}", rows, cols);
        if self.nvertices == 0 {
            self.nvertices = rows;
        }
        assert_eq!(
            rows, self.nvertices,
            "affinity matrix size {} disagrees with cohort vertex count {}",
            rows, self.nvertices
        );

        trace!("Storing diagonal block ({},{})", i, i);
        self.diagonal[i] = Some(affinity);
    }

    /// Stores the cross-edge matrix for the unordered pair {i,j}: `block` at
    /// (i,j) and its transpose at (j,i).
    ///
    /// # Panics
    ///
    /// Panics if `i == j`, either slot is already set, or the block is not
    /// V×V.
    pub fn set_cross(&mut self, i: usize, j: usize, block: CsMat<f64>) {
        assert!(i != j, "cross block requires two distinct subjects, got ({},{})", i, j);
        assert!(i < self.nsubjects && j < self.nsubjects, "pair ({},{}) out of bounds", i, j);
        assert!(
            !self.cross.contains_key(&(i, j)) && !self.cross.contains_key(&(j, i)),
            "cross block ({},{}) written twice",
            i,
            j
        );
        assert_eq!(
            block.shape(),
            (self.nvertices, self.nvertices),
            "cross block must be {0}x{0}",
            self.nvertices
        );

        trace!(
            "Storing cross blocks ({},{}) and ({},{}), {} non-zeros",
            i,
            j,
            j,
            i,
            block.nnz()
        );
        let transposed = block.transpose_view().to_csr();
        self.cross.insert((j, i), transposed);
        self.cross.insert((i, j), block);
    }

    /// Subject `i`'s affinity matrix, if its diagonal block was populated.
    pub fn diagonal_block(&self, i: usize) -> Option<&DenseMatrix<f64>> {
        self.diagonal.get(i).and_then(|b| b.as_ref())
    }

    /// Cross-edge matrix at block (i,j), if the pair was processed.
    pub fn cross_block(&self, i: usize, j: usize) -> Option<&CsMat<f64>> {
        self.cross.get(&(i, j))
    }

    /// Number of populated diagonal blocks.
    pub fn diagonal_count(&self) -> usize {
        self.diagonal.iter().filter(|b| b.is_some()).count()
    }

    /// Number of processed unordered pairs (each stored as two blocks).
    pub fn cross_pair_count(&self) -> usize {
        self.cross.len() / 2
    }

    /// Extracts the sub-cohort graph over `subjects` (indices into the
    /// original roster), preserving block structure and sparsity. Block (a,b)
    /// of the result is block (subjects[a], subjects[b]) of `self`.
    pub fn subgraph(&self, subjects: &[usize]) -> MultiLayerGraph {
        debug!("Extracting subgraph over {} subjects", subjects.len());
        let mut sub = MultiLayerGraph::new(subjects.len());
        sub.nvertices = self.nvertices;
        for (a, &i) in subjects.iter().enumerate() {
            assert!(i < self.nsubjects, "subject index {} out of bounds", i);
            sub.diagonal[a] = self.diagonal[i].clone();
        }
        for (a, &i) in subjects.iter().enumerate() {
            for (b, &j) in subjects.iter().enumerate() {
                if let Some(block) = self.cross.get(&(i, j)) {
                    sub.cross.insert((a, b), block.clone());
                }
            }
        }
        sub
    }

    /// Structural summary of the assembled graph.
    pub fn stats(&self) -> MultiLayerStats {
        MultiLayerStats {
            nsubjects: self.nsubjects,
            nvertices: self.nvertices,
            diagonal_set: self.diagonal_count(),
            cross_pairs: self.cross_pair_count(),
            cross_nnz: self.cross.values().map(|m| m.nnz()).sum::<usize>() / 2,
        }
    }
}

impl fmt::Display for MultiLayerGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats();
        writeln!(
            f,
            "MultiLayerGraph: {} subjects x {} vertices",
            stats.nsubjects, stats.nvertices
        )?;
        writeln!(
            f,
            "  diagonal blocks: {}/{}",
            stats.diagonal_set, stats.nsubjects
        )?;
        let total_pairs = stats.nsubjects * stats.nsubjects.saturating_sub(1) / 2;
        writeln!(
            f,
            "  cross pairs: {}/{} ({} weighted edges)",
            stats.cross_pairs, total_pairs, stats.cross_nnz
        )?;
        Ok(())
    }
}
