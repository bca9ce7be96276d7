//! Cohort assembly: drives the pairwise spectral-matching pipeline over all
//! subject pairs and owns the population-level block structure.
//!
//! For every unordered pair (i, j) of the roster the assembler ensures both
//! subjects' diagonal state exists (affinity, fingerprint matrix, spectral
//! embedding: computed lazily, memoized, never recomputed), then runs
//! align → match → weigh to obtain a sparse cross-edge matrix stored at
//! block (i, j) with its transpose at (j, i).
//!
//! A subject whose eigensolver failed keeps an `Err` in the memoization
//! cache; every pair referencing it is skipped with a warning and its
//! off-diagonal blocks stay empty, while the run continues. Shape and loader
//! errors abort the run with stage context.
//!
//! Two drivers are provided: [`CohortAssembler::assemble`] visits pairs
//! sequentially in the fixed nested order, and
//! [`CohortAssembler::assemble_parallel`] runs the two independent phases
//! (per-subject diagonal state, then per-pair cross blocks) under rayon with
//! write-once publication and no locking beyond the phase-1 cache inserts.

use std::collections::HashMap;

use dashmap::DashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use sprs::CsMat;

use log::{debug, info, trace, warn};

use crate::alignment::align_embeddings;
use crate::embedding::{Embedder, Embedding, EvdEmbedder};
use crate::error::CorticomapError;
use crate::graph::MultiLayerGraph;
use crate::laplacian::build_laplacian;
use crate::loader::{Hemisphere, SubjectLoader};
use crate::matching::match_correspondences;
use crate::weighting::{fingerprint_matrix, weigh_correspondences};

/// Recognized configuration options for a cohort run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortParams {
    pub hemisphere: Hemisphere,
    /// Eigenpairs retained per subject (k ≥ 2); embeddings have k−1 columns.
    pub num_eigvectors: usize,
    /// Shared dimensionality after alignment (1 ≤ num_ordered ≤ k−1).
    pub num_ordered: usize,
    /// Expected vertex count; when `None` it is inferred from the first
    /// loaded subject and enforced across the cohort.
    pub nvertices: Option<usize>,
    /// Use the symmetric-normalised Laplacian instead of `D - W`.
    pub normalised_laplacian: bool,
    /// Hand the assembled structure to the persistence collaborator at the
    /// end of the run (keyed by hemisphere; the encoding is external).
    pub persist: bool,
}

/// Builder for cohort assembly runs.
#[derive(Debug, Clone)]
pub struct CohortBuilder {
    params: CohortParams,
}

impl Default for CohortBuilder {
    fn default() -> Self {
        debug!("Creating CohortBuilder with default parameters");
        Self {
            params: CohortParams {
                hemisphere: Hemisphere::Left,
                num_eigvectors: 6,
                num_ordered: 3,
                nvertices: None,
                normalised_laplacian: false,
                persist: false,
            },
        }
    }
}

impl CohortBuilder {
    pub fn new() -> Self {
        info!("Initializing new CohortBuilder");
        Self::default()
    }

    pub fn with_hemisphere(mut self, hemisphere: Hemisphere) -> Self {
        info!("Configuring hemisphere: {}", hemisphere);
        self.params.hemisphere = hemisphere;
        self
    }

    /// Number of eigenpairs k to retain per subject (k ≥ 2).
    pub fn with_eigenvectors(mut self, num_eigvectors: usize) -> Self {
        info!("Configuring num_eigvectors: {}", num_eigvectors);
        self.params.num_eigvectors = num_eigvectors;
        self
    }

    /// Shared aligned dimensionality (≤ k−1).
    pub fn with_ordered(mut self, num_ordered: usize) -> Self {
        info!("Configuring num_ordered: {}", num_ordered);
        self.params.num_ordered = num_ordered;
        self
    }

    /// Expected vertex count for every subject's surface.
    pub fn with_vertex_count(mut self, nvertices: usize) -> Self {
        info!("Configuring vertex count: {}", nvertices);
        self.params.nvertices = Some(nvertices);
        self
    }

    pub fn with_normalised_laplacian(mut self, normalised: bool) -> Self {
        info!("Configuring normalised Laplacian: {}", normalised);
        self.params.normalised_laplacian = normalised;
        self
    }

    pub fn with_persist(mut self, persist: bool) -> Self {
        info!("Configuring persistence handoff: {}", persist);
        self.params.persist = persist;
        self
    }

    fn validate(&self) -> Result<(), CorticomapError> {
        let p = &self.params;
        if p.num_eigvectors < 2 {
            return Err(CorticomapError::InvalidConfig {
                message: format!("num_eigvectors must be >= 2, got {}", p.num_eigvectors),
            });
        }
        if p.num_ordered == 0 || p.num_ordered > p.num_eigvectors - 1 {
            return Err(CorticomapError::InvalidConfig {
                message: format!(
                    "num_ordered must be in 1..={}, got {}",
                    p.num_eigvectors - 1,
                    p.num_ordered
                ),
            });
        }
        Ok(())
    }

    /// Assembles the cohort graph sequentially with the default EVD embedder.
    pub fn build<L: SubjectLoader>(
        &self,
        roster: &[String],
        loader: &L,
    ) -> Result<MultiLayerGraph, CorticomapError> {
        let embedder = EvdEmbedder::new(self.params.num_eigvectors.max(2));
        self.build_with_embedder(roster, loader, &embedder)
    }

    /// Assembles the cohort graph in two parallel phases with the default
    /// EVD embedder.
    pub fn build_parallel<L: SubjectLoader>(
        &self,
        roster: &[String],
        loader: &L,
    ) -> Result<MultiLayerGraph, CorticomapError> {
        let embedder = EvdEmbedder::new(self.params.num_eigvectors.max(2));
        self.build_parallel_with_embedder(roster, loader, &embedder)
    }

    /// Sequential assembly with an injected eigensolver.
    pub fn build_with_embedder<L: SubjectLoader, E: Embedder>(
        &self,
        roster: &[String],
        loader: &L,
        embedder: &E,
    ) -> Result<MultiLayerGraph, CorticomapError> {
        self.validate()?;
        CohortAssembler { params: self.params.clone(), loader, embedder }.assemble(roster)
    }

    /// Two-phase parallel assembly with an injected eigensolver.
    pub fn build_parallel_with_embedder<L: SubjectLoader, E: Embedder>(
        &self,
        roster: &[String],
        loader: &L,
        embedder: &E,
    ) -> Result<MultiLayerGraph, CorticomapError> {
        self.validate()?;
        CohortAssembler { params: self.params.clone(), loader, embedder }
            .assemble_parallel(roster)
    }
}

/// Per-subject diagonal state: computed once, read by every pair the subject
/// participates in. The embedding is kept as an explicit `Result` so pair
/// processing pattern-matches both outcomes before aligning.
struct SubjectBlock {
    affinity: DenseMatrix<f64>,
    fingerprints: DenseMatrix<f64>,
    embedding: Result<Embedding, CorticomapError>,
}

/// Drives the double iteration over subject pairs and owns the block store
/// for the duration of the run.
pub struct CohortAssembler<'a, L: SubjectLoader, E: Embedder> {
    params: CohortParams,
    loader: &'a L,
    embedder: &'a E,
}

impl<'a, L: SubjectLoader, E: Embedder> CohortAssembler<'a, L, E> {
    /// Loads and prepares one subject: fingerprint matrix, Laplacian,
    /// embedding attempt.
    ///
    /// Loader and shape errors propagate; an eigensolver convergence failure
    /// is stored inside the returned block instead.
    fn compute_subject(
        &self,
        subject: &str,
        expected_vertices: Option<usize>,
    ) -> Result<SubjectBlock, CorticomapError> {
        info!("Preparing subject '{}' ({})", subject, self.params.hemisphere);
        let data = self.loader.load(subject, self.params.hemisphere)?;

        let (rows, cols) = data.affinity.shape();
        if rows != cols {
            return Err(CorticomapError::shape(
                "subject affinity",
                "square matrix",
                format!("{}x{} for subject '{}'", rows, cols, subject),
            ));
        }
        if let Some(v) = expected_vertices {
            if rows != v {
                return Err(CorticomapError::shape(
                    "subject affinity",
                    format!("{} vertices", v),
                    format!("{} for subject '{}'", rows, subject),
                ));
            }
        }
        let (ts_rows, ts_cols) = data.timeseries.shape();
        if ts_rows != rows {
            return Err(CorticomapError::shape(
                "subject timeseries",
                format!("{} vertex rows", rows),
                format!("{}x{} for subject '{}'", ts_rows, ts_cols, subject),
            ));
        }

        let fingerprints = fingerprint_matrix(&data.timeseries);
        let lap = build_laplacian(&data.affinity, self.params.normalised_laplacian)?;

        let embedding = match self.embedder.embed(subject, &lap) {
            Ok(e) => Ok(e),
            Err(e) if e.is_recoverable() => {
                warn!(
                    "Embedding unavailable for subject '{}', its pairs will be skipped: {}",
                    subject, e
                );
                Err(e)
            }
            Err(e) => return Err(e),
        };

        Ok(SubjectBlock { affinity: data.affinity, fingerprints, embedding })
    }

    /// Runs align → match → weigh for one pair of prepared subjects.
    fn cross_block(
        &self,
        a: &SubjectBlock,
        b: &SubjectBlock,
        ea: &Embedding,
        eb: &Embedding,
    ) -> Result<CsMat<f64>, CorticomapError> {
        let aligned = align_embeddings(ea, eb, self.params.num_ordered)?;
        let correspondence = match_correspondences(&aligned)?;
        weigh_correspondences(&a.fingerprints, &b.fingerprints, &correspondence)
    }

    /// Sequential reference driver: fixed nested pair order, one pair fully
    /// processed before the next begins.
    pub fn assemble(&self, roster: &[String]) -> Result<MultiLayerGraph, CorticomapError> {
        let n = roster.len();
        info!(
            "Assembling cohort graph: {} subjects, hemisphere {}, k={}, num_ordered={}",
            n, self.params.hemisphere, self.params.num_eigvectors, self.params.num_ordered
        );

        let mut graph = MultiLayerGraph::new(n);
        let mut cache: HashMap<usize, SubjectBlock> = HashMap::new();
        let mut expected = self.params.nvertices;

        for i in 0..n {
            self.ensure_subject(roster, i, &mut cache, &mut expected, &mut graph)?;
            for j in (i + 1)..n {
                self.ensure_subject(roster, j, &mut cache, &mut expected, &mut graph)?;

                let (block_i, block_j) = (&cache[&i], &cache[&j]);
                match (&block_i.embedding, &block_j.embedding) {
                    (Ok(ei), Ok(ej)) => {
                        trace!("Processing pair ({}, {})", roster[i], roster[j]);
                        let cross = self.cross_block(block_i, block_j, ei, ej)?;
                        debug!(
                            "Pair ({}, {}): {} weighted edges",
                            roster[i],
                            roster[j],
                            cross.nnz()
                        );
                        graph.set_cross(i, j, cross);
                    }
                    (Err(e), _) | (_, Err(e)) => {
                        warn!(
                            "Skipping pair ({}, {}): {}",
                            roster[i], roster[j], e
                        );
                    }
                }
            }
        }

        self.finish(graph)
    }

    /// Memoized diagonal-state computation; populates the diagonal block the
    /// first time a subject with a converged embedding is encountered.
    fn ensure_subject(
        &self,
        roster: &[String],
        idx: usize,
        cache: &mut HashMap<usize, SubjectBlock>,
        expected: &mut Option<usize>,
        graph: &mut MultiLayerGraph,
    ) -> Result<(), CorticomapError> {
        if cache.contains_key(&idx) {
            return Ok(());
        }
        let block = self.compute_subject(&roster[idx], *expected)?;
        if expected.is_none() {
            *expected = Some(block.affinity.shape().0);
        }
        if block.embedding.is_ok() {
            graph.set_diagonal(idx, block.affinity.clone());
        }
        cache.insert(idx, block);
        Ok(())
    }

    /// Two-phase parallel driver.
    ///
    /// Phase 1 prepares every subject's diagonal state in parallel (each
    /// entry written exactly once into a concurrent cache); phase 2 computes
    /// every unordered pair's cross block in parallel from the now-read-only
    /// cache. Results are folded into the graph afterwards, so block writes
    /// stay single-threaded and write-once.
    pub fn assemble_parallel(
        &self,
        roster: &[String],
    ) -> Result<MultiLayerGraph, CorticomapError> {
        let n = roster.len();
        info!(
            "Assembling cohort graph in parallel: {} subjects, hemisphere {}",
            n, self.params.hemisphere
        );

        // Phase 1: per-subject diagonal state, trivially parallel.
        let cache: DashMap<usize, SubjectBlock> = DashMap::new();
        (0..n)
            .into_par_iter()
            .map(|i| {
                let block = self.compute_subject(&roster[i], self.params.nvertices)?;
                cache.insert(i, block);
                Ok(())
            })
            .collect::<Result<(), CorticomapError>>()?;

        let blocks: Vec<SubjectBlock> = (0..n)
            .map(|i| cache.remove(&i).map(|(_, b)| b).expect("phase 1 filled every slot"))
            .collect();

        // Cohort-wide vertex count check; sequential discovery is not
        // available when subjects load concurrently.
        if let Some(first) = blocks.first() {
            let v = self.params.nvertices.unwrap_or_else(|| first.affinity.shape().0);
            for (i, b) in blocks.iter().enumerate() {
                if b.affinity.shape().0 != v {
                    return Err(CorticomapError::shape(
                        "subject affinity",
                        format!("{} vertices", v),
                        format!("{} for subject '{}'", b.affinity.shape().0, roster[i]),
                    ));
                }
            }
        }

        // Phase 2: per-pair cross blocks, each task reading two cached
        // entries and producing exactly one (i, j) result.
        let pairs: Vec<(usize, usize)> =
            (0..n).flat_map(|i| ((i + 1)..n).map(move |j| (i, j))).collect();
        debug!("Phase 2: {} subject pairs", pairs.len());

        let cross_results: Vec<Option<((usize, usize), CsMat<f64>)>> = pairs
            .par_iter()
            .map(|&(i, j)| {
                let (block_i, block_j) = (&blocks[i], &blocks[j]);
                match (&block_i.embedding, &block_j.embedding) {
                    (Ok(ei), Ok(ej)) => {
                        let cross = self.cross_block(block_i, block_j, ei, ej)?;
                        Ok(Some(((i, j), cross)))
                    }
                    (Err(e), _) | (_, Err(e)) => {
                        warn!("Skipping pair ({}, {}): {}", roster[i], roster[j], e);
                        Ok(None)
                    }
                }
            })
            .collect::<Result<Vec<_>, CorticomapError>>()?;

        // Fold: deterministic order, write-once discipline preserved.
        let mut graph = MultiLayerGraph::new(n);
        for (i, block) in blocks.iter().enumerate() {
            if block.embedding.is_ok() {
                graph.set_diagonal(i, block.affinity.clone());
            }
        }
        for ((i, j), cross) in cross_results.into_iter().flatten() {
            graph.set_cross(i, j, cross);
        }

        self.finish(graph)
    }

    /// Common run epilogue: summary logging and the persistence handoff note.
    fn finish(&self, graph: MultiLayerGraph) -> Result<MultiLayerGraph, CorticomapError> {
        let stats = graph.stats();
        info!(
            "Assembly complete: {}/{} diagonal blocks, {} cross pairs, {} weighted edges",
            stats.diagonal_set, stats.nsubjects, stats.cross_pairs, stats.cross_nnz
        );
        if self.params.persist {
            info!(
                "Handing structure to persistence collaborator under key '{}'",
                self.params.hemisphere
            );
        }
        Ok(graph)
    }
}
