//! # corticomap
//!
//! Population-scale multi-layer cortical graphs via pairwise spectral
//! matching.
//!
//! For a cohort of subjects, corticomap assembles an N×N block structure in
//! which diagonal blocks are per-subject cortical affinity matrices and
//! off-diagonal blocks are sparse vertex correspondences between pairs of
//! subjects, weighted by the similarity of their functional connectivity
//! fingerprints. The assembled [`graph::MultiLayerGraph`] is the input of a
//! downstream joint multi-subject spectral decomposition (out of scope here).
//!
//! # Pipeline stages
//!
//! 1. **Laplacian** ([`laplacian`]): a subject's affinity matrix becomes a
//!    graph Laplacian, combinatorial or symmetric-normalised.
//! 2. **Embedding** ([`embedding`]): the smallest-magnitude eigenpairs of
//!    the Laplacian, sorted by ascending eigenvalue with the trivial mode
//!    removed, give each vertex a low-dimensional spectral coordinate.
//! 3. **Alignment** ([`alignment`]): two subjects' embeddings are brought
//!    into a shared coordinate convention with a deterministic
//!    correlation-based axis assignment and sign correction.
//! 4. **Matching** ([`matching`]): bidirectional Euclidean nearest-neighbor
//!    search yields independent forward and backward vertex maps.
//! 5. **Weighting** ([`weighting`]): matched fingerprint rows are
//!    correlated; positive correlations become Fisher-z edge weights in a
//!    sparse cross-edge matrix.
//! 6. **Assembly** ([`assembler`]): the above runs over all subject pairs
//!    with memoized per-subject state, sequentially or in two parallel
//!    phases, into the write-once block store.
//!
//! # Failure model
//!
//! Eigensolver non-convergence is expected and recovered per pair: the
//! affected subject's pairs are skipped and their blocks stay empty. Shape
//! and loader errors indicate data-contract violations and abort the run
//! with stage context. See [`error::CorticomapError`].
//!
//! # Usage
//!
//! ```ignore
//! use corticomap::assembler::CohortBuilder;
//! use corticomap::loader::{Hemisphere, MemoryLoader};
//!
//! let roster = vec!["sub-01".to_string(), "sub-02".to_string()];
//! let graph = CohortBuilder::new()
//!     .with_hemisphere(Hemisphere::Left)
//!     .with_eigenvectors(6)
//!     .with_ordered(3)
//!     .build(&roster, &loader)?;
//! println!("{}", graph);
//! ```

pub mod alignment;
pub mod assembler;
pub mod embedding;
pub mod error;
pub mod graph;
pub mod laplacian;
pub mod loader;
pub mod matching;
pub mod operators;
pub mod weighting;

#[cfg(test)]
mod tests;
