use approx::assert_abs_diff_eq;

use crate::embedding::{Embedder, EvdEmbedder};
use crate::error::CorticomapError;
use crate::laplacian::build_laplacian;
use crate::tests::chain_affinity;

#[test]
fn test_embedding_dimensions() {
    let lap = build_laplacian(&chain_affinity(10), false).unwrap();
    let embedder = EvdEmbedder::new(5);
    let emb = embedder.embed("sub-01", &lap).unwrap();

    // Exactly num_eigvectors - 1 columns after trivial-mode removal
    assert_eq!(emb.nvertices(), 10);
    assert_eq!(emb.dim(), 4);
    assert_eq!(emb.eigenvalues.len(), 5);
}

#[test]
fn test_eigenvalues_non_decreasing() {
    let lap = build_laplacian(&chain_affinity(12), false).unwrap();
    let emb = EvdEmbedder::new(6).embed("sub-01", &lap).unwrap();
    for w in emb.eigenvalues.windows(2) {
        assert!(
            w[0] <= w[1] + 1e-12,
            "eigenvalues must be non-decreasing: {} > {}",
            w[0],
            w[1]
        );
    }
}

#[test]
fn test_trivial_mode_removed() {
    // The combinatorial Laplacian of a connected graph has smallest
    // eigenvalue ~0 with a constant eigenvector; after removal no retained
    // column may be constant.
    let lap = build_laplacian(&chain_affinity(10), false).unwrap();
    let emb = EvdEmbedder::new(4).embed("sub-01", &lap).unwrap();

    assert_abs_diff_eq!(emb.eigenvalues[0], 0.0, epsilon = 1e-8);
    for col in 0..emb.dim() {
        let values: Vec<f64> = (0..10).map(|i| emb.vertex(i)[col]).collect();
        let spread = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
            - values.iter().cloned().fold(f64::INFINITY, f64::min);
        assert!(spread > 1e-8, "column {} looks like the trivial mode", col);
    }
}

#[test]
fn test_embedding_rows_track_vertices() {
    let lap = build_laplacian(&chain_affinity(8), false).unwrap();
    let emb = EvdEmbedder::new(4).embed("sub-01", &lap).unwrap();
    // A chain has distinct spectral coordinates per vertex
    for i in 0..8 {
        for j in (i + 1)..8 {
            let d = crate::operators::squared_distance(&emb.vertex(i), &emb.vertex(j));
            assert!(d > 1e-12, "vertices {} and {} collapsed in the embedding", i, j);
        }
    }
}

#[test]
fn test_requesting_more_eigenpairs_than_vertices_is_shape_error() {
    let lap = build_laplacian(&chain_affinity(4), false).unwrap();
    let err = EvdEmbedder::new(6).embed("sub-01", &lap).unwrap_err();
    assert!(matches!(err, CorticomapError::ShapeMismatch { stage: "embedding", .. }));
}

#[test]
fn test_embedding_is_deterministic() {
    let lap = build_laplacian(&chain_affinity(9), false).unwrap();
    let a = EvdEmbedder::new(5).embed("sub-01", &lap).unwrap();
    let b = EvdEmbedder::new(5).embed("sub-01", &lap).unwrap();
    assert_eq!(a.eigenvalues, b.eigenvalues);
    for i in 0..9 {
        assert_eq!(a.vertex(i), b.vertex(i));
    }
}
