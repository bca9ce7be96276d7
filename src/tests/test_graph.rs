use sprs::{CsMat, TriMat};

use crate::graph::MultiLayerGraph;
use crate::tests::chain_affinity;

fn toy_cross(v: usize, entries: &[(usize, usize, f64)]) -> CsMat<f64> {
    let mut tri = TriMat::new((v, v));
    for &(i, j, w) in entries {
        tri.add_triplet(i, j, w);
    }
    tri.to_csr()
}

#[test]
fn test_diagonal_and_cross_storage() {
    let mut g = MultiLayerGraph::new(3);
    assert_eq!(g.nsubjects(), 3);
    assert_eq!(g.nvertices(), 0);

    g.set_diagonal(0, chain_affinity(4));
    assert_eq!(g.nvertices(), 4);
    g.set_diagonal(2, chain_affinity(4));

    assert!(g.diagonal_block(0).is_some());
    assert!(g.diagonal_block(1).is_none());
    assert_eq!(g.diagonal_count(), 2);

    let block = toy_cross(4, &[(0, 1, 0.5), (2, 3, 1.2)]);
    g.set_cross(0, 2, block);
    assert_eq!(g.cross_pair_count(), 1);
    assert!(g.cross_block(0, 2).is_some());
    assert!(g.cross_block(2, 0).is_some());
    assert!(g.cross_block(0, 1).is_none());
}

#[test]
fn test_cross_transpose_invariant() {
    let mut g = MultiLayerGraph::new(2);
    g.set_diagonal(0, chain_affinity(5));
    g.set_diagonal(1, chain_affinity(5));

    let block = toy_cross(5, &[(0, 3, 0.7), (1, 1, 0.2), (4, 0, 1.5)]);
    g.set_cross(0, 1, block);

    let forward = g.cross_block(0, 1).unwrap();
    let reverse = g.cross_block(1, 0).unwrap();
    assert_eq!(forward.nnz(), reverse.nnz());
    for (&w, (i, j)) in forward.iter() {
        assert_eq!(reverse.get(j, i), Some(&w), "transpose mismatch at ({},{})", i, j);
    }
}

#[test]
#[should_panic(expected = "diagonal block (1,1) written twice")]
fn test_diagonal_write_once() {
    let mut g = MultiLayerGraph::new(2);
    g.set_diagonal(1, chain_affinity(4));
    g.set_diagonal(1, chain_affinity(4));
}

#[test]
#[should_panic(expected = "cross block (0,1) written twice")]
fn test_cross_write_once() {
    let mut g = MultiLayerGraph::new(2);
    g.set_diagonal(0, chain_affinity(4));
    g.set_cross(0, 1, toy_cross(4, &[(0, 0, 1.0)]));
    g.set_cross(0, 1, toy_cross(4, &[(1, 1, 1.0)]));
}

#[test]
#[should_panic(expected = "cross block requires two distinct subjects")]
fn test_cross_rejects_diagonal_slot() {
    let mut g = MultiLayerGraph::new(2);
    g.set_diagonal(0, chain_affinity(4));
    g.set_cross(1, 1, toy_cross(4, &[(0, 0, 1.0)]));
}

#[test]
fn test_subgraph_extraction() {
    let mut g = MultiLayerGraph::new(3);
    for i in 0..3 {
        g.set_diagonal(i, chain_affinity(4));
    }
    g.set_cross(0, 1, toy_cross(4, &[(0, 0, 1.0)]));
    g.set_cross(0, 2, toy_cross(4, &[(1, 2, 2.0)]));
    g.set_cross(1, 2, toy_cross(4, &[(3, 3, 3.0)]));

    // Keep subjects 2 and 0, in that order
    let sub = g.subgraph(&[2, 0]);
    assert_eq!(sub.nsubjects(), 2);
    assert_eq!(sub.nvertices(), 4);
    assert_eq!(sub.diagonal_count(), 2);
    assert_eq!(sub.cross_pair_count(), 1);

    // Block (0,1) of the subgraph is block (2,0) of the original
    let expected = g.cross_block(2, 0).unwrap();
    let got = sub.cross_block(0, 1).unwrap();
    assert_eq!(got.nnz(), expected.nnz());
    for (&w, (i, j)) in expected.iter() {
        assert_eq!(got.get(i, j), Some(&w));
    }
}

#[test]
fn test_stats_and_display() {
    let mut g = MultiLayerGraph::new(2);
    g.set_diagonal(0, chain_affinity(4));
    g.set_diagonal(1, chain_affinity(4));
    g.set_cross(0, 1, toy_cross(4, &[(0, 0, 1.0), (1, 2, 0.5)]));

    let stats = g.stats();
    assert_eq!(stats.nsubjects, 2);
    assert_eq!(stats.nvertices, 4);
    assert_eq!(stats.diagonal_set, 2);
    assert_eq!(stats.cross_pairs, 1);
    assert_eq!(stats.cross_nnz, 2);

    let rendered = format!("{}", g);
    assert!(rendered.contains("2 subjects x 4 vertices"));
}
