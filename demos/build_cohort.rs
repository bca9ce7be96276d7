use rand::prelude::*;
use smartcore::linalg::basic::matrix::DenseMatrix;

use corticomap::assembler::CohortBuilder;
use corticomap::loader::{Hemisphere, MemoryLoader, SubjectData};
use corticomap::operators::fisher_z;

/// Symmetric banded affinity with per-subject jitter, Fisher-scaled the way
/// connectivity matrices arrive from preprocessing.
fn synthetic_affinity(v: usize, seed: u64) -> DenseMatrix<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = vec![vec![0.0; v]; v];
    for i in 0..v {
        for j in (i + 1)..v {
            let gap = (j - i) as f64;
            let jitter: f64 = rng.random_range(-0.02..0.02);
            let r = (0.85 * (-0.6 * (gap - 1.0)).exp() + jitter).clamp(0.01, 0.95);
            let w = fisher_z(r);
            rows[i][j] = w;
            rows[j][i] = w;
        }
    }
    DenseMatrix::from_2d_vec(&rows).unwrap()
}

/// Vertex timeseries: shared oscillatory structure plus subject-specific noise,
/// so fingerprints correlate strongly within a subject and plausibly across.
fn synthetic_timeseries(v: usize, samples: usize, seed: u64) -> DenseMatrix<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(v);
    for i in 0..v {
        let phase = i as f64 * 0.3;
        let mut row = Vec::with_capacity(samples);
        for t in 0..samples {
            let t = t as f64 * 0.25;
            let noise: f64 = rng.random_range(-0.05..0.05);
            row.push((t + phase).sin() + 0.4 * (1.7 * t - phase).cos() + noise);
        }
        rows.push(row);
    }
    DenseMatrix::from_2d_vec(&rows).unwrap()
}

fn main() {
    env_logger::init();

    // =====================
    // 1. Synthetic cohort (6 subjects, 40 vertices, left hemisphere)
    // =====================
    let nvertices = 40;
    let roster: Vec<String> = (0..6).map(|i| format!("sub-{:02}", i)).collect();

    let mut loader = MemoryLoader::new();
    for (i, name) in roster.iter().enumerate() {
        let seed = i as u64;
        loader.insert(
            name.clone(),
            Hemisphere::Left,
            SubjectData {
                affinity: synthetic_affinity(nvertices, seed),
                timeseries: synthetic_timeseries(nvertices, 120, seed + 100),
            },
        );
    }

    // =====================
    // 2. Assemble the multi-layer graph
    // =====================
    let builder = CohortBuilder::new()
        .with_hemisphere(Hemisphere::Left)
        .with_eigenvectors(6)
        .with_ordered(4)
        .with_vertex_count(nvertices);

    let graph = builder
        .build_parallel(&roster, &loader)
        .expect("cohort assembly failed");

    println!("{}", graph);

    // =====================
    // 3. Inspect blocks and stats
    // =====================
    let stats = graph.stats();
    println!(
        "diagonal blocks: {}/{}, cross pairs: {}, cross edges: {}",
        stats.diagonal_set, stats.nsubjects, stats.cross_pairs, stats.cross_nnz
    );

    if let Some(block) = graph.cross_block(0, 1) {
        let max_w = block.iter().map(|(w, _)| *w).fold(f64::MIN, f64::max);
        println!(
            "block (0,1): {} correspondence edges, max weight {:.4}",
            block.nnz(),
            max_w
        );
    }

    // A two-subject subgraph keeps its diagonal and cross blocks.
    let pair = graph.subgraph(&[0, 1]);
    println!(
        "subgraph over {{0,1}}: {} diagonals, {} cross pairs",
        pair.diagonal_count(),
        pair.cross_pair_count()
    );
}
