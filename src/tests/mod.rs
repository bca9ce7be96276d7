mod test_embedding;
mod test_graph;
mod test_operators;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::loader::SubjectData;
use crate::operators::fisher_z;

/// Chain-structured affinity over `v` vertices: neighbours are strongly
/// connected, strength decays with index distance. Symmetric, Fisher-scale
/// values, distinct spectral coordinates per vertex.
pub fn chain_affinity(v: usize) -> DenseMatrix<f64> {
    let mut rows = vec![vec![0.0; v]; v];
    for i in 0..v {
        for j in 0..v {
            if i != j {
                let gap = (i as f64 - j as f64).abs();
                rows[i][j] = fisher_z(0.9 * (-0.8 * (gap - 1.0)).exp().min(1.0));
            }
        }
    }
    DenseMatrix::from_2d_vec(&rows).unwrap()
}

/// Smooth synthetic timeseries: each vertex mixes two oscillations with a
/// vertex-dependent phase plus seeded noise, so fingerprint rows are
/// distinct and non-constant.
pub fn synthetic_timeseries(v: usize, samples: usize, seed: u64) -> DenseMatrix<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(v);
    for i in 0..v {
        let phase = i as f64 * 0.35;
        let mut row = Vec::with_capacity(samples);
        for t in 0..samples {
            let t = t as f64 * 0.2;
            let noise: f64 = rng.random_range(-0.05..0.05);
            row.push((t + phase).sin() + 0.5 * (2.3 * t - phase).cos() + noise);
        }
        rows.push(row);
    }
    DenseMatrix::from_2d_vec(&rows).unwrap()
}

/// Complete synthetic subject: chain affinity plus smooth timeseries.
pub fn synthetic_subject(v: usize, samples: usize, seed: u64) -> SubjectData {
    SubjectData {
        affinity: chain_affinity(v),
        timeseries: synthetic_timeseries(v, samples, seed),
    }
}
