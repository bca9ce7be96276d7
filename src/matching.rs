//! Bidirectional nearest-neighbor vertex correspondence between two aligned
//! embeddings.
//!
//! Both directions are computed independently: for every row of `xs` the
//! nearest row of `ys` under Euclidean distance, and vice versa. The two maps
//! are not required to be mutual inverses or a bijection; downstream
//! consumers must not assume mutuality. Distance ties resolve to the lowest
//! candidate index, so the result is deterministic.

use rayon::prelude::*;
use smartcore::linalg::basic::arrays::Array;

use log::{debug, info};

use crate::alignment::AlignedPair;
use crate::error::CorticomapError;
use crate::operators::{matrix_rows, squared_distance};

/// Independent forward (A→B) and backward (B→A) vertex maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correspondence {
    /// `forward[k]` = index of the nearest B vertex to A vertex `k`.
    pub forward: Vec<usize>,
    /// `backward[m]` = index of the nearest A vertex to B vertex `m`.
    pub backward: Vec<usize>,
}

impl Correspondence {
    /// Number of vertices covered by each map.
    pub fn nvertices(&self) -> usize {
        self.forward.len()
    }

    /// Count of vertices whose forward and backward assignments agree
    /// (`backward[forward[k]] == k`). Diagnostic only; mutuality is not
    /// enforced anywhere in the pipeline.
    pub fn mutual_count(&self) -> usize {
        self.forward
            .iter()
            .enumerate()
            .filter(|&(k, &m)| self.backward[m] == k)
            .count()
    }
}

/// Index of the nearest row of `candidates` to `query`; lowest index wins
/// distance ties via the strict `<` comparison.
fn nearest_row(query: &[f64], candidates: &[Vec<f64>]) -> usize {
    let mut best = 0usize;
    let mut best_dist = f64::INFINITY;
    for (j, cand) in candidates.iter().enumerate() {
        let d = squared_distance(query, cand);
        if d < best_dist {
            best_dist = d;
            best = j;
        }
    }
    best
}

/// Computes the bidirectional correspondence for an aligned pair.
///
/// Both query directions are parallelized across rows; each row's search is
/// independent, so the output is identical to the sequential scan.
///
/// # Errors
///
/// [`CorticomapError::ShapeMismatch`] when the two aligned embeddings
/// disagree in shape (cannot happen for pairs produced by
/// [`crate::alignment::align_embeddings`], but the matcher revalidates its
/// own contract).
pub fn match_correspondences(pair: &AlignedPair) -> Result<Correspondence, CorticomapError> {
    let (nx, dx) = pair.xs.shape();
    let (ny, dy) = pair.ys.shape();
    if nx != ny || dx != dy {
        return Err(CorticomapError::shape(
            "matching",
            format!("{}x{} in both aligned embeddings", nx, dx),
            format!("{}x{} vs {}x{}", nx, dx, ny, dy),
        ));
    }

    info!("Matching correspondences: {} vertices, {} axes", nx, dx);

    let x_rows = matrix_rows(&pair.xs);
    let y_rows = matrix_rows(&pair.ys);

    let forward: Vec<usize> = x_rows
        .par_iter()
        .map(|row| nearest_row(row, &y_rows))
        .collect();
    let backward: Vec<usize> = y_rows
        .par_iter()
        .map(|row| nearest_row(row, &x_rows))
        .collect();

    let corr = Correspondence { forward, backward };
    debug!(
        "Correspondence computed: {}/{} mutual assignments",
        corr.mutual_count(),
        nx
    );
    Ok(corr)
}
