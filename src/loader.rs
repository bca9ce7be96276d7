//! External data-loading collaborator seam.
//!
//! The core treats subject acquisition as an opaque function: given a subject
//! identifier and a hemisphere selector, the loader returns the subject's
//! Fisher-transformed affinity matrix and raw timeseries matrix. Whether that
//! is backed by precomputation from raw scans or by stored correlation
//! matrices is the collaborator's concern.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::error::CorticomapError;

/// Cortical hemisphere selector. Serialized as "L"/"R", matching the
/// keying convention of the persistence collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hemisphere {
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "R")]
    Right,
}

impl Hemisphere {
    /// Single-letter code used in output keys and log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Hemisphere::Left => "L",
            Hemisphere::Right => "R",
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Raw per-subject data as delivered by the loader.
///
/// `affinity` is V×V, symmetric, Fisher-transformed; `timeseries` is V×T
/// (rows = vertices, columns = samples). Both are immutable once loaded.
#[derive(Debug, Clone)]
pub struct SubjectData {
    pub affinity: DenseMatrix<f64>,
    pub timeseries: DenseMatrix<f64>,
}

/// Loader contract consumed by the assembler.
pub trait SubjectLoader: Send + Sync {
    /// Loads one subject's data for the given hemisphere.
    ///
    /// # Errors
    ///
    /// [`CorticomapError::SubjectLoad`] when the subject cannot be
    /// retrieved; treated as fatal by the assembler (a roster/data contract
    /// violation, not a numerical edge case).
    fn load(&self, subject: &str, hemisphere: Hemisphere)
        -> Result<SubjectData, CorticomapError>;
}

/// In-memory loader for tests, benches and demos: subjects registered per
/// hemisphere under their roster identifier.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    subjects: HashMap<(String, Hemisphere), SubjectData>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subject's data for one hemisphere.
    pub fn insert(&mut self, subject: impl Into<String>, hemisphere: Hemisphere, data: SubjectData) {
        self.subjects.insert((subject.into(), hemisphere), data);
    }
}

impl SubjectLoader for MemoryLoader {
    fn load(
        &self,
        subject: &str,
        hemisphere: Hemisphere,
    ) -> Result<SubjectData, CorticomapError> {
        self.subjects
            .get(&(subject.to_string(), hemisphere))
            .cloned()
            .ok_or_else(|| CorticomapError::SubjectLoad {
                subject: subject.to_string(),
                message: format!("no data registered for hemisphere {}", hemisphere),
            })
    }
}
