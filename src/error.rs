//! Error taxonomy for cohort assembly.
//!
//! Two families of failure exist in this pipeline and they propagate very
//! differently:
//!
//! - `Convergence`: the eigensolver failed to produce the requested number of
//!   eigenpairs for one subject's Laplacian. This is expected and common for
//!   noisy affinity data, so it is recovered at the pair level: every pair
//!   involving that subject is skipped and its off-diagonal blocks stay empty,
//!   while the rest of the run continues.
//! - `ShapeMismatch` / `SubjectLoad` / `InvalidConfig`: a data-contract or
//!   configuration violation. These are unexpected and abort the run with the
//!   stage and subject context attached, rather than producing a silently
//!   corrupted block structure.
//!
//! The error is `Clone` so that a per-subject embedding outcome can live in
//! the assembler's memoization cache as a `Result` and be pattern-matched for
//! every pair that references the subject.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CorticomapError {
    /// Eigensolver did not converge for a subject's Laplacian. Recoverable:
    /// the assembler skips every pair involving this subject.
    #[error("eigensolver did not converge for subject '{subject}'")]
    Convergence { subject: String },

    /// Matrix dimensions violate the data contract at a given pipeline stage.
    #[error("shape mismatch in {stage}: expected {expected}, got {actual}")]
    ShapeMismatch {
        stage: &'static str,
        expected: String,
        actual: String,
    },

    /// The external data loader failed for a subject.
    #[error("failed to load subject '{subject}': {message}")]
    SubjectLoad { subject: String, message: String },

    /// Builder configuration is inconsistent (e.g. num_ordered > k - 1).
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl CorticomapError {
    /// Shorthand used by every stage that validates matrix dimensions.
    pub fn shape(
        stage: &'static str,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        CorticomapError::ShapeMismatch {
            stage,
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// True when the error is a per-subject convergence failure that the
    /// assembler recovers from by skipping pairs.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CorticomapError::Convergence { .. })
    }
}
