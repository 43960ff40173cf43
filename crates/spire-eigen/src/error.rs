//! Error types for spire-eigen.

use thiserror::Error;

/// Result type for spire-eigen operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while partitioning or solving.
#[derive(Debug, Error)]
pub enum Error {
    /// A collective operation failed, typically because a peer aborted the
    /// cohort.
    #[error("collective operation failed: {0}")]
    Collective(#[from] spire_collective::Error),

    /// The worker count does not evenly divide the problem size.
    #[error("worker count must divide problem size: n = {n}, p = {workers}, n mod p = {remainder}")]
    UnevenPartition { n: usize, workers: usize, remainder: usize },

    /// The problem size is zero.
    #[error("problem size must be positive")]
    EmptyProblem,

    /// The cohort has no workers.
    #[error("worker count must be positive")]
    NoWorkers,

    /// The power iterate has zero norm and cannot be normalized. Happens
    /// when the matrix maps the current vector to zero, e.g. for the zero
    /// matrix or a starting vector inside the null space.
    #[error("zero-norm iterate at iteration {iteration}: cannot normalize the running vector")]
    ZeroNorm { iteration: usize },
}
