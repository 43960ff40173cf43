//! Error types for spire-collective.

use thiserror::Error;

use crate::comm::Rank;

/// Result type for spire-collective operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running a worker cohort.
#[derive(Debug, Error)]
pub enum Error {
    /// The cohort was aborted by one of its workers. Returned from a
    /// collective call instead of blocking on a rendezvous that can never
    /// complete.
    #[error("cohort aborted by worker {rank}: {reason}")]
    Aborted { rank: Rank, reason: String },

    /// A worker returned an error (or panicked) and took the cohort down
    /// with it.
    #[error("worker {rank} failed: {reason}")]
    WorkerFailed { rank: Rank, reason: String },

    /// A cohort must contain at least one worker.
    #[error("cohort must contain at least one worker")]
    EmptyCohort,

    /// A worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}
