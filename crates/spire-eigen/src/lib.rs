//! Spire Eigen
//!
//! Distributed power iteration for the dominant eigenvalue (and
//! eigenvector) of a large dense symmetric matrix.
//!
//! # Domain Decomposition
//!
//! The global n-by-n matrix is never materialized on one worker. Each of
//! the p workers owns a contiguous block of `l_n = n / p` columns, stored
//! column-major ([`ColumnBlock`]); p must evenly divide n
//! ([`BlockLayout`]). A global vector exists in two representations
//! ([`DistVector`]): a local shard of length `l_n` and a full replicated
//! copy of length n that is identical on every worker after each
//! matrix-vector product.
//!
//! # Building Blocks
//!
//! - [`dot`]: global inner product of two identically sharded vectors,
//!   one sum-reduction.
//! - [`matvec`]: each worker multiplies its column block by its shard,
//!   then one element-wise sum-reduction replicates the full product.
//! - [`power_iterate`]: normalize, multiply, re-estimate the eigenvalue,
//!   until the relative change in the estimate drops below tolerance.
//! - [`residual_norms`]: reporting-only quality measure, the norm of
//!   `A·x − λ·x`.
//!
//! All cross-worker coordination goes through the blocking collectives of
//! [`spire_collective`]; correctness of the replicated copies is a protocol
//! invariant, not a shared-memory one.

mod dot;
mod error;
mod layout;
mod matrix;
mod matvec;
mod power;
mod residual;
mod vector;

pub use dot::{dot, local_dot};
pub use error::{Error, Result};
pub use layout::BlockLayout;
pub use matrix::{diagonal_entry, hilbert_entry, ColumnBlock};
pub use matvec::matvec;
pub use power::{power_iterate, PowerConfig, PowerSolution, Termination};
pub use residual::{residual_norms, ResidualNorms};
pub use vector::DistVector;
