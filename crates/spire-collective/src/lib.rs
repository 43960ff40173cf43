//! Spire Collective
//!
//! Blocking collective operations for a fixed-size cohort of symmetric
//! worker threads: sum-reduction (scalar and vector), gather-to-one, and
//! barrier.
//!
//! # Protocol Guarantees
//!
//! Workers exchange data only through collective calls. Every collective is
//! a rendezvous: a worker calling it blocks until all peers have made the
//! matching call, so no worker can drift ahead of the cohort. Contributions
//! are combined in rank order, which makes the result deterministic for a
//! fixed cohort size, and every worker receives its own copy of the same
//! result. There is no shared mutable numerical state; consistency of
//! replicated data is a protocol guarantee, not a locking guarantee.
//!
//! # Cohort Aborts
//!
//! There is no cancellation or timeout on individual collectives. Instead, a
//! worker that fails (returns an error or panics) marks the whole cohort
//! aborted; peers blocked in or entering a collective receive
//! [`Error::Aborted`] rather than hanging on a rendezvous that can never
//! complete.

mod cohort;
mod comm;
mod error;

pub use cohort::run_cohort;
pub use comm::{Communicator, Rank};
pub use error::{Error, Result};
