//! The two representations of a distributed vector.

use crate::layout::BlockLayout;

/// A logically global length-n vector as one worker sees it: the local
/// shard of the columns it owns plus a full replicated copy.
///
/// After a matrix-vector product the `full` copy is bit-for-bit identical
/// on every worker; that invariant is maintained purely by refreshing it
/// through collective reductions, never by mutating it in place elsewhere.
#[derive(Debug, Clone)]
pub struct DistVector {
    /// This worker's slice, length `l_n`.
    pub local: Vec<f64>,
    /// The replicated full vector, length n.
    pub full: Vec<f64>,
}

impl DistVector {
    /// A constant vector in both representations.
    pub fn uniform(layout: &BlockLayout, value: f64) -> Self {
        Self {
            local: vec![value; layout.block_len()],
            full: vec![value; layout.n()],
        }
    }

    /// The default starting guess for the power iteration,
    /// `(1/√n, ..., 1/√n)`, which has unit Euclidean norm.
    pub fn default_guess(layout: &BlockLayout) -> Self {
        Self::uniform(layout, 1.0 / (layout.n() as f64).sqrt())
    }
}
