//! Distributed matrix-vector product.

use spire_collective::Communicator;

use crate::error::Result;
use crate::matrix::ColumnBlock;
use crate::vector::DistVector;

/// `y = A · x` for the distributed matrix and a distributed vector.
///
/// Each worker first forms its partial length-n product, its column block
/// scaled by its shard; this phase is fully parallel with no cross-worker
/// dependency. One element-wise sum-reduction then combines the partials
/// into the full result, identically replicated on every worker, from which
/// each worker extracts its own slice as the shard for the next phase.
pub fn matvec(comm: &Communicator, block: &ColumnBlock, shard: &[f64]) -> Result<DistVector> {
    assert_eq!(shard.len(), block.local_cols(), "shard length does not match block columns");

    let mut partial = vec![0.0; block.rows()];
    block.apply_into(shard, &mut partial);

    let full = comm.sum_reduce(&partial)?;
    let local = full[block.col_range()].to_vec();
    Ok(DistVector { local, full })
}
