//! Distributed inner product of identically sharded vectors.

use spire_collective::Communicator;

use crate::error::Result;

/// Left-to-right partial sum over one worker's shards. The fixed summation
/// order keeps the local rounding deterministic.
pub fn local_dot(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len(), "mismatched shard lengths");
    let mut acc = 0.0;
    for (x, y) in a.iter().zip(b) {
        acc += x * y;
    }
    acc
}

/// Global inner product: every worker passes its shard of each vector and
/// every worker receives the same scalar, combined by one sum-reduction.
pub fn dot(comm: &Communicator, a: &[f64], b: &[f64]) -> Result<f64> {
    Ok(comm.sum_reduce_scalar(local_dot(a, b))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spire_collective::run_cohort;

    #[test]
    fn local_dot_sums_left_to_right() {
        assert_eq!(local_dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
        assert_eq!(local_dot(&[], &[]), 0.0);
    }

    #[test]
    #[should_panic(expected = "mismatched shard lengths")]
    fn mismatched_shards_panic() {
        local_dot(&[1.0], &[1.0, 2.0]);
    }

    #[test]
    fn normalized_ones_has_unit_norm_for_any_partition() {
        // n = 4, x = (0.5, 0.5, 0.5, 0.5): x' * x = 1 regardless of how the
        // shards are cut.
        for p in [1usize, 2, 4] {
            let outs = run_cohort(p, move |comm| -> crate::Result<f64> {
                let shard = vec![0.5; 4 / comm.size()];
                dot(&comm, &shard, &shard)
            })
            .unwrap();
            for d in outs {
                assert!((d - 1.0).abs() < 1e-15, "p = {p}: got {d}");
            }
        }
    }

    #[test]
    fn scalar_is_identical_on_every_rank() {
        let outs = run_cohort(4, |comm| -> crate::Result<f64> {
            let r = comm.rank().0 as f64;
            dot(&comm, &[r + 0.1, r + 0.2], &[1.0, 2.0])
        })
        .unwrap();
        for d in &outs {
            assert_eq!(d.to_bits(), outs[0].to_bits());
        }
    }
}
