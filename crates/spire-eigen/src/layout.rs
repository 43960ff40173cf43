//! Column-block partitioning of the global matrix over a worker cohort.

use std::ops::Range;

use spire_collective::Rank;

use crate::error::{Error, Result};

/// How the n columns of the global matrix are split across p workers.
///
/// Worker `id` owns the contiguous columns `id * l_n .. (id + 1) * l_n`
/// with `l_n = n / p`, so p must evenly divide n. The same ranges describe
/// which slice of a length-n vector forms each worker's shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockLayout {
    n: usize,
    workers: usize,
    block: usize,
}

impl BlockLayout {
    /// Validate a partition of `n` columns over `workers` workers.
    pub fn new(n: usize, workers: usize) -> Result<Self> {
        if n == 0 {
            return Err(Error::EmptyProblem);
        }
        if workers == 0 {
            return Err(Error::NoWorkers);
        }
        let remainder = n % workers;
        if remainder != 0 {
            return Err(Error::UnevenPartition { n, workers, remainder });
        }
        Ok(Self { n, workers, block: n / workers })
    }

    /// Global problem size n.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Cohort size p.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Local block length `l_n = n / p`.
    pub fn block_len(&self) -> usize {
        self.block
    }

    /// The contiguous column range owned by `rank`.
    pub fn col_range(&self, rank: Rank) -> Range<usize> {
        assert!(rank.0 < self.workers, "rank {} outside cohort of {}", rank, self.workers);
        rank.0 * self.block..(rank.0 + 1) * self.block
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn even_partition_is_accepted() {
        let layout = BlockLayout::new(12, 4).unwrap();
        assert_eq!(layout.n(), 12);
        assert_eq!(layout.workers(), 4);
        assert_eq!(layout.block_len(), 3);
        assert_eq!(layout.col_range(Rank(0)), 0..3);
        assert_eq!(layout.col_range(Rank(3)), 9..12);
    }

    #[test]
    fn uneven_partition_is_rejected() {
        match BlockLayout::new(10, 4) {
            Err(Error::UnevenPartition { n, workers, remainder }) => {
                assert_eq!((n, workers, remainder), (10, 4, 2));
            }
            other => panic!("expected UnevenPartition, got {other:?}"),
        }
    }

    #[test]
    fn degenerate_sizes_are_rejected() {
        assert!(matches!(BlockLayout::new(0, 2), Err(Error::EmptyProblem)));
        assert!(matches!(BlockLayout::new(8, 0), Err(Error::NoWorkers)));
    }

    #[test]
    #[should_panic(expected = "outside cohort")]
    fn out_of_range_rank_panics() {
        let layout = BlockLayout::new(8, 2).unwrap();
        let _ = layout.col_range(Rank(2));
    }

    proptest! {
        #[test]
        fn col_ranges_tile_the_problem(block in 1usize..32, workers in 1usize..9) {
            let n = block * workers;
            let layout = BlockLayout::new(n, workers).unwrap();
            let mut covered = 0;
            for r in 0..workers {
                let range = layout.col_range(Rank(r));
                prop_assert_eq!(range.start, covered);
                prop_assert_eq!(range.len(), layout.block_len());
                covered = range.end;
            }
            prop_assert_eq!(covered, n);
        }
    }
}
