//! A worker's column block of the global matrix and the local product
//! kernel.

use std::ops::Range;

use spire_collective::Rank;

use crate::layout::BlockLayout;

/// Hilbert-type example entries: `A(i, j) = 1 / (i + j + 1)` in 0-based
/// indexing. Symmetric, positive definite, with a well-separated dominant
/// eigenvalue.
pub fn hilbert_entry(i: usize, j: usize) -> f64 {
    1.0 / ((i + j + 1) as f64)
}

/// Diagonal test entries: `diag(1, 2, ..., n)`. The dominant pair is
/// exactly known (eigenvalue n, eigenvector e_n), which makes it useful for
/// exact-value tests.
pub fn diagonal_entry(i: usize, j: usize) -> f64 {
    if i == j {
        (i + 1) as f64
    } else {
        0.0
    }
}

/// The n-by-`l_n` column block owned by one worker, stored column-major:
/// element (row `i`, local column `l_j`) sits at `data[i + l_j * n]`.
#[derive(Debug, Clone)]
pub struct ColumnBlock {
    n: usize,
    col_start: usize,
    cols: usize,
    data: Vec<f64>,
}

impl ColumnBlock {
    /// Assemble this worker's block from an entry oracle `(row, col) -> f64`
    /// over its assigned column range. The fill order writes `data`
    /// consecutively.
    pub fn from_entries<F>(layout: &BlockLayout, rank: Rank, entry: F) -> Self
    where
        F: Fn(usize, usize) -> f64,
    {
        let n = layout.n();
        let range = layout.col_range(rank);
        let mut data = Vec::with_capacity(n * range.len());
        for j in range.clone() {
            for i in 0..n {
                data.push(entry(i, j));
            }
        }
        Self { n, col_start: range.start, cols: range.len(), data }
    }

    /// Number of rows (the global problem size n).
    pub fn rows(&self) -> usize {
        self.n
    }

    /// Number of locally owned columns `l_n`.
    pub fn local_cols(&self) -> usize {
        self.cols
    }

    /// The global column range this block covers.
    pub fn col_range(&self) -> Range<usize> {
        self.col_start..self.col_start + self.cols
    }

    /// Raw column-major storage, e.g. for gathering the full matrix to the
    /// reporting rank.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// `out = block · shard`: scale each owned column by the matching shard
    /// entry and accumulate. Column-major traversal keeps the memory access
    /// sequential; this is the dominant cost of the solve, O(n · l_n) flops.
    pub fn apply_into(&self, shard: &[f64], out: &mut [f64]) {
        assert_eq!(shard.len(), self.cols, "shard length does not match block columns");
        assert_eq!(out.len(), self.n, "output length does not match block rows");
        out.fill(0.0);
        for (l_j, &x_j) in shard.iter().enumerate() {
            let col = &self.data[l_j * self.n..(l_j + 1) * self.n];
            for (y_i, &a_ij) in out.iter_mut().zip(col) {
                *y_i += a_ij * x_j;
            }
        }
    }
}
