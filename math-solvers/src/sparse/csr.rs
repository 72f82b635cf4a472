//! Compressed Sparse Row (CSR) matrix format
//!
//! CSR format stores:
//! - `values`: Non-zero entries in row-major order
//! - `col_indices`: Column index for each value
//! - `row_ptrs`: Index into values/col_indices where each row starts

use crate::traits::LinearOperator;
use ndarray::{Array1, Array2};
use std::ops::Range;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// A `(row, col, value)` entry used for coordinate-format assembly.
pub type Triplet = (usize, usize, f64);

/// Rows below this count are multiplied sequentially even with `rayon` enabled
#[cfg(feature = "rayon")]
const PARALLEL_ROW_THRESHOLD: usize = 256;

/// Compressed Sparse Row (CSR) matrix of real values
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    /// Number of rows
    pub num_rows: usize,
    /// Number of columns
    pub num_cols: usize,
    /// Non-zero values in row-major order
    pub values: Vec<f64>,
    /// Column indices for each value
    pub col_indices: Vec<usize>,
    /// Row pointers: row_ptrs[i] is the start index in values/col_indices for row i
    /// row_ptrs[num_rows] = nnz (total number of non-zeros)
    pub row_ptrs: Vec<usize>,
}

impl Default for CsrMatrix {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl CsrMatrix {
    /// Create a new empty CSR matrix
    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        Self {
            num_rows,
            num_cols,
            values: Vec::new(),
            col_indices: Vec::new(),
            row_ptrs: vec![0; num_rows + 1],
        }
    }

    /// Create a CSR matrix from a dense matrix
    ///
    /// Only stores entries with magnitude > threshold
    #[cfg(test)]
    fn from_dense(dense: &Array2<f64>, threshold: f64) -> Self {
        let num_rows = dense.nrows();
        let num_cols = dense.ncols();

        let mut values = Vec::new();
        let mut col_indices = Vec::new();
        let mut row_ptrs = vec![0usize; num_rows + 1];

        for i in 0..num_rows {
            for j in 0..num_cols {
                let val = dense[[i, j]];
                if val.abs() > threshold {
                    values.push(val);
                    col_indices.push(j);
                }
            }
            row_ptrs[i + 1] = values.len();
        }

        Self {
            num_rows,
            num_cols,
            values,
            col_indices,
            row_ptrs,
        }
    }

    /// Create a CSR matrix from COO (Coordinate) format triplets
    ///
    /// Triplets may arrive in any order. Duplicate `(row, col)` entries are summed.
    ///
    /// # Panics
    ///
    /// Panics if any triplet lies outside `num_rows x num_cols`.
    pub fn from_triplets(num_rows: usize, num_cols: usize, mut triplets: Vec<Triplet>) -> Self {
        for &(row, col, _) in &triplets {
            assert!(
                row < num_rows && col < num_cols,
                "Triplet ({}, {}) outside {}x{} matrix",
                row,
                col,
                num_rows,
                num_cols
            );
        }

        if triplets.is_empty() {
            return Self::new(num_rows, num_cols);
        }

        triplets.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut values = Vec::with_capacity(triplets.len());
        let mut col_indices = Vec::with_capacity(triplets.len());
        let mut row_counts = vec![0usize; num_rows];

        let mut prev: Option<(usize, usize)> = None;
        for (row, col, val) in triplets {
            if prev == Some((row, col)) {
                // Same coordinate, accumulate
                if let Some(last) = values.last_mut() {
                    *last += val;
                }
            } else {
                values.push(val);
                col_indices.push(col);
                row_counts[row] += 1;
                prev = Some((row, col));
            }
        }

        let mut row_ptrs = Vec::with_capacity(num_rows + 1);
        row_ptrs.push(0);
        for count in row_counts {
            let last = row_ptrs[row_ptrs.len() - 1];
            row_ptrs.push(last + count);
        }

        Self {
            num_rows,
            num_cols,
            values,
            col_indices,
            row_ptrs,
        }
    }

    /// Create identity matrix in CSR format
    pub fn identity(n: usize) -> Self {
        Self {
            num_rows: n,
            num_cols: n,
            values: vec![1.0; n],
            col_indices: (0..n).collect(),
            row_ptrs: (0..=n).collect(),
        }
    }

    /// Number of non-zero entries
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Shape as `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.num_rows, self.num_cols)
    }

    /// Get the range of indices in values/col_indices for a given row
    pub fn row_range(&self, row: usize) -> Range<usize> {
        self.row_ptrs[row]..self.row_ptrs[row + 1]
    }

    /// Get the (col, value) pairs for a row
    pub fn row_entries(&self, row: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.row_range(row);
        self.col_indices[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// Iterate over all stored entries as triplets, row by row
    pub fn triplets(&self) -> impl Iterator<Item = Triplet> + '_ {
        (0..self.num_rows).flat_map(move |i| self.row_entries(i).map(move |(j, v)| (i, j, v)))
    }

    /// Get element at (i, j), returns 0 if not stored
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.row_entries(i)
            .find(|&(col, _)| col == j)
            .map_or(0.0, |(_, v)| v)
    }

    /// Matrix-vector product: y = A * x
    ///
    /// Uses parallel processing when the `rayon` feature is enabled and the
    /// matrix is large enough to benefit from parallelization.
    pub fn matvec(&self, x: &Array1<f64>) -> Array1<f64> {
        assert_eq!(x.len(), self.num_cols, "Input vector size mismatch");

        #[cfg(feature = "rayon")]
        {
            if self.num_rows >= PARALLEL_ROW_THRESHOLD {
                return self.matvec_parallel(x);
            }
        }

        self.matvec_sequential(x)
    }

    fn matvec_sequential(&self, x: &Array1<f64>) -> Array1<f64> {
        Array1::from_iter(
            (0..self.num_rows).map(|i| self.row_entries(i).map(|(j, v)| v * x[j]).sum::<f64>()),
        )
    }

    #[cfg(feature = "rayon")]
    fn matvec_parallel(&self, x: &Array1<f64>) -> Array1<f64> {
        let results: Vec<f64> = (0..self.num_rows)
            .into_par_iter()
            .map(|i| self.row_entries(i).map(|(j, v)| v * x[j]).sum::<f64>())
            .collect();

        Array1::from_vec(results)
    }

    /// Transpose matrix-vector product: y = A^T * x
    pub fn matvec_transpose(&self, x: &Array1<f64>) -> Array1<f64> {
        assert_eq!(x.len(), self.num_rows, "Input vector size mismatch");

        let mut y = Array1::zeros(self.num_cols);
        for i in 0..self.num_rows {
            for (j, v) in self.row_entries(i) {
                y[j] += v * x[i];
            }
        }
        y
    }

    /// Explicit transpose
    pub fn transpose(&self) -> CsrMatrix {
        let triplets = self.triplets().map(|(i, j, v)| (j, i, v)).collect();
        CsrMatrix::from_triplets(self.num_cols, self.num_rows, triplets)
    }

    /// Sparse matrix-matrix product: C = A * B
    ///
    /// Entries that cancel to below 1e-15 in magnitude are dropped.
    pub fn matmul(&self, other: &CsrMatrix) -> CsrMatrix {
        assert_eq!(
            self.num_cols, other.num_rows,
            "Matrix dimension mismatch: A.cols ({}) != B.rows ({})",
            self.num_cols, other.num_rows
        );

        let m = self.num_rows;
        let n = other.num_cols;

        let mut triplets: Vec<Triplet> = Vec::with_capacity(self.nnz() * 2);
        let mut row_data: Vec<(usize, f64)> = Vec::new();

        for i in 0..m {
            row_data.clear();
            for (k, a_ik) in self.row_entries(i) {
                row_data.extend(other.row_entries(k).map(|(j, b_kj)| (j, a_ik * b_kj)));
            }
            row_data.sort_by_key(|&(j, _)| j);

            let mut iter = row_data.iter().copied();
            let Some((mut current_j, mut current_val)) = iter.next() else {
                continue;
            };
            for (j, val) in iter {
                if j == current_j {
                    current_val += val;
                } else {
                    if current_val.abs() > 1e-15 {
                        triplets.push((i, current_j, current_val));
                    }
                    current_j = j;
                    current_val = val;
                }
            }
            if current_val.abs() > 1e-15 {
                triplets.push((i, current_j, current_val));
            }
        }

        CsrMatrix::from_triplets(m, n, triplets)
    }

    /// Convert to dense matrix (for coarse levels and small matrices)
    pub fn to_dense(&self) -> Array2<f64> {
        let mut dense = Array2::zeros((self.num_rows, self.num_cols));
        for (i, j, v) in self.triplets() {
            dense[[i, j]] = v;
        }
        dense
    }
}

impl LinearOperator for CsrMatrix {
    fn num_rows(&self) -> usize {
        self.num_rows
    }

    fn num_cols(&self) -> usize {
        self.num_cols
    }

    fn apply(&self, x: &Array1<f64>) -> Array1<f64> {
        self.matvec(x)
    }

    fn apply_transpose(&self, x: &Array1<f64>) -> Array1<f64> {
        self.matvec_transpose(x)
    }
}
