//! LU decomposition solver
//!
//! Provides LU factorization with partial pivoting for solving dense linear
//! systems, used at the coarsest level of a multigrid hierarchy.

use ndarray::{Array1, Array2};
use thiserror::Error;

/// Pivots below this magnitude are treated as zero
const SINGULAR_PIVOT_TOL: f64 = 1e-13;

/// Errors that can occur during LU factorization
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LuError {
    #[error("Matrix is singular or nearly singular (pivot {pivot:.3e} at column {column})")]
    SingularMatrix { column: usize, pivot: f64 },
    #[error("Matrix dimensions mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// LU factorization result
///
/// Stores L and U factors along with pivot information
#[derive(Debug, Clone)]
pub struct LuFactorization {
    /// Combined L and U matrices (L is unit lower triangular, stored below diagonal)
    pub lu: Array2<f64>,
    /// Row permutation: row `i` of the factors came from row `perm[i]` of the input
    pub perm: Vec<usize>,
    /// Matrix dimension
    pub n: usize,
}

impl LuFactorization {
    /// Solve Ax = b using the pre-computed LU factorization
    pub fn solve(&self, b: &Array1<f64>) -> Result<Array1<f64>, LuError> {
        if b.len() != self.n {
            return Err(LuError::DimensionMismatch {
                expected: self.n,
                got: b.len(),
            });
        }
        Ok(self.apply_inverse(b))
    }

    /// x = A⁻¹ b for a right-hand side whose length is known to match
    ///
    /// # Panics
    ///
    /// Panics if `b` does not have `n` entries.
    pub fn apply_inverse(&self, b: &Array1<f64>) -> Array1<f64> {
        assert_eq!(b.len(), self.n, "Input vector size mismatch");

        // Forward substitution: Ly = Pb
        let mut x = Array1::from_iter(self.perm.iter().map(|&p| b[p]));
        for i in 0..self.n {
            for j in 0..i {
                x[i] -= self.lu[[i, j]] * x[j];
            }
        }

        // Backward substitution: Ux = y
        for i in (0..self.n).rev() {
            for j in (i + 1)..self.n {
                x[i] -= self.lu[[i, j]] * x[j];
            }
            x[i] /= self.lu[[i, i]];
        }

        x
    }
}

/// Compute LU factorization with partial pivoting
pub fn lu_factorize(a: &Array2<f64>) -> Result<LuFactorization, LuError> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(LuError::DimensionMismatch {
            expected: n,
            got: a.ncols(),
        });
    }

    // Relative to the largest entry; an all-zero matrix fails at column 0
    let scale = a.iter().fold(0.0_f64, |m, v| m.max(v.abs()));

    let mut lu = a.clone();
    let mut perm: Vec<usize> = (0..n).collect();

    for k in 0..n {
        let (max_row, max_val) = (k..n)
            .map(|i| (i, lu[[i, k]].abs()))
            .fold((k, -1.0), |best, cur| if cur.1 > best.1 { cur } else { best });

        if max_val <= SINGULAR_PIVOT_TOL * scale {
            log::debug!("LU breakdown at column {} of {}: pivot {:.3e}", k, n, max_val);
            return Err(LuError::SingularMatrix {
                column: k,
                pivot: max_val,
            });
        }

        if max_row != k {
            for j in 0..n {
                lu.swap([k, j], [max_row, j]);
            }
            perm.swap(k, max_row);
        }

        let pivot = lu[[k, k]];
        for i in (k + 1)..n {
            let mult = lu[[i, k]] / pivot;
            lu[[i, k]] = mult;
            for j in (k + 1)..n {
                let update = mult * lu[[k, j]];
                lu[[i, j]] -= update;
            }
        }
    }

    Ok(LuFactorization { lu, perm, n })
}

/// Solve Ax = b using LU decomposition
///
/// This is a convenience function that combines factorization and solve.
pub fn lu_solve(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, LuError> {
    let factorization = lu_factorize(a)?;
    factorization.solve(b)
}
