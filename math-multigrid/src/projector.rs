//! Null-space projector for a constraint block
//!
//! Projects onto `null(B)`: `P x = x - Bᵗ (B Bᵗ)⁻¹ B x`. The small `r x r`
//! Gram matrix `B Bᵗ` is factored once with dense LU.

use crate::error::{MultigridError, Result};
use math_saddle_solvers::{lu_factorize, CsrMatrix, LinearOperator, LuError, LuFactorization};
use ndarray::Array1;

/// Orthogonal projector onto the null space of a constraint block
#[derive(Debug, Clone)]
pub struct NullSpaceProjector {
    b: CsrMatrix,
    bt: CsrMatrix,
    gram: LuFactorization,
}

impl NullSpaceProjector {
    /// Factor `B Bᵗ` for the given `rows x cols` constraint block.
    ///
    /// Linearly dependent rows yield [`MultigridError::SingularConstraints`].
    pub fn new(b: CsrMatrix) -> Result<Self> {
        let bt = b.transpose();
        let gram = lu_factorize(&b.matmul(&bt).to_dense()).map_err(|e| match e {
            LuError::SingularMatrix { .. } => MultigridError::SingularConstraints,
            other => MultigridError::Solve(other),
        })?;
        log::debug!(
            "null-space projector: {} constraint rows over {} columns",
            b.num_rows,
            b.num_cols
        );
        Ok(Self { b, bt, gram })
    }

    /// Number of constraint rows the projector removes
    pub fn num_constraint_rows(&self) -> usize {
        self.b.num_rows
    }

    /// Number of degrees of freedom the projector acts on
    pub fn num_cols(&self) -> usize {
        self.b.num_cols
    }

    /// The constraint block `B`
    pub fn constraint_matrix(&self) -> &CsrMatrix {
        &self.b
    }

    /// Component of `x` along the constraint rows: `Bᵗ (B Bᵗ)⁻¹ B x`
    pub fn constraint_component(&self, x: &Array1<f64>) -> Array1<f64> {
        assert_eq!(x.len(), self.num_cols(), "Input vector size mismatch");
        if self.num_constraint_rows() == 0 {
            return Array1::zeros(x.len());
        }
        self.min_norm_solution(&self.b.matvec(x))
    }

    /// Smallest `x` with `B x = g`: `Bᵗ (B Bᵗ)⁻¹ g`
    pub fn min_norm_solution(&self, g: &Array1<f64>) -> Array1<f64> {
        assert_eq!(
            g.len(),
            self.num_constraint_rows(),
            "one value per constraint row is required"
        );
        // the Gram factor is r x r by construction
        let lambda = self.gram.apply_inverse(g);
        self.bt.matvec(&lambda)
    }

    /// Project `x` onto `null(B)`
    pub fn project(&self, x: &Array1<f64>) -> Array1<f64> {
        x - &self.constraint_component(x)
    }
}

impl LinearOperator for NullSpaceProjector {
    fn num_rows(&self) -> usize {
        self.num_cols()
    }

    fn num_cols(&self) -> usize {
        self.b.num_cols
    }

    fn apply(&self, x: &Array1<f64>) -> Array1<f64> {
        self.project(x)
    }

    fn apply_transpose(&self, x: &Array1<f64>) -> Array1<f64> {
        self.project(x)
    }
}
