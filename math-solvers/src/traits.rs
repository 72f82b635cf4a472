//! Core traits for linear algebra operations
//!
//! [`LinearOperator`] is the abstraction shared by sparse matrices, transfer
//! operators and constraint projectors, so a multigrid driver can apply any
//! of them without knowing the concrete representation.

use ndarray::Array1;

/// Trait for linear operators (matrices) that can perform matrix-vector products.
///
/// Kept object safe: a driver may hold `&dyn LinearOperator` for levels whose
/// concrete operator type differs.
pub trait LinearOperator {
    /// Number of rows in the operator
    fn num_rows(&self) -> usize;

    /// Number of columns in the operator
    fn num_cols(&self) -> usize;

    /// Apply the operator: y = A * x
    fn apply(&self, x: &Array1<f64>) -> Array1<f64>;

    /// Apply the transpose: y = A^T * x
    fn apply_transpose(&self, x: &Array1<f64>) -> Array1<f64>;

    /// Check if the operator is square
    fn is_square(&self) -> bool {
        self.num_rows() == self.num_cols()
    }
}
