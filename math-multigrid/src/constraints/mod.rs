//! Constraint sets that can be embedded into a saddle system
//!
//! Any family of linear(ised) constraints implements [`DomainConstraints`]
//! by supplying five primitives:
//!
//! - [`num_constraint_rows`](DomainConstraints::num_constraint_rows): how many
//!   rows the constraint block occupies
//! - [`num_expected_cols`](DomainConstraints::num_expected_cols): how many
//!   degrees of freedom the block spans
//! - [`add_triplets`](DomainConstraints::add_triplets): the `(row, col, value)`
//!   entries of the block, without any offset
//! - [`set_target_values`](DomainConstraints::set_target_values): the value each
//!   constraint function should equal
//! - [`negative_constraint_values`](DomainConstraints::negative_constraint_values):
//!   `target - g(current)` per row
//!
//! The saddle-assembly operations are provided on top of these and are
//! resolved statically, so assembly loops never go through a vtable.
//! Nothing here knows about multigrid levels or the kernel operator.

mod barycenter;
mod linear;

pub use barycenter::BarycenterConstraint;
pub use linear::LinearConstraints;

use math_saddle_solvers::{CsrMatrix, Triplet};
use ndarray::{s, Array1, Array2};

/// Infinity norm of a vector, 0 for an empty one
pub fn inf_norm(v: &Array1<f64>) -> f64 {
    v.iter().fold(0.0_f64, |m, x| m.max(x.abs()))
}

/// A constraint block `B` (rows x cols) that can be placed into the saddle matrix
///
/// ```text
/// [ A   Bᵗ ]
/// [ B   0  ]
/// ```
///
/// Buffer sizes passed to the provided methods are preconditions; a mismatch
/// is a programming error and panics.
pub trait DomainConstraints {
    /// Number of rows occupied by this constraint set's block
    fn num_constraint_rows(&self) -> usize;

    /// Number of columns the block spans, i.e. the total number of degrees of freedom
    fn num_expected_cols(&self) -> usize;

    /// Append the block's entries. Rows and columns are local to the block.
    fn add_triplets(&self, triplets: &mut Vec<Triplet>);

    /// Write the current target value of every constraint row.
    ///
    /// `targets` always has `num_constraint_rows()` entries.
    fn set_target_values(&self, targets: &mut Array1<f64>);

    /// Write `targets[i] - g_i(current)` for every row into `b`.
    ///
    /// `b` always has `num_constraint_rows()` entries.
    fn negative_constraint_values(&self, b: &mut Array1<f64>, targets: &Array1<f64>);

    /// Side length of the full square saddle matrix
    fn saddle_num_rows(&self) -> usize {
        self.num_constraint_rows() + self.num_expected_cols()
    }

    /// Replace `b` with a freshly assembled `rows x cols` block.
    ///
    /// Duplicate coordinates accumulate. Whatever `b` held before is discarded.
    fn fill_constraint_matrix(&self, b: &mut CsrMatrix) {
        let mut triplets = Vec::new();
        self.add_triplets(&mut triplets);
        *b = CsrMatrix::from_triplets(
            self.num_constraint_rows(),
            self.num_expected_cols(),
            triplets,
        );
    }

    /// Write `B` into the lower-left and `Bᵗ` into the upper-right quadrant of a
    /// full saddle matrix.
    ///
    /// `a` must already be `saddle_num_rows()` square; no other entry is touched.
    fn fill_dense_block(&self, a: &mut Array2<f64>) {
        let n = self.saddle_num_rows();
        assert_eq!(
            a.dim(),
            (n, n),
            "saddle matrix must be {}x{} before filling the constraint block",
            n,
            n
        );

        let mut triplets = Vec::new();
        self.add_triplets(&mut triplets);
        let offset = self.num_expected_cols();

        for (row, col, value) in triplets {
            a[[offset + row, col]] = value;
            a[[col, offset + row]] = value;
        }
    }

    /// Refresh `targets` with the current target of every row, resizing it to
    /// `num_constraint_rows()` zeros first if its length differs.
    fn update_target_values(&self, targets: &mut Array1<f64>) {
        let n_constrs = self.num_constraint_rows();
        if targets.len() != n_constrs {
            *targets = Array1::zeros(n_constrs);
        }
        self.set_target_values(targets);
    }

    /// Write the negated constraint residuals into `b[offset..offset + rows]`
    /// and return their infinity norm.
    ///
    /// The return value is the convergence signal for constraint satisfaction.
    fn fill_constraint_values(
        &self,
        b: &mut Array1<f64>,
        targets: &Array1<f64>,
        offset: usize,
    ) -> f64 {
        let n_constrs = self.num_constraint_rows();
        assert_eq!(
            targets.len(),
            n_constrs,
            "targets must have one entry per constraint row"
        );
        assert!(
            offset + n_constrs <= b.len(),
            "constraint segment {}..{} exceeds vector of length {}",
            offset,
            offset + n_constrs,
            b.len()
        );

        let mut b_constrs = Array1::zeros(n_constrs);
        self.negative_constraint_values(&mut b_constrs, targets);
        b.slice_mut(s![offset..offset + n_constrs]).assign(&b_constrs);

        inf_norm(&b_constrs)
    }
}
