//! Transfer operators for multigrid
//!
//! A [`Prolongation`] maps coarse unknowns to fine ones (`P`); its transpose
//! restricts fine residuals to the coarse level (`R = Pᵗ`).

use crate::error::{MultigridError, Result};
use math_saddle_solvers::{CsrMatrix, LinearOperator, Triplet};
use ndarray::Array1;

/// Prolongation operator (fine x coarse) with its cached transpose
#[derive(Debug, Clone, Default)]
pub struct Prolongation {
    p: CsrMatrix,
    r: CsrMatrix,
}

impl Prolongation {
    /// Wrap an explicit fine x coarse matrix
    pub fn from_matrix(p: CsrMatrix) -> Self {
        let r = p.transpose();
        Self { p, r }
    }

    /// Linear interpolation on a chain of `n_fine` nodes.
    ///
    /// Coarse node `j` sits on fine node `2j`; odd fine nodes take the average of
    /// their two coarse neighbours, so `n_coarse = (n_fine + 1) / 2`.
    pub fn linear_interpolation(n_fine: usize) -> Result<Self> {
        Self::blocked_linear_interpolation(n_fine, 1)
    }

    /// Linear interpolation of `n_fine / block_size` chain nodes carrying
    /// `block_size` interleaved components each, i.e. `P_chain ⊗ I`.
    ///
    /// Component `d` of a coarse node only feeds component `d` of fine nodes.
    ///
    /// # Panics
    ///
    /// Panics if `block_size` is zero or does not divide `n_fine`.
    pub fn blocked_linear_interpolation(n_fine: usize, block_size: usize) -> Result<Self> {
        assert!(
            block_size > 0 && n_fine % block_size == 0,
            "{} unknowns do not split into blocks of {}",
            n_fine,
            block_size
        );
        let n_nodes = n_fine / block_size;
        if n_nodes < 2 {
            return Err(MultigridError::DegenerateCoarsening { vertices: n_fine });
        }
        let n_coarse_nodes = n_nodes.div_ceil(2);

        let mut triplets: Vec<Triplet> = Vec::with_capacity(2 * n_fine);
        let mut push_node = |fine: usize, coarse: usize, w: f64| {
            for d in 0..block_size {
                triplets.push((block_size * fine + d, block_size * coarse + d, w));
            }
        };
        for i in 0..n_nodes {
            if i % 2 == 0 {
                push_node(i, i / 2, 1.0);
            } else {
                push_node(i, i / 2, 0.5);
                // even node count: the last fine node has only a left coarse neighbour
                if i / 2 + 1 < n_coarse_nodes {
                    push_node(i, i / 2 + 1, 0.5);
                } else {
                    push_node(i, i / 2, 0.5);
                }
            }
        }

        Ok(Self::from_matrix(CsrMatrix::from_triplets(
            n_fine,
            block_size * n_coarse_nodes,
            triplets,
        )))
    }

    /// The fine x coarse matrix `P`
    pub fn matrix(&self) -> &CsrMatrix {
        &self.p
    }

    /// Number of fine-level unknowns
    pub fn num_fine(&self) -> usize {
        self.p.num_rows
    }

    /// Number of coarse-level unknowns
    pub fn num_coarse(&self) -> usize {
        self.p.num_cols
    }

    /// True until a coarsening step has filled the operator
    pub fn is_empty(&self) -> bool {
        self.num_fine() == 0 && self.num_coarse() == 0
    }

    /// u_fine = P * u_coarse
    pub fn prolong(&self, coarse: &Array1<f64>) -> Array1<f64> {
        self.p.matvec(coarse)
    }

    /// r_coarse = Pᵗ * r_fine
    pub fn restrict(&self, fine: &Array1<f64>) -> Array1<f64> {
        self.r.matvec(fine)
    }

    /// Galerkin coarse operator Pᵗ A P
    pub fn galerkin(&self, a: &CsrMatrix) -> CsrMatrix {
        assert_eq!(
            a.shape(),
            (self.num_fine(), self.num_fine()),
            "operator does not act on the fine level"
        );
        self.r.matmul(&a.matmul(&self.p))
    }
}

impl LinearOperator for Prolongation {
    fn num_rows(&self) -> usize {
        self.num_fine()
    }

    fn num_cols(&self) -> usize {
        self.num_coarse()
    }

    fn apply(&self, x: &Array1<f64>) -> Array1<f64> {
        self.prolong(x)
    }

    fn apply_transpose(&self, x: &Array1<f64>) -> Array1<f64> {
        self.restrict(x)
    }
}
