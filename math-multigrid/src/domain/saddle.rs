//! Sparse saddle-point domain with Galerkin coarsening

use super::MultigridDomain;
use crate::constraints::{DomainConstraints, LinearConstraints};
use crate::error::{MultigridError, Result};
use crate::projector::NullSpaceProjector;
use crate::transfer::Prolongation;
use math_saddle_solvers::{lu_solve, CsrMatrix};
use ndarray::{s, Array1, Array2};

/// Saddle system `[A Bᵗ; B 0]` with a sparse SPD kernel `A`
///
/// The kernel doubles as the level's multiplier. Unknowns are grouped into
/// blocks of `block_size` interleaved components per vertex (1 for scalar
/// fields, `dim` for point coordinates). Coarsening interpolates linearly
/// along the vertex ordering, component by component: `A_c = Pᵗ A P`,
/// `B_c = B P`.
#[derive(Debug, Clone)]
pub struct SaddleDomain {
    kernel: CsrMatrix,
    constraints: LinearConstraints,
    projector: NullSpaceProjector,
    block_size: usize,
}

impl SaddleDomain {
    /// Assemble a scalar level from a kernel and any constraint family.
    ///
    /// # Panics
    ///
    /// Panics if the kernel is not square or its size differs from the
    /// constraint set's column count.
    pub fn new<C: DomainConstraints>(kernel: CsrMatrix, constraints: &C) -> Result<Self> {
        Self::with_block_size(kernel, constraints, 1)
    }

    /// Assemble a level whose unknowns come in interleaved blocks, e.g.
    /// `dim` coordinates per point for a [`BarycenterConstraint`].
    ///
    /// The stored constraints evaluate to the same residual as `constraints`
    /// does in its current state.
    ///
    /// [`BarycenterConstraint`]: crate::constraints::BarycenterConstraint
    ///
    /// # Panics
    ///
    /// Panics if the kernel is not square, its size differs from the
    /// constraint set's column count, or `block_size` does not divide it.
    pub fn with_block_size<C: DomainConstraints>(
        kernel: CsrMatrix,
        constraints: &C,
        block_size: usize,
    ) -> Result<Self> {
        assert_eq!(
            kernel.num_rows, kernel.num_cols,
            "kernel operator must be square"
        );
        assert_eq!(
            kernel.num_cols,
            constraints.num_expected_cols(),
            "constraints must span the kernel's degrees of freedom"
        );
        assert!(
            block_size > 0 && kernel.num_rows % block_size == 0,
            "{} unknowns do not split into blocks of {}",
            kernel.num_rows,
            block_size
        );

        let mut block = CsrMatrix::default();
        constraints.fill_constraint_matrix(&mut block);
        let mut targets = Array1::zeros(0);
        constraints.update_target_values(&mut targets);

        let mut residual = Array1::zeros(targets.len());
        constraints.fill_constraint_values(&mut residual, &targets, 0);

        let linear = LinearConstraints::new(block, targets.clone());
        let mut domain = Self::from_parts(kernel, linear, block_size)?;
        // a state with B x = g(current) keeps the family's residual
        let state = domain.projector.min_norm_solution(&(&targets - &residual));
        domain.constraints.set_state(state);
        Ok(domain)
    }

    fn from_parts(
        kernel: CsrMatrix,
        constraints: LinearConstraints,
        block_size: usize,
    ) -> Result<Self> {
        let projector = NullSpaceProjector::new(constraints.matrix().clone())?;
        log::debug!(
            "saddle level: {} vertices in blocks of {}, {} constraint rows, kernel nnz {}",
            kernel.num_rows,
            block_size,
            constraints.num_constraint_rows(),
            kernel.nnz()
        );
        Ok(Self {
            kernel,
            constraints,
            projector,
            block_size,
        })
    }

    /// Interleaved components per vertex
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// The kernel operator `A`
    pub fn kernel(&self) -> &CsrMatrix {
        &self.kernel
    }

    /// Constraint rows at this level, evaluated at the level's state
    pub fn constraints(&self) -> &LinearConstraints {
        &self.constraints
    }
}

impl MultigridDomain<CsrMatrix, Prolongation> for SaddleDomain {
    fn coarsen(
        &self,
        prolong_op: &mut Prolongation,
    ) -> Result<Box<dyn MultigridDomain<CsrMatrix, Prolongation>>> {
        let p = Prolongation::blocked_linear_interpolation(self.num_vertices(), self.block_size)?;
        let kernel = p.galerkin(&self.kernel);
        let constraints = self.constraints.coarsened(&p);
        let coarse = Self::from_parts(kernel, constraints, self.block_size)?;

        log::debug!(
            "coarsened {} -> {} vertices",
            self.num_vertices(),
            coarse.num_vertices()
        );
        *prolong_op = p;
        Ok(Box::new(coarse))
    }

    fn multiplier(&self) -> &CsrMatrix {
        &self.kernel
    }

    fn full_matrix(&self) -> Array2<f64> {
        let n = self.num_rows();
        let nv = self.num_vertices();
        let mut a = Array2::zeros((n, n));
        a.slice_mut(s![..nv, ..nv]).assign(&self.kernel.to_dense());
        self.constraints.fill_dense_block(&mut a);
        a
    }

    fn direct_solve(&self, b: &Array1<f64>) -> Result<Array1<f64>> {
        if b.len() != self.num_rows() {
            return Err(MultigridError::DimensionMismatch {
                expected: self.num_rows(),
                got: b.len(),
            });
        }
        Ok(lu_solve(&self.full_matrix(), b)?)
    }

    fn num_vertices(&self) -> usize {
        self.kernel.num_rows
    }

    fn num_rows(&self) -> usize {
        self.num_vertices() + self.projector.num_constraint_rows()
    }

    fn make_new_operator(&self) -> Prolongation {
        Prolongation::default()
    }

    fn constraint_projector(&self) -> &NullSpaceProjector {
        &self.projector
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::BarycenterConstraint;
    use crate::domain::path_laplacian;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn sum_domain(n: usize, target: f64) -> SaddleDomain {
        SaddleDomain::new(path_laplacian(n, 0.5), &LinearConstraints::sum(n, target)).unwrap()
    }

    #[test]
    fn test_sizes() {
        let d = sum_domain(6, 1.0);
        assert_eq!(d.num_vertices(), 6);
        assert_eq!(d.num_rows(), 7);
        assert_eq!(d.num_constraint_rows(), 1);
        assert_eq!(d.full_matrix().dim(), (7, 7));
    }

    #[test]
    fn test_full_matrix_quadrants() {
        let d = sum_domain(3, 1.0);
        let m = d.full_matrix();
        let a = path_laplacian(3, 0.5).to_dense();

        assert_eq!(m.slice(s![..3, ..3]), a);
        assert_eq!(m.slice(s![3, ..3]).to_vec(), vec![1.0, 1.0, 1.0]);
        assert_eq!(m.slice(s![..3, 3]).to_vec(), vec![1.0, 1.0, 1.0]);
        assert_relative_eq!(m[[3, 3]], 0.0);
    }

    #[test]
    fn test_direct_solve_satisfies_constraint() {
        let d = sum_domain(4, 2.0);
        let mut b = Array1::<f64>::zeros(5);
        b[4] = 2.0;

        let x = d.direct_solve(&b).unwrap();
        assert_relative_eq!(x.slice(s![..4]).sum(), 2.0, epsilon = 1e-10);

        // idempotent and side-effect free
        let again = d.direct_solve(&b).unwrap();
        assert_eq!(x, again);
        assert_eq!(d.full_matrix(), d.full_matrix());
    }

    #[test]
    fn test_direct_solve_wrong_length() {
        let d = sum_domain(4, 2.0);
        assert_eq!(
            d.direct_solve(&Array1::zeros(4)).unwrap_err(),
            MultigridError::DimensionMismatch {
                expected: 5,
                got: 4
            }
        );
    }

    #[test]
    fn test_singular_kernel_reports_failure() {
        // unshifted Laplacian without constraints: constants span its null space
        let d = SaddleDomain::new(path_laplacian(3, 0.0), &LinearConstraints::empty(3)).unwrap();
        let err = d.direct_solve(&array![1.0, 0.0, -1.0]).unwrap_err();
        assert!(matches!(err, MultigridError::Solve(_)));
    }

    #[test]
    fn test_coarsen_fills_operator() {
        let d = sum_domain(9, 1.0);
        let mut op = d.make_new_operator();
        assert!(op.is_empty());

        let coarse = d.coarsen(&mut op).unwrap();
        assert_eq!((op.num_fine(), op.num_coarse()), (9, 5));
        assert_eq!(coarse.num_vertices(), 5);
        assert_eq!(coarse.num_rows(), 6);
        assert_eq!(coarse.multiplier().shape(), (5, 5));
        assert_eq!(coarse.constraint_projector().num_cols(), 5);
    }

    #[test]
    fn test_constraints_keep_family_residual() {
        let points = array![[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]];
        let mut family = BarycenterConstraint::uniform(points.clone());
        family.set_positions(points + &array![0.5, -1.0]);

        let d = SaddleDomain::with_block_size(CsrMatrix::identity(8), &family, 2).unwrap();

        let mut targets = Array1::zeros(0);
        family.update_target_values(&mut targets);
        let mut expected = Array1::zeros(2);
        family.fill_constraint_values(&mut expected, &targets, 0);
        let mut stored = Array1::zeros(2);
        d.constraints().fill_constraint_values(&mut stored, &targets, 0);

        assert_relative_eq!(stored[0], -0.5, epsilon = 1e-12);
        assert_relative_eq!(stored[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(stored[0], expected[0], epsilon = 1e-12);
        assert_relative_eq!(stored[1], expected[1], epsilon = 1e-12);
    }

    #[test]
    fn test_coarsen_point_blocks_keeps_coordinates_apart() {
        let points = array![[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]];
        let family = BarycenterConstraint::uniform(points);
        let d = SaddleDomain::with_block_size(CsrMatrix::identity(8), &family, 2).unwrap();

        let mut op = d.make_new_operator();
        let coarse = d.coarsen(&mut op).unwrap();
        assert_eq!((op.num_fine(), op.num_coarse()), (8, 4));
        assert_eq!(coarse.num_vertices(), 4);
        assert_eq!(coarse.num_rows(), 6);

        // moving coarse x0 never touches a y coordinate
        let fine = op.prolong(&array![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(fine.to_vec(), vec![1.0, 0.0, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0]);

        // coarse barycenter rows stay independent
        let dense = coarse.constraint_projector().constraint_matrix().to_dense();
        assert_relative_eq!(dense[[0, 1]], 0.0);
        assert_relative_eq!(dense[[0, 3]], 0.0);
        assert_relative_eq!(dense[[1, 0]], 0.0);
        assert_relative_eq!(dense[[1, 2]], 0.0);
    }

    #[test]
    #[should_panic(expected = "do not split")]
    fn test_block_size_must_divide_unknowns() {
        let constraints = LinearConstraints::empty(5);
        let _ = SaddleDomain::with_block_size(path_laplacian(5, 1.0), &constraints, 2);
    }

    #[test]
    fn test_coarsen_single_vertex_is_degenerate() {
        let d = sum_domain(1, 1.0);
        let mut op = d.make_new_operator();
        assert_eq!(
            d.coarsen(&mut op).err(),
            Some(MultigridError::DegenerateCoarsening { vertices: 1 })
        );
        assert!(op.is_empty());
    }
}
