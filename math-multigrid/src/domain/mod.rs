//! Multigrid domains
//!
//! A [`MultigridDomain`] is one level of a geometric multigrid hierarchy. It
//! can assemble its full saddle matrix, solve it directly, and produce the next
//! coarser level given a transfer operator. Levels are handled as trait
//! objects so each one may use a different concrete representation.

mod kernel;
mod saddle;

pub use kernel::path_laplacian;
pub use saddle::SaddleDomain;

use crate::error::Result;
use crate::projector::NullSpaceProjector;
use ndarray::{Array1, Array2};

/// One level of a multigrid hierarchy for a saddle-point system
///
/// `Mult` is the level's weighting object and `Op` the transfer operator type
/// the domain knows how to fill. Implementations must not change observable
/// state in `full_matrix` or `direct_solve`.
pub trait MultigridDomain<Mult, Op> {
    /// Build the next coarser level, writing the fine/coarse map into `prolong_op`.
    ///
    /// The returned level is owned by the caller and has no more vertices
    /// than `self`.
    fn coarsen(&self, prolong_op: &mut Op) -> Result<Box<dyn MultigridDomain<Mult, Op>>>;

    /// The level's weighting object, borrowed for the lifetime of the domain
    fn multiplier(&self) -> &Mult;

    /// Dense `num_rows() x num_rows()` saddle matrix
    ///
    /// Meant for coarse levels: cost grows quadratically with the level size.
    fn full_matrix(&self) -> Array2<f64>;

    /// Solve the saddle system for a right-hand side of length `num_rows()`
    fn direct_solve(&self, b: &Array1<f64>) -> Result<Array1<f64>>;

    /// Number of primary unknowns at this level
    fn num_vertices(&self) -> usize;

    /// Full saddle-system size: vertices plus constraint rows
    fn num_rows(&self) -> usize;

    /// A fresh transfer operator suitable for [`coarsen`](Self::coarsen)
    fn make_new_operator(&self) -> Op;

    fn constraint_projector(&self) -> &NullSpaceProjector;

    /// Rows of the saddle system occupied by constraints
    fn num_constraint_rows(&self) -> usize {
        self.num_rows() - self.num_vertices()
    }
}
