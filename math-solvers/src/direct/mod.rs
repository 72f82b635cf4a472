//! Direct solvers for linear systems
//!
//! - [`lu_solve`]: LU decomposition with partial pivoting

mod lu;

pub use lu::{lu_factorize, lu_solve, LuError, LuFactorization};
