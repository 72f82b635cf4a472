//! Linear algebra kernels for saddle-point multigrid
//!
//! This crate provides the sparse storage and direct solver the multigrid
//! crate builds on.
//!
//! # Features
//!
//! - **Sparse Matrices**: CSR format with triplet assembly, transpose and products
//! - **Direct Solvers**: LU decomposition with partial pivoting
//! - **Operators**: a [`LinearOperator`] trait shared by matrices, transfer maps and projectors
//!
//! # Example
//!
//! ```
//! use math_saddle_solvers::{CsrMatrix, lu_solve};
//! use ndarray::array;
//!
//! let a = CsrMatrix::from_triplets(2, 2, vec![(0, 0, 2.0), (1, 1, 4.0), (0, 1, 1.0)]);
//! let x = lu_solve(&a.to_dense(), &array![3.0, 4.0]).unwrap();
//! assert!((x[1] - 1.0).abs() < 1e-12);
//! ```

pub mod direct;
pub mod sparse;
pub mod traits;

pub use direct::{lu_factorize, lu_solve, LuError, LuFactorization};
pub use sparse::{CsrMatrix, Triplet};
pub use traits::LinearOperator;
