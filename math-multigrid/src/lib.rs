//! Geometric multigrid core for saddle-point systems
//!
//! Solves systems of the form
//!
//! ```text
//! [ A   Bᵗ ] [x]   [f]
//! [ B   0  ] [λ] = [g]
//! ```
//!
//! where `A` is a kernel operator from a geometric discretization and `B`
//! a block of linear constraints on the same degrees of freedom.
//!
//! # Features
//!
//! - **Constraint assembly**: [`DomainConstraints`], a statically dispatched
//!   contract that fills the `B`/`Bᵗ` blocks, target values and residuals
//! - **Multigrid levels**: [`MultigridDomain`], a trait-object contract for one
//!   level that can coarsen itself, assemble and directly solve its saddle matrix
//! - **Hierarchy**: [`DomainHierarchy`] walks the coarsening chain and checks it
//! - **Building blocks**: [`NullSpaceProjector`], [`Prolongation`],
//!   [`SaddleDomain`] over a sparse kernel
//!
//! # Example
//!
//! ```
//! use math_saddle_multigrid::{
//!     path_laplacian, CsrMatrix, DomainHierarchy, HierarchyConfig, LinearConstraints,
//!     MultigridDomain, Prolongation, SaddleDomain,
//! };
//!
//! let n = 33;
//! let finest: Box<dyn MultigridDomain<CsrMatrix, Prolongation>> = Box::new(SaddleDomain::new(
//!     path_laplacian(n, 0.1),
//!     &LinearConstraints::sum(n, 1.0),
//! )?);
//! let hierarchy = DomainHierarchy::build(finest, &HierarchyConfig::default())?;
//!
//! let coarsest = hierarchy.coarsest();
//! assert!(coarsest.num_vertices() <= 8);
//! let x = coarsest.direct_solve(&ndarray::Array1::ones(coarsest.num_rows()))?;
//! assert_eq!(x.len(), coarsest.num_rows());
//! # Ok::<(), math_saddle_multigrid::MultigridError>(())
//! ```

pub mod constraints;
pub mod domain;
pub mod error;
pub mod hierarchy;
pub mod projector;
pub mod transfer;

pub use constraints::{inf_norm, BarycenterConstraint, DomainConstraints, LinearConstraints};
pub use domain::{path_laplacian, MultigridDomain, SaddleDomain};
pub use error::{MultigridError, Result};
pub use hierarchy::{DomainHierarchy, HierarchyConfig};
pub use projector::NullSpaceProjector;
pub use transfer::Prolongation;

pub use math_saddle_solvers::CsrMatrix;
