//! Error types for domain construction, coarsening and direct solves

use math_saddle_solvers::LuError;
use thiserror::Error;

/// Errors surfaced by multigrid domains and the coarsening hierarchy
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MultigridError {
    /// The dense saddle system (or a factor of it) could not be solved
    #[error("direct solve failed: {0}")]
    Solve(#[from] LuError),
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    /// Coarsening would leave no unknowns on the next level
    #[error("coarsening a level with {vertices} vertices is degenerate")]
    DegenerateCoarsening { vertices: usize },
    #[error("coarsened level has {child} vertices, more than its parent's {parent}")]
    NonMonotonicCoarsening { parent: usize, child: usize },
    /// Constraint rows are linearly dependent, so B Bᵗ cannot be inverted
    #[error("constraint rows are linearly dependent")]
    SingularConstraints,
}

pub type Result<T> = std::result::Result<T, MultigridError>;
