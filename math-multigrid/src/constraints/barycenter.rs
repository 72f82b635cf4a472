//! Weighted barycenter constraint for a point set

use super::DomainConstraints;
use math_saddle_solvers::Triplet;
use ndarray::{Array1, Array2};

/// Keeps the weighted barycenter of `n` points in `dim` dimensions fixed.
///
/// Unknowns are laid out interleaved: coordinate `d` of point `i` is column
/// `dim * i + d`. There is one row per dimension, `Σ_i w_i p_i[d]`, with the
/// weights normalised to sum to one.
#[derive(Debug, Clone)]
pub struct BarycenterConstraint {
    weights: Array1<f64>,
    positions: Array2<f64>,
    target: Array1<f64>,
}

impl BarycenterConstraint {
    /// Constrain the barycenter to where it currently is.
    ///
    /// `positions` is `n x dim`; `weights` has `n` non-negative entries with a
    /// positive sum (e.g. dual lengths or areas).
    ///
    /// # Panics
    ///
    /// Panics if the weights don't match the point count or sum to zero.
    pub fn new(positions: Array2<f64>, weights: Array1<f64>) -> Self {
        assert_eq!(
            weights.len(),
            positions.nrows(),
            "one weight per point is required"
        );
        let total = weights.sum();
        assert!(total > 0.0, "barycenter weights must have a positive sum");

        let weights = weights / total;
        let target = weights.dot(&positions);
        Self {
            weights,
            positions,
            target,
        }
    }

    /// Equal weights for every point
    pub fn uniform(positions: Array2<f64>) -> Self {
        let n = positions.nrows();
        Self::new(positions, Array1::ones(n))
    }

    /// Override the barycenter the points must keep
    pub fn with_target(mut self, target: Array1<f64>) -> Self {
        assert_eq!(target.len(), self.dim(), "target dimension mismatch");
        self.target = target;
        self
    }

    pub fn dim(&self) -> usize {
        self.positions.ncols()
    }

    pub fn num_points(&self) -> usize {
        self.positions.nrows()
    }

    /// Weighted barycenter of the current positions
    pub fn barycenter(&self) -> Array1<f64> {
        self.weights.dot(&self.positions)
    }

    /// Move the points; the target is left as is
    pub fn set_positions(&mut self, positions: Array2<f64>) {
        assert_eq!(
            positions.dim(),
            self.positions.dim(),
            "positions shape mismatch"
        );
        self.positions = positions;
    }
}

impl DomainConstraints for BarycenterConstraint {
    fn num_constraint_rows(&self) -> usize {
        self.dim()
    }

    fn num_expected_cols(&self) -> usize {
        self.num_points() * self.dim()
    }

    fn add_triplets(&self, triplets: &mut Vec<Triplet>) {
        let dim = self.dim();
        for (i, &w) in self.weights.iter().enumerate() {
            for d in 0..dim {
                triplets.push((d, dim * i + d, w));
            }
        }
    }

    fn set_target_values(&self, targets: &mut Array1<f64>) {
        targets.assign(&self.target);
    }

    fn negative_constraint_values(&self, b: &mut Array1<f64>, targets: &Array1<f64>) {
        b.assign(&(targets - &self.barycenter()));
    }
}
