//! Explicit linear equality constraints `B x = t`

use super::DomainConstraints;
use crate::transfer::Prolongation;
use math_saddle_solvers::{CsrMatrix, Triplet};
use ndarray::Array1;

/// Linear constraints given as an explicit sparse block
///
/// Row `i` reads `(B x)_i = targets[i]`, evaluated at the stored state `x`.
#[derive(Debug, Clone)]
pub struct LinearConstraints {
    rows: CsrMatrix,
    targets: Array1<f64>,
    state: Array1<f64>,
}

impl LinearConstraints {
    /// Build from a block and per-row targets, with a zero initial state
    ///
    /// # Panics
    ///
    /// Panics if `targets` does not have one entry per row of `rows`.
    pub fn new(rows: CsrMatrix, targets: Array1<f64>) -> Self {
        assert_eq!(
            targets.len(),
            rows.num_rows,
            "one target per constraint row is required"
        );
        let state = Array1::zeros(rows.num_cols);
        Self {
            rows,
            targets,
            state,
        }
    }

    /// Build from per-row lists of `(col, weight)` pairs
    pub fn from_rows(num_cols: usize, rows: &[Vec<(usize, f64)>], targets: Array1<f64>) -> Self {
        let triplets = rows
            .iter()
            .enumerate()
            .flat_map(|(i, row)| row.iter().map(move |&(j, w)| (i, j, w)))
            .collect();
        Self::new(
            CsrMatrix::from_triplets(rows.len(), num_cols, triplets),
            targets,
        )
    }

    /// A single row constraining the sum of `n` unknowns to `target`
    pub fn sum(n: usize, target: f64) -> Self {
        let row: Vec<(usize, f64)> = (0..n).map(|j| (j, 1.0)).collect();
        Self::from_rows(n, &[row], Array1::from_elem(1, target))
    }

    /// No constraints at all over `n` unknowns
    pub fn empty(n: usize) -> Self {
        Self::new(CsrMatrix::new(0, n), Array1::zeros(0))
    }

    /// Constraint block `B`
    pub fn matrix(&self) -> &CsrMatrix {
        &self.rows
    }

    pub fn state(&self) -> &Array1<f64> {
        &self.state
    }

    /// Set the point at which the constraint functions are evaluated
    pub fn set_state(&mut self, state: Array1<f64>) {
        assert_eq!(state.len(), self.rows.num_cols, "state size mismatch");
        self.state = state;
    }

    pub fn set_targets(&mut self, targets: Array1<f64>) {
        assert_eq!(targets.len(), self.rows.num_rows, "targets size mismatch");
        self.targets = targets;
    }

    /// Constraints seen through a prolongation: `B P`, acting on coarse unknowns.
    ///
    /// Coarse levels solve for corrections, so targets and state start at zero.
    pub fn coarsened(&self, prolongation: &Prolongation) -> Self {
        let rows = self.rows.matmul(prolongation.matrix());
        let targets = Array1::zeros(rows.num_rows);
        Self::new(rows, targets)
    }
}

impl DomainConstraints for LinearConstraints {
    fn num_constraint_rows(&self) -> usize {
        self.rows.num_rows
    }

    fn num_expected_cols(&self) -> usize {
        self.rows.num_cols
    }

    fn add_triplets(&self, triplets: &mut Vec<Triplet>) {
        triplets.extend(self.rows.triplets());
    }

    fn set_target_values(&self, targets: &mut Array1<f64>) {
        targets.assign(&self.targets);
    }

    fn negative_constraint_values(&self, b: &mut Array1<f64>, targets: &Array1<f64>) {
        let current = self.rows.matvec(&self.state);
        b.assign(&(targets - &current));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};

    #[test]
    fn test_sum_constraint_end_to_end() {
        let target = 6.0;
        let mut c = LinearConstraints::sum(3, target);
        c.set_state(array![1.0, 2.0, 0.5]);

        let mut triplets = Vec::new();
        c.add_triplets(&mut triplets);
        assert_eq!(triplets, vec![(0, 0, 1.0), (0, 1, 1.0), (0, 2, 1.0)]);

        let mut block = CsrMatrix::default();
        c.fill_constraint_matrix(&mut block);
        assert_eq!(block.to_dense(), array![[1.0, 1.0, 1.0]]);

        let mut saddle = Array2::zeros((4, 4));
        c.fill_dense_block(&mut saddle);
        assert_eq!(saddle.row(3).to_vec(), vec![1.0, 1.0, 1.0, 0.0]);
        assert_eq!(saddle.column(3).to_vec(), vec![1.0, 1.0, 1.0, 0.0]);

        let mut targets = Array1::zeros(0);
        c.update_target_values(&mut targets);
        assert_eq!(targets, array![target]);

        let mut b = Array1::zeros(4);
        let norm = c.fill_constraint_values(&mut b, &targets, 3);
        assert_relative_eq!(b[3], target - 3.5);
        assert_relative_eq!(norm, 2.5);
        assert_eq!(b.slice(ndarray::s![..3]).to_vec(), vec![0.0; 3]);
    }

    #[test]
    fn test_satisfied_constraints_have_zero_residual() {
        let mut c = LinearConstraints::from_rows(
            3,
            &[vec![(0, 1.0), (2, -1.0)], vec![(1, 2.0)]],
            array![1.0, 4.0],
        );
        c.set_state(array![3.0, 2.0, 2.0]);

        let mut targets = Array1::zeros(2);
        c.update_target_values(&mut targets);
        let mut b = Array1::from_elem(2, 1.0);
        assert_relative_eq!(c.fill_constraint_values(&mut b, &targets, 0), 0.0);
    }

    #[test]
    fn test_coarsened_rows() {
        let c = LinearConstraints::sum(5, 2.0);
        let p = Prolongation::linear_interpolation(5).unwrap();
        let coarse = c.coarsened(&p);

        assert_eq!(coarse.num_constraint_rows(), 1);
        assert_eq!(coarse.num_expected_cols(), 3);
        // column sums of linear interpolation on 5 -> 3 nodes
        let dense = coarse.matrix().to_dense();
        assert_relative_eq!(dense[[0, 0]], 1.5);
        assert_relative_eq!(dense[[0, 1]], 2.0);
        assert_relative_eq!(dense[[0, 2]], 1.5);

        let mut targets = Array1::zeros(0);
        coarse.update_target_values(&mut targets);
        assert_eq!(targets, array![0.0]);
    }

    #[test]
    fn test_empty_constraints() {
        let c = LinearConstraints::empty(4);
        assert_eq!(c.saddle_num_rows(), 4);
        let mut targets = Array1::from_elem(2, 1.0);
        c.update_target_values(&mut targets);
        assert!(targets.is_empty());
    }
}
