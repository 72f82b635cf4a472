//! Kernel operators for the top-left saddle block

use math_saddle_solvers::{CsrMatrix, Triplet};

/// Graph Laplacian of a chain of `n` vertices plus `shift * I`
///
/// Symmetric positive definite for `shift > 0`.
pub fn path_laplacian(n: usize, shift: f64) -> CsrMatrix {
    let mut triplets: Vec<Triplet> = Vec::with_capacity(3 * n);
    for i in 0..n {
        let degree = usize::from(i > 0) + usize::from(i + 1 < n);
        triplets.push((i, i, degree as f64 + shift));
        if i + 1 < n {
            triplets.push((i, i + 1, -1.0));
            triplets.push((i + 1, i, -1.0));
        }
    }
    CsrMatrix::from_triplets(n, n, triplets)
}
