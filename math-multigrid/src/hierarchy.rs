//! Coarsening chain for geometric multigrid
//!
//! Starting from the finest domain, levels are coarsened until the vertex
//! count drops to a threshold or a level cap is reached. Every step is
//! checked for degenerate (empty) and non-monotonic results.

use crate::domain::MultigridDomain;
use crate::error::{MultigridError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Hierarchy construction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    /// Maximum number of levels, the finest included
    pub max_levels: usize,
    /// Stop coarsening once a level has at most this many vertices
    pub min_vertices: usize,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            max_levels: 10,
            min_vertices: 8,
        }
    }
}

/// Domains from finest (0) to coarsest, plus the transfer operators between them
pub struct DomainHierarchy<Mult, Op> {
    levels: Vec<Box<dyn MultigridDomain<Mult, Op>>>,
    /// `transfers[i]` maps level `i + 1` to level `i`
    transfers: Vec<Op>,
}

impl<Mult, Op> DomainHierarchy<Mult, Op> {
    /// Coarsen `finest` repeatedly according to `config`.
    pub fn build(
        finest: Box<dyn MultigridDomain<Mult, Op>>,
        config: &HierarchyConfig,
    ) -> Result<Self> {
        if finest.num_vertices() == 0 {
            return Err(MultigridError::DegenerateCoarsening { vertices: 0 });
        }

        let max_levels = config.max_levels.max(1);
        let mut levels = vec![finest];
        let mut transfers = Vec::new();

        while levels.len() < max_levels {
            let current = &levels[levels.len() - 1];
            let parent = current.num_vertices();
            if parent <= config.min_vertices {
                break;
            }

            let mut op = current.make_new_operator();
            let coarse = current.coarsen(&mut op)?;
            let child = coarse.num_vertices();

            if child == 0 {
                return Err(MultigridError::DegenerateCoarsening { vertices: parent });
            }
            if child > parent {
                return Err(MultigridError::NonMonotonicCoarsening { parent, child });
            }
            if child == parent {
                log::warn!(
                    "coarsening stalled at {} vertices after {} levels",
                    parent,
                    levels.len()
                );
                break;
            }

            transfers.push(op);
            levels.push(coarse);
        }

        let hierarchy = Self { levels, transfers };
        log::info!(
            "multigrid hierarchy: {} levels, vertices {:?}",
            hierarchy.num_levels(),
            hierarchy.vertex_counts()
        );
        Ok(hierarchy)
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn finest(&self) -> &dyn MultigridDomain<Mult, Op> {
        self.levels[0].as_ref()
    }

    pub fn coarsest(&self) -> &dyn MultigridDomain<Mult, Op> {
        self.levels[self.levels.len() - 1].as_ref()
    }

    pub fn level(&self, index: usize) -> Option<&dyn MultigridDomain<Mult, Op>> {
        self.levels.get(index).map(|d| d.as_ref())
    }

    /// Transfer operator between level `index + 1` (coarse) and `index` (fine)
    pub fn transfer(&self, index: usize) -> Option<&Op> {
        self.transfers.get(index)
    }

    /// Vertex count of every level, finest first
    pub fn vertex_counts(&self) -> Vec<usize> {
        self.levels.iter().map(|d| d.num_vertices()).collect()
    }

    /// Direct solve on the coarsest level
    pub fn solve_coarsest(&self, b: &Array1<f64>) -> Result<Array1<f64>> {
        self.coarsest().direct_solve(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::LinearConstraints;
    use crate::domain::{path_laplacian, SaddleDomain};
    use crate::projector::NullSpaceProjector;
    use crate::transfer::Prolongation;
    use math_saddle_solvers::CsrMatrix;
    use ndarray::Array2;

    fn finest(n: usize) -> Box<dyn MultigridDomain<CsrMatrix, Prolongation>> {
        Box::new(
            SaddleDomain::new(path_laplacian(n, 1.0), &LinearConstraints::sum(n, 1.0)).unwrap(),
        )
    }

    #[test]
    fn test_config_defaults_and_json() {
        let config: HierarchyConfig = serde_json::from_str(r#"{"min_vertices": 3}"#).unwrap();
        assert_eq!(config.min_vertices, 3);
        assert_eq!(config.max_levels, HierarchyConfig::default().max_levels);
    }

    #[test]
    fn test_build_until_min_vertices() {
        let config = HierarchyConfig {
            max_levels: 10,
            min_vertices: 3,
        };
        let h = DomainHierarchy::build(finest(17), &config).unwrap();

        assert_eq!(h.vertex_counts(), vec![17, 9, 5, 3]);
        assert_eq!(h.num_levels(), 4);
        for i in 0..3 {
            let p = h.transfer(i).unwrap();
            assert_eq!(p.num_fine(), h.level(i).unwrap().num_vertices());
            assert_eq!(p.num_coarse(), h.level(i + 1).unwrap().num_vertices());
        }
        assert!(h.transfer(3).is_none());
        assert!(h.level(4).is_none());
    }

    #[test]
    fn test_build_respects_max_levels() {
        let config = HierarchyConfig {
            max_levels: 2,
            min_vertices: 1,
        };
        let h = DomainHierarchy::build(finest(17), &config).unwrap();
        assert_eq!(h.vertex_counts(), vec![17, 9]);
        assert_eq!(h.coarsest().num_rows(), 10);
    }

    /// Reports a fixed vertex count for its coarse level, for driving the checks
    struct FixedCoarsening {
        vertices: usize,
        coarse_vertices: usize,
        projector: NullSpaceProjector,
    }

    impl FixedCoarsening {
        fn boxed(vertices: usize, coarse_vertices: usize) -> Box<dyn MultigridDomain<(), ()>> {
            Box::new(Self {
                vertices,
                coarse_vertices,
                projector: NullSpaceProjector::new(CsrMatrix::new(0, vertices)).unwrap(),
            })
        }
    }

    impl MultigridDomain<(), ()> for FixedCoarsening {
        fn coarsen(&self, _prolong_op: &mut ()) -> Result<Box<dyn MultigridDomain<(), ()>>> {
            Ok(Self::boxed(self.coarse_vertices, self.coarse_vertices))
        }

        fn multiplier(&self) -> &() {
            &()
        }

        fn full_matrix(&self) -> Array2<f64> {
            Array2::eye(self.vertices)
        }

        fn direct_solve(&self, b: &Array1<f64>) -> Result<Array1<f64>> {
            Ok(b.clone())
        }

        fn num_vertices(&self) -> usize {
            self.vertices
        }

        fn num_rows(&self) -> usize {
            self.vertices
        }

        fn make_new_operator(&self) {}

        fn constraint_projector(&self) -> &NullSpaceProjector {
            &self.projector
        }
    }

    #[test]
    fn test_degenerate_coarsening_rejected() {
        let err = DomainHierarchy::build(FixedCoarsening::boxed(10, 0), &HierarchyConfig::default())
            .err();
        assert_eq!(err, Some(MultigridError::DegenerateCoarsening { vertices: 10 }));
    }

    #[test]
    fn test_growing_coarsening_rejected() {
        let err = DomainHierarchy::build(FixedCoarsening::boxed(10, 12), &HierarchyConfig::default())
            .err();
        assert_eq!(
            err,
            Some(MultigridError::NonMonotonicCoarsening {
                parent: 10,
                child: 12
            })
        );
    }

    #[test]
    fn test_stalled_coarsening_stops() {
        let h = DomainHierarchy::build(FixedCoarsening::boxed(10, 10), &HierarchyConfig::default())
            .unwrap();
        assert_eq!(h.num_levels(), 1);
        let b = Array1::from_elem(10, 2.0);
        assert_eq!(h.solve_coarsest(&b).unwrap(), b);
    }

    #[test]
    fn test_empty_finest_rejected() {
        let err = DomainHierarchy::build(FixedCoarsening::boxed(0, 0), &HierarchyConfig::default())
            .err();
        assert_eq!(err, Some(MultigridError::DegenerateCoarsening { vertices: 0 }));
    }
}
