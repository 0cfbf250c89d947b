use crate::error::Result;
use crate::math::Aabb;
use crate::tree::{ScoringId, VolumeTree};

/// A sensitive volume instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringLeaf {
    pub id: ScoringId,
    /// World-space bounding box of the instance.
    pub bounds: Aabb,
}

/// Lists every sensitive instance in depth-first placement order.
///
/// The order only depends on the parameters, so two builds from the same
/// parameter set give identical lists.
#[derive(Debug, Default)]
pub struct ScoringLeaves;

impl ScoringLeaves {
    /// Creates a new `ScoringLeaves` query.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if a placement refers to a missing volume.
    pub fn execute(&self, tree: &VolumeTree) -> Result<Vec<ScoringLeaf>> {
        let mut leaves = Vec::new();
        tree.walk(|visit| {
            if let Some(id) = visit.scoring_id() {
                leaves.push(ScoringLeaf {
                    id,
                    bounds: visit.bounds(),
                });
            }
        })?;
        Ok(leaves)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ParameterSet;
    use crate::operations::creation::BuildDetector;
    use crate::tree::GridIndex;
    use approx::assert_relative_eq;

    fn small() -> ParameterSet {
        let mut params = ParameterSet::default();
        params.hcal.tower_count = 3;
        params.hcal.layer_count = 4;
        params.ecal.block_count = 2;
        params.ecal.fiber_rows = 2;
        params.ecal.fiber_cols = 3;
        params
    }

    #[test]
    fn leaves_follow_placement_order() {
        let params = small();
        let tree = BuildDetector::new(&params).execute().unwrap();
        let leaves = ScoringLeaves::new().execute(&tree).unwrap();
        assert_eq!(leaves.len(), 9 * 4 + 4 * 6);

        assert_eq!(
            leaves[0].id,
            ScoringId::TowerActive {
                tower: GridIndex::new(0, 0),
                layer: 0,
            }
        );
        assert_eq!(
            leaves[5].id,
            ScoringId::TowerActive {
                tower: GridIndex::new(0, 1),
                layer: 1,
            }
        );
        assert_eq!(
            leaves[36].id,
            ScoringId::FiberCore {
                block: GridIndex::new(0, 0),
                row: 0,
                col: 0,
            }
        );
        assert_eq!(
            leaves.last().unwrap().id,
            ScoringId::FiberCore {
                block: GridIndex::new(1, 1),
                row: 1,
                col: 2,
            }
        );
    }

    #[test]
    fn active_plates_stack_along_z() {
        let params = small();
        let tree = BuildDetector::new(&params).execute().unwrap();
        let leaves = ScoringLeaves::new().execute(&tree).unwrap();
        let first = &leaves[0].bounds;
        let second = &leaves[1].bounds;
        assert_relative_eq!(first.max.z - first.min.z, 3.0, epsilon = 1e-9);
        assert_relative_eq!(second.min.z - first.min.z, 23.0, epsilon = 1e-9);
        // the first active plate sits behind a full absorber
        assert_relative_eq!(first.min.z, 85.0 + 20.0, epsilon = 1e-9);
    }
}
