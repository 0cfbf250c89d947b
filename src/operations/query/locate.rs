use crate::error::Result;
use crate::math::Point3;
use crate::tree::{PathStep, ScoringId, VolumeKey, VolumeTree};

/// The deepest volume instance containing a point.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    /// Touchable path from the world to the containing instance.
    pub path: Vec<PathStep>,
    /// Key of the containing volume.
    pub key: VolumeKey,
    /// The point in the containing volume's local frame.
    pub local: Point3,
    /// Scoring identifier when the containing volume is sensitive.
    pub scoring: Option<ScoringId>,
}

/// Finds which volume instance contains a world point.
///
/// Descends from the world, entering the first daughter whose shape contains
/// the point; on a shared face the earlier placement wins.
#[derive(Debug, Clone)]
pub struct Locate {
    point: Point3,
}

impl Locate {
    /// Creates a new `Locate` query.
    #[must_use]
    pub fn new(point: Point3) -> Self {
        Self { point }
    }

    /// Executes the query. Returns `None` if the point is outside the world.
    ///
    /// # Errors
    ///
    /// Returns an error if a placement refers to a missing volume.
    pub fn execute(&self, tree: &VolumeTree) -> Result<Option<Location>> {
        let mut node = tree.world_node()?;
        if !node.shape.contains_point(&self.point) {
            return Ok(None);
        }

        let mut path = vec![PathStep {
            volume: tree.world(),
            copy_number: 0,
        }];
        let mut local = self.point;
        loop {
            let mut next = None;
            for placement in &node.children {
                let daughter = tree.volume(placement.volume)?;
                let daughter_local = local - placement.translation;
                if daughter.shape.contains_point(&daughter_local) {
                    next = Some((placement, daughter, daughter_local));
                    break;
                }
            }
            let Some((placement, daughter, daughter_local)) = next else {
                break;
            };
            path.push(PathStep {
                volume: placement.volume,
                copy_number: placement.copy_number,
            });
            node = daughter;
            local = daughter_local;
        }

        let scoring = node
            .sensitive
            .as_ref()
            .and_then(|sensitive| sensitive.scoring_id(&path));
        Ok(Some(Location {
            path,
            key: node.key,
            local,
            scoring,
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ParameterSet;
    use crate::math::Vector3;
    use crate::operations::creation::{BuildBlocks, BuildDetector, BuildTowers};
    use crate::tree::GridIndex;

    fn params() -> ParameterSet {
        let mut params = ParameterSet::default();
        params.ecal.fiber_rows = 8;
        params.ecal.fiber_cols = 6;
        params
    }

    fn locate(tree: &VolumeTree, point: Point3) -> Location {
        Locate::new(point).execute(tree).unwrap().unwrap()
    }

    #[test]
    fn point_in_active_plate() {
        let params = params();
        let tree = BuildDetector::new(&params).execute().unwrap();
        let centre = BuildTowers::new(&params).tower_center(GridIndex::new(3, 3));
        // front face of the tower, then 5 layers plus 21.5 mm into the sixth
        let z = centre.z - 713.0 + 5.0 * 23.0 + 21.5;
        let location = locate(&tree, Point3::new(10.0, 10.0, z));
        assert_eq!(location.key, VolumeKey::Active(GridIndex::new(3, 3)));
        assert_eq!(
            location.scoring,
            Some(ScoringId::TowerActive {
                tower: GridIndex::new(3, 3),
                layer: 5,
            })
        );
        assert_eq!(location.path.len(), 5);
    }

    #[test]
    fn point_in_absorber_is_not_scored() {
        let params = params();
        let tree = BuildDetector::new(&params).execute().unwrap();
        let centre = BuildTowers::new(&params).tower_center(GridIndex::new(1, 2));
        let z = centre.z - 713.0 + 10.0;
        let location = locate(&tree, Point3::new(centre.x, centre.y, z));
        assert_eq!(location.key, VolumeKey::Absorber(GridIndex::new(1, 2)));
        assert_eq!(location.scoring, None);
    }

    #[test]
    fn point_in_shims() {
        let params = params();
        let tree = BuildDetector::new(&params).execute().unwrap();
        let builder = BuildTowers::new(&params);

        let centre = builder.tower_center(GridIndex::new(1, 0));
        let wls = locate(&tree, Point3::new(centre.x - 48.0, centre.y, centre.z));
        assert_eq!(wls.key, VolumeKey::WlsShim(GridIndex::new(1, 0)));

        let centre = builder.tower_center(GridIndex::new(0, 1));
        let steel = locate(&tree, Point3::new(centre.x + 10.0, centre.y + 49.0, centre.z));
        assert_eq!(steel.key, VolumeKey::SteelShim(GridIndex::new(0, 1)));

        // the outer boundary has no shim, only the empty tower envelope
        let centre = builder.tower_center(GridIndex::new(0, 0));
        let edge = locate(&tree, Point3::new(centre.x - 48.0, centre.y, centre.z));
        assert_eq!(edge.key, VolumeKey::Tower(GridIndex::new(0, 0)));
    }

    #[test]
    fn point_in_fiber_core() {
        let params = params();
        let tree = BuildDetector::new(&params).execute().unwrap();
        let block = BuildBlocks::new(&params).block_center(GridIndex::new(4, 6));
        let fiber = BuildBlocks::fiber_center(&params.ecal, 3, 2);
        let core = locate(&tree, Point3::from(block + fiber));
        assert_eq!(core.key, VolumeKey::FiberCore(GridIndex::new(4, 6)));
        assert_eq!(
            core.scoring,
            Some(ScoringId::FiberCore {
                block: GridIndex::new(4, 6),
                row: 3,
                col: 2,
            })
        );
        assert_eq!(core.path.last().unwrap().copy_number, 3 * 6 + 2);

        let cladding = locate(&tree, Point3::from(block + fiber + Vector3::new(0.23, 0.0, 0.0)));
        assert_eq!(cladding.key, VolumeKey::FiberCladding(GridIndex::new(4, 6)));
        assert_eq!(cladding.scoring, None);
    }

    #[test]
    fn point_in_block_bulk_and_outside_world() {
        let params = params();
        let tree = BuildDetector::new(&params).execute().unwrap();
        let block = BuildBlocks::new(&params).block_center(GridIndex::new(0, 0));
        // far corner of the block, away from the small lattice
        let bulk = locate(&tree, Point3::new(block.x - 20.0, block.y - 20.0, 0.0));
        assert_eq!(bulk.key, VolumeKey::Block(GridIndex::new(0, 0)));

        assert!(Locate::new(Point3::new(1e6, 0.0, 0.0))
            .execute(&tree)
            .unwrap()
            .is_none());
    }
}
