use tracing::{info, warn};

use crate::config::ParameterSet;
use crate::error::{Result, TreeError};
use crate::geometry::{BoxShape, Material};
use crate::math::{Aabb, Vector3};
use crate::operations::query::FindOverlaps;
use crate::tree::{Placement, VolumeKey, VolumeNode, VolumeStore, VolumeTree};

use super::{BuildBlocks, BuildTowers};

/// Builds the complete calorimeter geometry from a parameter set.
///
/// The parameters are validated before any volume is created. The tower
/// grid and the block grid are laid out into one store, then wrapped in a
/// vacuum world box sized to `world.margin` times the detector's reach from
/// the origin along each axis.
pub struct BuildDetector<'a> {
    params: &'a ParameterSet,
}

impl<'a> BuildDetector<'a> {
    /// Creates a new `BuildDetector` operation.
    #[must_use]
    pub fn new(params: &'a ParameterSet) -> Self {
        Self { params }
    }

    /// Executes the operation, returning the frozen volume tree.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the parameters are invalid, or
    /// [`TreeError::Overlap`] if `check_overlaps` is set and any sibling
    /// placements intersect.
    pub fn execute(&self) -> Result<VolumeTree> {
        self.params.validate()?;
        info!("constructing calorimeter geometry");

        let mut store = VolumeStore::new();
        let towers = BuildTowers::new(self.params).execute(&mut store)?;
        let blocks = BuildBlocks::new(self.params).execute(&mut store)?;

        let placements: Vec<Placement> = towers
            .towers
            .into_iter()
            .chain(blocks.blocks)
            .chain(blocks.horizontal_glue)
            .chain(blocks.vertical_glue)
            .collect();

        let mut detector: Option<Aabb> = None;
        for placement in &placements {
            let bounds = store
                .volume(placement.volume)?
                .shape
                .aabb()
                .translated(&placement.translation);
            detector = Some(detector.map_or(bounds, |acc| acc.union(&bounds)));
        }
        let detector = detector
            .ok_or_else(|| TreeError::VolumeNotFound("no detector volumes".into()))?;

        let margin = self.params.world.margin;
        let reach = Vector3::from_fn(|axis, _| detector.min[axis].abs().max(detector.max[axis].abs()));
        let world_half = reach * margin;
        let world = store.add_volume(VolumeNode::new(
            VolumeKey::World,
            BoxShape::new(world_half.x, world_half.y, world_half.z)?,
            Material::Vacuum,
        ))?;
        for placement in placements {
            store.place(world, placement)?;
        }

        let tree = VolumeTree::new(store, world)?;

        if self.params.check_overlaps {
            let overlaps = FindOverlaps::new().execute(&tree)?;
            for overlap in &overlaps {
                warn!(%overlap, "overlapping placements");
            }
            if let Some(first) = overlaps.first() {
                return Err(TreeError::Overlap {
                    count: overlaps.len(),
                    first: first.to_string(),
                }
                .into());
            }
        }

        info!(
            volumes = tree.volume_count(),
            placements = tree.placement_count(),
            "finished geometry construction"
        );
        Ok(tree)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{CaloGeoError, ConfigError};
    use crate::geometry::Shape;
    use crate::operations::query::{CheckContainment, ScoringLeaves};
    use crate::tree::{GridIndex, ScoringId};
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// Reference detector with a reduced fiber lattice, to keep tests fast.
    fn light_params() -> ParameterSet {
        let mut params = ParameterSet::default();
        params.ecal.fiber_rows = 6;
        params.ecal.fiber_cols = 5;
        params
    }

    #[test]
    fn reference_detector_is_overlap_free() {
        init_tracing();
        let mut params = ParameterSet::default();
        params.check_overlaps = true;
        let tree = BuildDetector::new(&params).execute().unwrap();

        let world = tree.world_node().unwrap();
        assert_eq!(world.key, VolumeKey::World);
        // 49 towers, 64 blocks, 32 horizontal and 16 vertical glue strips
        assert_eq!(world.children.len(), 49 + 64 + 32 + 16);
        assert!(CheckContainment::new().execute(&tree).unwrap().is_empty());
    }

    #[test]
    fn world_is_margin_times_reach() {
        let params = light_params();
        let tree = BuildDetector::new(&params).execute().unwrap();
        let Shape::Box(world) = &tree.world_node().unwrap().shape else {
            panic!("world must be a box");
        };
        // towers reach x = 350, z = 85 + 1426
        assert_relative_eq!(world.half_extents().x, 1.5 * 350.0, epsilon = 1e-9);
        assert_relative_eq!(world.half_extents().y, 1.5 * 3.5 * 98.897, epsilon = 1e-9);
        assert_relative_eq!(world.half_extents().z, 1.5 * 1511.0, epsilon = 1e-9);
    }

    #[test]
    fn invalid_parameters_build_nothing() {
        let mut params = light_params();
        params.ecal.fiber_radius = 1.0;
        let err = BuildDetector::new(&params).execute().unwrap_err();
        assert!(matches!(err, CaloGeoError::Config(ConfigError::Invalid { .. })));
    }

    #[test]
    fn rebuild_reproduces_identifiers() {
        let params = light_params();
        let first = ScoringLeaves::new()
            .execute(&BuildDetector::new(&params).execute().unwrap())
            .unwrap();
        let second = ScoringLeaves::new()
            .execute(&BuildDetector::new(&params).execute().unwrap())
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 49 * 62 + 64 * 30);
    }

    #[test]
    fn scoring_identifiers_are_unique() {
        let params = light_params();
        let tree = BuildDetector::new(&params).execute().unwrap();
        let leaves = ScoringLeaves::new().execute(&tree).unwrap();
        let codes: HashSet<u64> = leaves.iter().map(|leaf| leaf.id.code()).collect();
        assert_eq!(codes.len(), leaves.len());
        assert!(leaves.iter().any(|leaf| leaf.id
            == ScoringId::FiberCore {
                block: GridIndex::new(7, 7),
                row: 5,
                col: 4,
            }));
    }

    fn sampled_params() -> impl Strategy<Value = ParameterSet> {
        (
            (1_u32..5, 1_u32..6, 1.0..30.0, 0.5..6.0, 40.0..120.0, 40.0..120.0),
            (0.05..0.3, 0.05..0.3),
            (1_u32..5, 1_u32..5, 1_u32..5, 0.1..0.5, 1.0..1.6, 1.0..1.8),
            (0.05..1.0, 0.05..1.0, 0.0..3.0, 0.05..0.9, 1.0..3.0),
        )
            .prop_map(
                |(
                    (towers, layers, absorber, active, pitch_x, pitch_y),
                    (wls_frac, steel_frac),
                    (blocks, rows, cols, radius, pitch_factor, spacing_factor),
                    (glue, clearance, anchor, cladding, margin),
                )| {
                    let mut params = ParameterSet::default();
                    params.hcal.tower_count = towers;
                    params.hcal.layer_count = layers;
                    params.hcal.absorber_thickness = absorber;
                    params.hcal.active_thickness = active;
                    params.hcal.pitch_x = pitch_x;
                    params.hcal.pitch_y = pitch_y;
                    params.hcal.wls_thickness = wls_frac * pitch_x;
                    params.hcal.steel_thickness = steel_frac * pitch_y;

                    let ecal = &mut params.ecal;
                    ecal.block_count = blocks;
                    ecal.fiber_rows = rows;
                    ecal.fiber_cols = cols;
                    ecal.fiber_radius = radius;
                    ecal.fiber_pitch = 2.0 * radius * pitch_factor + 0.01;
                    ecal.fiber_row_spacing = 2.0 * radius * spacing_factor;
                    ecal.fiber_offset_x = radius + 0.01;
                    ecal.fiber_offset_y = radius + 0.01;
                    ecal.block_x = 2.0 * ecal.fiber_offset_x
                        + f64::from(cols) * ecal.fiber_pitch
                        + 0.5;
                    ecal.block_y = 2.0 * ecal.fiber_offset_y
                        + f64::from(rows) * ecal.fiber_row_spacing
                        + 0.5;
                    ecal.thickness = 10.0 + absorber;
                    ecal.glue_thickness = glue;
                    ecal.clearance_gap = clearance;
                    ecal.anchor_towers = anchor;
                    ecal.cladding_fraction = cladding;
                    params.world.margin = margin;
                    params
                },
            )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn sampled_layouts_are_valid(params in sampled_params()) {
            let tree = BuildDetector::new(&params).execute().unwrap();

            let overlaps = FindOverlaps::new().execute(&tree).unwrap();
            prop_assert!(overlaps.is_empty(), "{:?}", overlaps.first());

            let escapes = CheckContainment::new().execute(&tree).unwrap();
            prop_assert!(escapes.is_empty(), "{:?}", escapes.first());

            let leaves = ScoringLeaves::new().execute(&tree).unwrap();
            let n = params.hcal.tower_count;
            let m = params.ecal.block_count;
            let expected = n * n * params.hcal.layer_count
                + m * m * params.ecal.fibers_per_block();
            prop_assert_eq!(leaves.len(), expected as usize);
            let codes: HashSet<u64> = leaves.iter().map(|leaf| leaf.id.code()).collect();
            prop_assert_eq!(codes.len(), leaves.len());
        }
    }
}
