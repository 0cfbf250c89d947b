use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::error::Result;
use crate::geometry::Material;
use crate::tree::{VolumeId, VolumeTree};

/// Cubic millimetres per cubic centimetre.
const MM3_PER_CM3: f64 = 1000.0;

/// Volume and mass of one material over the whole detector.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialUsage {
    pub material: Material,
    /// Physical instances made of this material.
    pub instances: usize,
    /// Volume in mm3, net of daughter volumes.
    pub volume: f64,
    /// Mass in g.
    pub mass: f64,
    /// Birks constant in mm/MeV, for scintillators.
    pub birks_constant: Option<f64>,
    /// Mass in g of each mixture constituent, by reference name.
    pub constituents: Vec<(&'static str, f64)>,
}

/// Sums the net volume and mass of every material in the tree.
///
/// A volume's own material fills its shape minus the shapes of its daughters.
/// Rows are ordered by material.
#[derive(Debug, Default)]
pub struct MaterialBudget;

impl MaterialBudget {
    /// Creates a new `MaterialBudget` query.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if a placement refers to a missing volume.
    pub fn execute(&self, tree: &VolumeTree) -> Result<Vec<MaterialUsage>> {
        let mut net_volume: HashMap<VolumeId, f64> = HashMap::new();
        for (id, node) in tree.volumes() {
            let mut volume = node.shape.volume();
            for placement in &node.children {
                volume -= tree.volume(placement.volume)?.shape.volume();
            }
            net_volume.insert(id, volume);
        }

        let mut totals: BTreeMap<Material, (usize, f64)> = BTreeMap::new();
        tree.walk(|visit| {
            let volume = visit
                .path
                .last()
                .and_then(|step| net_volume.get(&step.volume))
                .copied()
                .unwrap_or(0.0);
            let entry = totals.entry(visit.node.material).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += volume;
        })?;

        let usage: Vec<MaterialUsage> = totals
            .into_iter()
            .map(|(material, (instances, volume))| {
                let mass = volume / MM3_PER_CM3 * material.density();
                MaterialUsage {
                    material,
                    instances,
                    volume,
                    mass,
                    birks_constant: material.birks_constant(),
                    constituents: material
                        .composition()
                        .iter()
                        .map(|&(name, fraction)| (name, fraction * mass))
                        .collect(),
                }
            })
            .collect();
        for row in &usage {
            debug!(
                material = %row.material,
                instances = row.instances,
                mass_g = row.mass,
                "material budget"
            );
        }
        Ok(usage)
    }
}
