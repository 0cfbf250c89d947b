use std::fmt;

use crate::error::Result;
use crate::tree::{VolumeKey, VolumeTree};

/// A placement that reaches outside its mother, or a leaf outside the world.
#[derive(Debug, Clone, PartialEq)]
pub struct Escape {
    pub mother: VolumeKey,
    pub daughter: VolumeKey,
    pub copy_number: u32,
}

impl fmt::Display for Escape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{} escapes {}",
            self.daughter, self.copy_number, self.mother
        )
    }
}

/// Checks that every daughter fits inside its mother and that every leaf
/// instance lies inside the world.
#[derive(Debug, Default)]
pub struct CheckContainment;

impl CheckContainment {
    /// Creates a new `CheckContainment` query.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the query, returning every escaping placement.
    ///
    /// # Errors
    ///
    /// Returns an error if a placement refers to a missing volume.
    pub fn execute(&self, tree: &VolumeTree) -> Result<Vec<Escape>> {
        let mut escapes = Vec::new();

        for (_, mother) in tree.volumes() {
            let bounds = mother.shape.aabb();
            for placement in &mother.children {
                let daughter = tree.volume(placement.volume)?;
                if !bounds.contains(&daughter.shape.aabb().translated(&placement.translation)) {
                    escapes.push(Escape {
                        mother: mother.key,
                        daughter: daughter.key,
                        copy_number: placement.copy_number,
                    });
                }
            }
        }

        let world = tree.world_node()?.shape.aabb();
        tree.walk(|visit| {
            if visit.node.is_leaf() && !world.contains(&visit.bounds()) {
                escapes.push(Escape {
                    mother: VolumeKey::World,
                    daughter: visit.node.key,
                    copy_number: visit.copy_number(),
                });
            }
        })?;

        Ok(escapes)
    }
}
