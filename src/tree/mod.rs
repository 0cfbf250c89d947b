mod key;
mod node;
mod sensitive;
mod walk;

pub use key::{GridIndex, ScoringId, VolumeKey};
pub use node::{Placement, VolumeId, VolumeNode};
pub use sensitive::Sensitive;
pub use walk::{PathStep, Visit};

use std::collections::HashMap;

use crate::error::TreeError;
use crate::math::Point3;
use slotmap::SlotMap;

/// Arena that owns all logical volumes while a detector is being built.
///
/// Volumes reference their daughters via typed IDs (generational indices).
/// Each volume is also indexed by its [`VolumeKey`].
#[derive(Debug, Default)]
pub struct VolumeStore {
    volumes: SlotMap<VolumeId, VolumeNode>,
    index: HashMap<VolumeKey, VolumeId>,
}

impl VolumeStore {
    /// Creates a new, empty volume store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a volume and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if a volume with the same key already exists.
    pub fn add_volume(&mut self, node: VolumeNode) -> Result<VolumeId, TreeError> {
        if self.index.contains_key(&node.key) {
            return Err(TreeError::DuplicateVolume(node.key.to_string()));
        }
        let key = node.key;
        let id = self.volumes.insert(node);
        self.index.insert(key, id);
        Ok(id)
    }

    /// Returns a reference to the volume, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the volume is not in the store.
    pub fn volume(&self, id: VolumeId) -> Result<&VolumeNode, TreeError> {
        self.volumes
            .get(id)
            .ok_or_else(|| TreeError::VolumeNotFound(format!("{id:?}")))
    }

    /// Returns a mutable reference to the volume, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the volume is not in the store.
    pub fn volume_mut(&mut self, id: VolumeId) -> Result<&mut VolumeNode, TreeError> {
        self.volumes
            .get_mut(id)
            .ok_or_else(|| TreeError::VolumeNotFound(format!("{id:?}")))
    }

    /// Looks up a volume by key.
    #[must_use]
    pub fn find(&self, key: &VolumeKey) -> Option<VolumeId> {
        self.index.get(key).copied()
    }

    /// Appends a daughter placement to `mother`.
    ///
    /// # Errors
    ///
    /// Returns an error if either volume is missing or the daughter is the
    /// mother itself.
    pub fn place(&mut self, mother: VolumeId, placement: Placement) -> Result<(), TreeError> {
        if placement.volume == mother {
            return Err(TreeError::NotContained(format!(
                "{} placed inside itself",
                self.volume(mother)?.key
            )));
        }
        self.volume(placement.volume)?;
        self.volume_mut(mother)?.children.push(placement);
        Ok(())
    }

    /// Number of logical volumes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }
}

/// The finished detector geometry.
///
/// Built once and read-only afterwards; it can be shared between threads
/// without synchronization. Dropping the tree releases every volume.
#[derive(Debug)]
pub struct VolumeTree {
    store: VolumeStore,
    world: VolumeId,
}

impl VolumeTree {
    /// Freezes a store into a tree rooted at `world`.
    ///
    /// # Errors
    ///
    /// Returns an error if `world` is not in the store.
    pub fn new(store: VolumeStore, world: VolumeId) -> Result<Self, TreeError> {
        store.volume(world)?;
        Ok(Self { store, world })
    }

    /// ID of the root volume.
    #[must_use]
    pub fn world(&self) -> VolumeId {
        self.world
    }

    /// Returns the root volume.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is missing, which cannot happen for a tree
    /// created through [`VolumeTree::new`].
    pub fn world_node(&self) -> Result<&VolumeNode, TreeError> {
        self.store.volume(self.world)
    }

    /// Returns a volume by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the volume is not in the tree.
    pub fn volume(&self, id: VolumeId) -> Result<&VolumeNode, TreeError> {
        self.store.volume(id)
    }

    /// Looks up a volume by key.
    #[must_use]
    pub fn find(&self, key: &VolumeKey) -> Option<VolumeId> {
        self.store.find(key)
    }

    /// Looks up a volume by key, failing if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if no volume has this key.
    pub fn get(&self, key: &VolumeKey) -> Result<&VolumeNode, TreeError> {
        let id = self
            .find(key)
            .ok_or_else(|| TreeError::VolumeNotFound(key.to_string()))?;
        self.volume(id)
    }

    /// Iterates every logical volume in arbitrary order.
    pub fn volumes(&self) -> impl Iterator<Item = (VolumeId, &VolumeNode)> {
        self.store.volumes.iter()
    }

    /// Number of logical volumes.
    #[must_use]
    pub fn volume_count(&self) -> usize {
        self.store.len()
    }

    /// Number of placements across all logical volumes.
    #[must_use]
    pub fn placement_count(&self) -> usize {
        self.store.volumes.values().map(|v| v.children.len()).sum()
    }

    /// Visits every physical volume instance depth-first, in placement order,
    /// starting with the world.
    ///
    /// # Errors
    ///
    /// Returns an error if a placement refers to a missing volume.
    pub fn walk<F>(&self, mut visit: F) -> Result<(), TreeError>
    where
        F: FnMut(&Visit<'_>),
    {
        let mut path = vec![PathStep {
            volume: self.world,
            copy_number: 0,
        }];
        self.walk_from(self.world, Point3::origin(), &mut path, &mut visit)
    }

    fn walk_from<F>(
        &self,
        id: VolumeId,
        origin: Point3,
        path: &mut Vec<PathStep>,
        visit: &mut F,
    ) -> Result<(), TreeError>
    where
        F: FnMut(&Visit<'_>),
    {
        let node = self.store.volume(id)?;
        visit(&Visit {
            node,
            path: path.as_slice(),
            origin,
        });
        for placement in &node.children {
            path.push(PathStep {
                volume: placement.volume,
                copy_number: placement.copy_number,
            });
            self.walk_from(
                placement.volume,
                origin + placement.translation,
                path,
                visit,
            )?;
            path.pop();
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{BoxShape, Material};
    use crate::math::Vector3;

    fn cell(i: u32, j: u32) -> GridIndex {
        GridIndex::new(i, j)
    }

    fn small_tree() -> VolumeTree {
        let mut store = VolumeStore::new();
        let world = store
            .add_volume(VolumeNode::new(
                VolumeKey::World,
                BoxShape::new(10.0, 10.0, 10.0).unwrap(),
                Material::Vacuum,
            ))
            .unwrap();
        let block = store
            .add_volume(VolumeNode::new(
                VolumeKey::Block(cell(0, 0)),
                BoxShape::new(1.0, 1.0, 1.0).unwrap(),
                Material::TungstenPolystyrene,
            ))
            .unwrap();
        store
            .place(world, Placement::new(block, Vector3::new(-2.0, 0.0, 0.0), 0))
            .unwrap();
        store
            .place(world, Placement::new(block, Vector3::new(2.0, 0.0, 0.0), 1))
            .unwrap();
        VolumeTree::new(store, world).unwrap()
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let mut store = VolumeStore::new();
        let node = VolumeNode::new(
            VolumeKey::World,
            BoxShape::new(1.0, 1.0, 1.0).unwrap(),
            Material::Vacuum,
        );
        store.add_volume(node.clone()).unwrap();
        assert!(matches!(
            store.add_volume(node),
            Err(TreeError::DuplicateVolume(_))
        ));
    }

    #[test]
    fn self_placement_is_rejected() {
        let mut store = VolumeStore::new();
        let world = store
            .add_volume(VolumeNode::new(
                VolumeKey::World,
                BoxShape::new(1.0, 1.0, 1.0).unwrap(),
                Material::Vacuum,
            ))
            .unwrap();
        assert!(store
            .place(world, Placement::new(world, Vector3::zeros(), 0))
            .is_err());
    }

    #[test]
    fn walk_visits_instances_in_order() {
        let tree = small_tree();
        let mut seen = Vec::new();
        tree.walk(|visit| seen.push((visit.node.key, visit.copy_number(), visit.origin.x)))
            .unwrap();
        assert_eq!(
            seen,
            vec![
                (VolumeKey::World, 0, 0.0),
                (VolumeKey::Block(cell(0, 0)), 0, -2.0),
                (VolumeKey::Block(cell(0, 0)), 1, 2.0),
            ]
        );
        assert_eq!(tree.volume_count(), 2);
        assert_eq!(tree.placement_count(), 2);
    }

    #[test]
    fn lookup_by_key() {
        let tree = small_tree();
        assert!(tree.get(&VolumeKey::Block(cell(0, 0))).is_ok());
        assert!(tree.get(&VolumeKey::Block(cell(0, 1))).is_err());
    }

    #[test]
    fn tree_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<VolumeTree>();
    }
}
