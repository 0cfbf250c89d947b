use crate::geometry::{Material, Shape};
use crate::math::Vector3;

use super::key::VolumeKey;
use super::sensitive::Sensitive;

slotmap::new_key_type! {
    /// Unique identifier for a volume in the volume store.
    pub struct VolumeId;
}

/// A translated instance of a volume inside its mother volume.
///
/// Placements are owned by the mother's [`VolumeNode`]; no rotation is ever
/// applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// The placed (daughter) volume.
    pub volume: VolumeId,
    /// Position of the daughter's origin in the mother's frame.
    pub translation: Vector3,
    /// Distinguishes sibling instances of the same volume.
    pub copy_number: u32,
}

impl Placement {
    #[must_use]
    pub fn new(volume: VolumeId, translation: Vector3, copy_number: u32) -> Self {
        Self {
            volume,
            translation,
            copy_number,
        }
    }
}

/// A logical volume: shape, material and ordered daughter placements.
#[derive(Debug, Clone)]
pub struct VolumeNode {
    /// Identity of the volume.
    pub key: VolumeKey,
    pub shape: Shape,
    pub material: Material,
    /// Scoring role, if deposits in this volume are recorded.
    pub sensitive: Option<Sensitive>,
    /// Daughter placements, in placement order.
    pub children: Vec<Placement>,
}

impl VolumeNode {
    /// Creates a non-sensitive volume with no daughters.
    #[must_use]
    pub fn new(key: VolumeKey, shape: impl Into<Shape>, material: Material) -> Self {
        Self {
            key,
            shape: shape.into(),
            material,
            sensitive: None,
            children: Vec::new(),
        }
    }

    /// Marks the volume as a scoring volume.
    #[must_use]
    pub fn with_sensitive(mut self, sensitive: Sensitive) -> Self {
        self.sensitive = Some(sensitive);
        self
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
