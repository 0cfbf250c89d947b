use crate::math::{Aabb, Point3};

use super::key::ScoringId;
use super::node::{VolumeId, VolumeNode};

/// One level of a touchable path: a volume and the copy number it was placed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    pub volume: VolumeId,
    pub copy_number: u32,
}

/// A physical volume instance reached during a depth-first walk.
#[derive(Debug)]
pub struct Visit<'a> {
    pub node: &'a VolumeNode,
    /// Path from the world (first) to this instance (last).
    pub path: &'a [PathStep],
    /// World position of the instance's local origin.
    pub origin: Point3,
}

impl Visit<'_> {
    /// World-space bounding box of the instance.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        self.node.shape.aabb().translated(&self.origin.coords)
    }

    /// Copy number of this instance.
    #[must_use]
    pub fn copy_number(&self) -> u32 {
        self.path.last().map_or(0, |step| step.copy_number)
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Scoring identifier, if the instance is sensitive.
    #[must_use]
    pub fn scoring_id(&self) -> Option<ScoringId> {
        self.node
            .sensitive
            .as_ref()
            .and_then(|sensitive| sensitive.scoring_id(self.path))
    }
}
