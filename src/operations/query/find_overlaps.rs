use std::fmt;

use crate::error::Result;
use crate::geometry::Shape;
use crate::math::{Aabb, Vector3, TOLERANCE};
use crate::tree::{VolumeKey, VolumeTree};

/// Two sibling placements whose shapes share interior volume.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlap {
    /// The mother volume holding both placements.
    pub mother: VolumeKey,
    /// First placement: volume key and copy number.
    pub first: (VolumeKey, u32),
    /// Second placement: volume key and copy number.
    pub second: (VolumeKey, u32),
}

impl fmt::Display for Overlap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{} overlaps {}#{} inside {}",
            self.first.0, self.first.1, self.second.0, self.second.1, self.mother
        )
    }
}

/// Finds intersecting sibling placements in every logical volume.
///
/// Placements are only translated, so the check in each mother's frame holds
/// for every physical instance of that mother. Siblings are swept in order of
/// their lower x bound; parallel tubes are compared exactly (so a core and its
/// surrounding cladding do not count), everything else by bounding box.
/// Shared faces are not overlaps.
#[derive(Debug, Default)]
pub struct FindOverlaps;

struct Candidate<'a> {
    bounds: Aabb,
    shape: &'a Shape,
    translation: &'a Vector3,
    key: VolumeKey,
    copy_number: u32,
}

impl FindOverlaps {
    /// Creates a new `FindOverlaps` query.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the query, returning every overlapping pair.
    ///
    /// # Errors
    ///
    /// Returns an error if a placement refers to a missing volume.
    pub fn execute(&self, tree: &VolumeTree) -> Result<Vec<Overlap>> {
        let mut overlaps = Vec::new();
        for (_, mother) in tree.volumes() {
            if mother.children.len() < 2 {
                continue;
            }

            let mut candidates = Vec::with_capacity(mother.children.len());
            for placement in &mother.children {
                let daughter = tree.volume(placement.volume)?;
                candidates.push(Candidate {
                    bounds: daughter.shape.aabb().translated(&placement.translation),
                    shape: &daughter.shape,
                    translation: &placement.translation,
                    key: daughter.key,
                    copy_number: placement.copy_number,
                });
            }
            candidates.sort_by(|a, b| a.bounds.min.x.total_cmp(&b.bounds.min.x));

            for (n, a) in candidates.iter().enumerate() {
                for b in &candidates[n + 1..] {
                    if b.bounds.min.x >= a.bounds.max.x - TOLERANCE {
                        break;
                    }
                    if intersects(a, b) {
                        overlaps.push(Overlap {
                            mother: mother.key,
                            first: (a.key, a.copy_number),
                            second: (b.key, b.copy_number),
                        });
                    }
                }
            }
        }
        Ok(overlaps)
    }
}

fn intersects(a: &Candidate<'_>, b: &Candidate<'_>) -> bool {
    match (a.shape, b.shape) {
        (Shape::Tube(ta), Shape::Tube(tb)) => ta.intersects(tb, &(b.translation - a.translation)),
        _ => a.bounds.intersects(&b.bounds),
    }
}
