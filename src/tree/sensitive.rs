use super::key::{GridIndex, ScoringId};
use super::walk::PathStep;

/// Scoring role attached to a sensitive logical volume.
///
/// It turns the copy numbers along a touchable path into a [`ScoringId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensitive {
    /// Active plate of a tower; the layer comes from the enclosing layer placement.
    TowerActive { tower: GridIndex },
    /// Fiber core of a block; the placement copy number is `row * fiber_cols + col`.
    FiberCore { block: GridIndex, fiber_cols: u32 },
}

impl Sensitive {
    /// Resolves the identifier of the instance at the end of `path`.
    ///
    /// Returns `None` if the path is too short to carry the needed copy numbers.
    #[must_use]
    pub fn scoring_id(&self, path: &[PathStep]) -> Option<ScoringId> {
        match *self {
            Self::TowerActive { tower } => {
                let layer = path.len().checked_sub(2).map(|n| path[n].copy_number)?;
                Some(ScoringId::TowerActive { tower, layer })
            }
            Self::FiberCore { block, fiber_cols } => {
                let copy = path.last()?.copy_number;
                Some(ScoringId::FiberCore {
                    block,
                    row: copy / fiber_cols,
                    col: copy % fiber_cols,
                })
            }
        }
    }
}
