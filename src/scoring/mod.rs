//! Per-event energy bookkeeping keyed by scoring identifier.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::error::Result;
use crate::math::Point3;
use crate::operations::query::Locate;
use crate::tree::{GridIndex, ScoringId, VolumeTree};

/// Energy summed over one tower or one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellDeposit {
    pub index: GridIndex,
    pub edep: f64,
}

/// End-of-event totals for both sections.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSummary {
    pub ecal_total: f64,
    pub hcal_total: f64,
    /// One row per tower, row-major, including empty towers.
    pub towers: Vec<CellDeposit>,
    /// One row per block, row-major, including empty blocks.
    pub blocks: Vec<CellDeposit>,
}

/// Energy deposited in the sensitive leaves during one event.
///
/// Deposits accumulate per [`ScoringId`]; tower and block sums are range
/// queries over the ordered map.
#[derive(Debug, Clone, Default)]
pub struct EventDeposits {
    deposits: BTreeMap<ScoringId, f64>,
}

impl EventDeposits {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets every deposit, ready for the next event.
    pub fn clear(&mut self) {
        self.deposits.clear();
    }

    /// Adds `edep` to the leaf `id`.
    pub fn deposit(&mut self, id: ScoringId, edep: f64) {
        *self.deposits.entry(id).or_insert(0.0) += edep;
    }

    /// Adds `edep` to the sensitive leaf containing the world point `point`.
    ///
    /// Returns the credited identifier, or `None` when the point lies in a
    /// passive volume or outside the world.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree is inconsistent.
    pub fn deposit_at(
        &mut self,
        tree: &VolumeTree,
        point: Point3,
        edep: f64,
    ) -> Result<Option<ScoringId>> {
        let id = Locate::new(point)
            .execute(tree)?
            .and_then(|location| location.scoring);
        match id {
            Some(id) => self.deposit(id, edep),
            None => trace!(x = point.x, y = point.y, z = point.z, edep, "unscored deposit"),
        }
        Ok(id)
    }

    /// Energy in one leaf.
    #[must_use]
    pub fn energy(&self, id: ScoringId) -> f64 {
        self.deposits.get(&id).copied().unwrap_or(0.0)
    }

    /// Energy summed over every active plate of a tower.
    #[must_use]
    pub fn tower_energy(&self, tower: GridIndex) -> f64 {
        let first = ScoringId::TowerActive { tower, layer: 0 };
        let last = ScoringId::TowerActive {
            tower,
            layer: u32::MAX,
        };
        self.deposits.range(first..=last).map(|(_, e)| e).sum()
    }

    /// Energy summed over every fiber core of a block.
    #[must_use]
    pub fn block_energy(&self, block: GridIndex) -> f64 {
        let first = ScoringId::FiberCore {
            block,
            row: 0,
            col: 0,
        };
        let last = ScoringId::FiberCore {
            block,
            row: u32::MAX,
            col: u32::MAX,
        };
        self.deposits.range(first..=last).map(|(_, e)| e).sum()
    }

    /// Total energy in the tower section.
    #[must_use]
    pub fn hcal_total(&self) -> f64 {
        self.section_total(|id| matches!(id, ScoringId::TowerActive { .. }))
    }

    /// Total energy in the fiber section.
    #[must_use]
    pub fn ecal_total(&self) -> f64 {
        self.section_total(|id| matches!(id, ScoringId::FiberCore { .. }))
    }

    fn section_total(&self, in_section: impl Fn(&ScoringId) -> bool) -> f64 {
        self.deposits
            .iter()
            .filter(|(id, _)| in_section(id))
            .map(|(_, e)| e)
            .sum()
    }

    /// Number of leaves that received energy.
    #[must_use]
    pub fn len(&self) -> usize {
        self.deposits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deposits.is_empty()
    }

    /// Collapses the event into per-cell rows for an `n x n` tower grid and
    /// an `m x m` block grid.
    #[must_use]
    pub fn summary(&self, tower_count: u32, block_count: u32) -> EventSummary {
        let towers: Vec<CellDeposit> = GridIndex::grid(tower_count)
            .map(|index| CellDeposit {
                index,
                edep: self.tower_energy(index),
            })
            .collect();
        let blocks: Vec<CellDeposit> = GridIndex::grid(block_count)
            .map(|index| CellDeposit {
                index,
                edep: self.block_energy(index),
            })
            .collect();
        let summary = EventSummary {
            ecal_total: self.ecal_total(),
            hcal_total: self.hcal_total(),
            towers,
            blocks,
        };
        debug!(
            ecal = summary.ecal_total,
            hcal = summary.hcal_total,
            leaves = self.deposits.len(),
            "event summary"
        );
        summary
    }
}
