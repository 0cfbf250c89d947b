mod check_containment;
mod find_overlaps;
mod locate;
mod material_budget;
mod scoring_leaves;

pub use check_containment::{CheckContainment, Escape};
pub use find_overlaps::{FindOverlaps, Overlap};
pub use locate::{Locate, Location};
pub use material_budget::{MaterialBudget, MaterialUsage};
pub use scoring_leaves::{ScoringLeaf, ScoringLeaves};
