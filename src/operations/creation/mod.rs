mod build_blocks;
mod build_detector;
mod build_towers;

pub use build_blocks::{BlockLayout, BuildBlocks};
pub use build_detector::BuildDetector;
pub use build_towers::{BuildTowers, TowerLayout};
