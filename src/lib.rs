pub mod analysis;
pub mod config;
pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod scoring;
pub mod tree;

pub use config::ParameterSet;
pub use error::{CaloGeoError, Result};
pub use tree::VolumeTree;
