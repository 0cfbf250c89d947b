use thiserror::Error;

/// Top-level error type for calorimeter geometry construction.
#[derive(Debug, Error)]
pub enum CaloGeoError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Errors raised while reading or validating a [`crate::ParameterSet`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse parameters: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to write parameters: {0}")]
    Write(#[from] toml::ser::Error),

    #[error("invalid parameters:\n{}", format_violations(.violations))]
    Invalid { violations: Vec<String> },
}

fn format_violations(violations: &[String]) -> String {
    violations
        .iter()
        .map(|v| format!("  - {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Errors related to shape definitions.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} must be positive")]
    NonPositive { parameter: &'static str, value: f64 },

    #[error("degenerate shape: {0}")]
    Degenerate(String),
}

/// Errors related to the volume tree.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("volume not found: {0}")]
    VolumeNotFound(String),

    #[error("duplicate volume: {0}")]
    DuplicateVolume(String),

    #[error("{count} overlapping placements, first: {first}")]
    Overlap { count: usize, first: String },

    #[error("placement escapes its mother volume: {0}")]
    NotContained(String),
}

/// Errors related to resolution analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no histogram range configured for beam energy {0} GeV")]
    UnknownBeamEnergy(f64),

    #[error("invalid histogram: {0}")]
    InvalidHistogram(String),

    #[error("no events inside the energy window [{min}, {max}]")]
    EmptyWindow { min: f64, max: f64 },
}

/// Convenience type alias for results using [`CaloGeoError`].
pub type Result<T> = std::result::Result<T, CaloGeoError>;
