//! Detector design parameters.
//!
//! A [`ParameterSet`] is plain data: it is read once, validated, and then
//! handed by reference to the layout builders. Lengths are in millimetres.

mod validation;

pub use validation::validate;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Complete set of design parameters for both calorimeter sections.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParameterSet {
    /// Steel/scintillator sandwich section.
    pub hcal: HcalParameters,
    /// Tungsten/scintillating-fiber section.
    pub ecal: EcalParameters,
    /// World volume sizing.
    pub world: WorldParameters,
    /// Run the sibling overlap check after construction and fail on any hit.
    pub check_overlaps: bool,
}

impl ParameterSet {
    /// Parses a parameter set from TOML text and validates it.
    ///
    /// Missing sections and fields take their reference values.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this schema or the
    /// resulting parameters fail validation.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let params: Self = toml::from_str(text).map_err(ConfigError::from)?;
        params.validate()?;
        Ok(params)
    }

    /// Writes the complete parameter set, defaults included, as TOML.
    ///
    /// The output reads back through [`ParameterSet::from_toml_str`] to an
    /// equal set.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be represented in TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        let text = toml::to_string(self).map_err(ConfigError::from)?;
        Ok(text)
    }

    /// Checks every constraint, reporting all violations at once.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] listing every violated constraint.
    pub fn validate(&self) -> Result<()> {
        validate(self).map_err(Into::into)
    }
}

/// Sandwich tower grid parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HcalParameters {
    /// Towers per side of the square grid.
    pub tower_count: u32,
    /// Absorber/active layers per tower.
    pub layer_count: u32,
    pub absorber_thickness: f64,
    pub active_thickness: f64,
    /// Tower pitch along x.
    pub pitch_x: f64,
    /// Tower pitch along y.
    pub pitch_y: f64,
    /// Wavelength-shifting plate between towers along x.
    pub wls_thickness: f64,
    /// Steel plate between towers along y.
    pub steel_thickness: f64,
}

impl HcalParameters {
    /// Depth of one absorber + active layer.
    #[must_use]
    pub fn layer_thickness(&self) -> f64 {
        self.absorber_thickness + self.active_thickness
    }

    /// Depth of a full tower.
    #[must_use]
    pub fn thickness(&self) -> f64 {
        f64::from(self.layer_count) * self.layer_thickness()
    }
}

impl Default for HcalParameters {
    fn default() -> Self {
        Self {
            tower_count: 7,
            layer_count: 62,
            absorber_thickness: 20.0,
            active_thickness: 3.0,
            pitch_x: 100.0,
            pitch_y: 98.897,
            wls_thickness: 4.0,
            steel_thickness: 1.897,
        }
    }
}

/// Fiber block grid parameters.
///
/// The fiber lattice constants are design values carried over as-is; they are
/// not derived from the block size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EcalParameters {
    /// Blocks per side of the square grid.
    pub block_count: u32,
    pub block_x: f64,
    pub block_y: f64,
    /// Block depth along z.
    pub thickness: f64,
    /// Glue between the blocks of one 2x2 module.
    pub glue_thickness: f64,
    /// Gap between neighbouring 2x2 modules and around the section.
    pub clearance_gap: f64,
    /// Distance of the section's top-left corner from the origin, in tower pitches.
    pub anchor_towers: f64,
    /// Outer fiber radius.
    pub fiber_radius: f64,
    /// Cladding thickness as a fraction of the outer radius.
    pub cladding_fraction: f64,
    pub fiber_rows: u32,
    pub fiber_cols: u32,
    /// Centre-to-centre fiber distance within a row.
    pub fiber_pitch: f64,
    /// Centre-to-centre distance between rows.
    pub fiber_row_spacing: f64,
    /// Inset of the first fiber centre from the block's +x face.
    pub fiber_offset_x: f64,
    /// Inset of the first fiber row from the block's +y face.
    pub fiber_offset_y: f64,
}

impl EcalParameters {
    /// Radius separating the fiber core from its cladding.
    #[must_use]
    pub fn core_radius(&self) -> f64 {
        self.fiber_radius * (1.0 - self.cladding_fraction)
    }

    /// Fibers per block.
    #[must_use]
    pub fn fibers_per_block(&self) -> u32 {
        self.fiber_rows * self.fiber_cols
    }
}

impl Default for EcalParameters {
    fn default() -> Self {
        Self {
            block_count: 8,
            block_x: 49.85,
            block_y: 49.30,
            thickness: 170.0,
            glue_thickness: 0.1,
            clearance_gap: 0.1,
            anchor_towers: 2.0,
            fiber_radius: 0.235,
            cladding_fraction: 0.06,
            fiber_rows: 60,
            fiber_cols: 52,
            fiber_pitch: 0.95865,
            fiber_row_spacing: 0.820,
            fiber_offset_x: 0.23966,
            fiber_offset_y: 0.46,
        }
    }
}

/// World volume parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldParameters {
    /// World half extent as a multiple of the detector's reach along each axis.
    pub margin: f64,
}

impl Default for WorldParameters {
    fn default() -> Self {
        Self { margin: 1.5 }
    }
}
