use crate::error::ConfigError;
use crate::math::TOLERANCE;

use super::{EcalParameters, HcalParameters, ParameterSet, WorldParameters};

/// Largest tower/block count representable in a packed scoring identifier.
pub(crate) const MAX_GRID_COUNT: u32 = 0x0FFF;

/// Largest layer/row/column count representable in a packed scoring identifier.
pub(crate) const MAX_SUB_COUNT: u32 = 0xFFFF;

/// Validates a complete parameter set.
///
/// Checks that:
/// - every length is strictly positive and finite
/// - every count is at least one and fits the identifier packing
/// - shims are thinner than the tower pitch
/// - fibers in the staggered lattice never touch and the lattice fits its block
/// - the world margin leaves the detector fully contained
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] listing every violation found.
pub fn validate(params: &ParameterSet) -> Result<(), ConfigError> {
    let mut violations = Vec::new();

    validate_hcal(&params.hcal, &mut violations);
    validate_ecal(&params.ecal, &mut violations);
    validate_world(&params.world, &mut violations);

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Invalid { violations })
    }
}

fn positive(name: &str, value: f64, violations: &mut Vec<String>) {
    if !(value.is_finite() && value > TOLERANCE) {
        violations.push(format!("{name} = {value} must be a positive length"));
    }
}

fn count(name: &str, value: u32, max: u32, violations: &mut Vec<String>) {
    if value == 0 || value > max {
        violations.push(format!("{name} = {value} must lie in [1, {max}]"));
    }
}

fn validate_hcal(hcal: &HcalParameters, violations: &mut Vec<String>) {
    count("hcal.tower_count", hcal.tower_count, MAX_GRID_COUNT, violations);
    count("hcal.layer_count", hcal.layer_count, MAX_SUB_COUNT, violations);
    positive("hcal.absorber_thickness", hcal.absorber_thickness, violations);
    positive("hcal.active_thickness", hcal.active_thickness, violations);
    positive("hcal.pitch_x", hcal.pitch_x, violations);
    positive("hcal.pitch_y", hcal.pitch_y, violations);
    positive("hcal.wls_thickness", hcal.wls_thickness, violations);
    positive("hcal.steel_thickness", hcal.steel_thickness, violations);

    if hcal.wls_thickness >= hcal.pitch_x - TOLERANCE {
        violations.push(format!(
            "hcal.wls_thickness = {} must be smaller than hcal.pitch_x = {}",
            hcal.wls_thickness, hcal.pitch_x
        ));
    }
    if hcal.steel_thickness >= hcal.pitch_y - TOLERANCE {
        violations.push(format!(
            "hcal.steel_thickness = {} must be smaller than hcal.pitch_y = {}",
            hcal.steel_thickness, hcal.pitch_y
        ));
    }
}

fn validate_ecal(ecal: &EcalParameters, violations: &mut Vec<String>) {
    count("ecal.block_count", ecal.block_count, MAX_GRID_COUNT, violations);
    count("ecal.fiber_rows", ecal.fiber_rows, MAX_SUB_COUNT, violations);
    count("ecal.fiber_cols", ecal.fiber_cols, MAX_SUB_COUNT, violations);
    positive("ecal.block_x", ecal.block_x, violations);
    positive("ecal.block_y", ecal.block_y, violations);
    positive("ecal.thickness", ecal.thickness, violations);
    positive("ecal.glue_thickness", ecal.glue_thickness, violations);
    positive("ecal.clearance_gap", ecal.clearance_gap, violations);
    positive("ecal.fiber_radius", ecal.fiber_radius, violations);
    positive("ecal.fiber_pitch", ecal.fiber_pitch, violations);
    positive("ecal.fiber_row_spacing", ecal.fiber_row_spacing, violations);
    positive("ecal.fiber_offset_x", ecal.fiber_offset_x, violations);
    positive("ecal.fiber_offset_y", ecal.fiber_offset_y, violations);

    if !ecal.anchor_towers.is_finite() {
        violations.push(format!(
            "ecal.anchor_towers = {} must be finite",
            ecal.anchor_towers
        ));
    }
    if !(ecal.cladding_fraction > 0.0 && ecal.cladding_fraction < 1.0) {
        violations.push(format!(
            "ecal.cladding_fraction = {} must lie in (0, 1)",
            ecal.cladding_fraction
        ));
    }

    let r = ecal.fiber_radius;
    if r >= ecal.fiber_pitch / 2.0 {
        violations.push(format!(
            "ecal.fiber_radius = {r} must be smaller than half of ecal.fiber_pitch = {}",
            ecal.fiber_pitch
        ));
    }
    if ecal.fiber_rows > 1 && (ecal.fiber_pitch / 2.0).hypot(ecal.fiber_row_spacing) < 2.0 * r {
        violations.push(format!(
            "fibers in adjacent staggered rows overlap (row spacing {}, pitch {}, radius {r})",
            ecal.fiber_row_spacing, ecal.fiber_pitch
        ));
    }
    if ecal.fiber_rows > 2 && ecal.fiber_row_spacing < r {
        violations.push(format!(
            "fibers two rows apart overlap (row spacing {}, radius {r})",
            ecal.fiber_row_spacing
        ));
    }

    let half_x = ecal.block_x / 2.0;
    let half_y = ecal.block_y / 2.0;
    let stagger = if ecal.fiber_rows > 1 {
        ecal.fiber_pitch / 2.0
    } else {
        0.0
    };
    let lattice_max_x = half_x - ecal.fiber_offset_x + r;
    let lattice_min_x = half_x
        - ecal.fiber_offset_x
        - stagger
        - f64::from(ecal.fiber_cols.saturating_sub(1)) * ecal.fiber_pitch
        - r;
    let lattice_max_y = half_y - ecal.fiber_offset_y + r;
    let lattice_min_y = half_y
        - ecal.fiber_offset_y
        - f64::from(ecal.fiber_rows.saturating_sub(1)) * ecal.fiber_row_spacing
        - r;
    if lattice_max_x > half_x + TOLERANCE || lattice_min_x < -half_x - TOLERANCE {
        violations.push(format!(
            "fiber lattice spans x in [{lattice_min_x}, {lattice_max_x}], outside the block half width {half_x}"
        ));
    }
    if lattice_max_y > half_y + TOLERANCE || lattice_min_y < -half_y - TOLERANCE {
        violations.push(format!(
            "fiber lattice spans y in [{lattice_min_y}, {lattice_max_y}], outside the block half height {half_y}"
        ));
    }
}

fn validate_world(world: &WorldParameters, violations: &mut Vec<String>) {
    if !(world.margin.is_finite() && world.margin >= 1.0) {
        violations.push(format!(
            "world.margin = {} must be at least 1",
            world.margin
        ));
    }
}
