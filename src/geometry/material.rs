use std::fmt;

/// Materials used by the calorimeter volumes.
///
/// The tag carries a reference name, bulk density, Birks constant and mixture
/// fractions; optical and transport properties belong to the simulation kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Material {
    /// Galactic vacuum, used for the world and pure container volumes.
    Vacuum,
    /// Iron, standing in for the steel absorber and shims.
    Iron,
    /// Polystyrene scintillator: active plates, fiber cores, WLS shims, glue.
    Polystyrene,
    /// PMMA fiber cladding.
    Plexiglass,
    /// Tungsten powder with 3% polystyrene by mass: the ECal block absorber.
    TungstenPolystyrene,
}

impl Material {
    /// Reference name as understood by the simulation kernel's material database.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Vacuum => "G4_Galactic",
            Self::Iron => "G4_Fe",
            Self::Polystyrene => "G4_POLYSTYRENE",
            Self::Plexiglass => "G4_PLEXIGLASS",
            Self::TungstenPolystyrene => "ECalAbsorberMaterial",
        }
    }

    /// Density in g/cm3.
    #[must_use]
    pub fn density(self) -> f64 {
        match self {
            Self::Vacuum => 1e-25,
            Self::Iron => 7.874,
            Self::Polystyrene => 1.06,
            Self::Plexiglass => 1.19,
            Self::TungstenPolystyrene => 12.72,
        }
    }

    /// Birks saturation constant in mm/MeV, for scintillating materials.
    #[must_use]
    pub fn birks_constant(self) -> Option<f64> {
        match self {
            Self::Polystyrene => Some(0.2),
            _ => None,
        }
    }

    /// Mass fractions of the constituents of a mixture, by reference name.
    #[must_use]
    pub fn composition(self) -> &'static [(&'static str, f64)] {
        match self {
            Self::TungstenPolystyrene => &[("W", 0.97), ("G4_POLYSTYRENE", 0.03)],
            _ => &[],
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
