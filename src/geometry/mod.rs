mod material;
mod solid_box;
mod tube;

pub use material::Material;
pub use solid_box::BoxShape;
pub use tube::Tube;

use crate::math::{Aabb, Point3};

/// A volume shape in its own local frame.
///
/// All shapes are centered on the local origin; tubes run along the local z axis.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Axis-aligned box.
    Box(BoxShape),
    /// Full-circle cylindrical shell.
    Tube(Tube),
}

impl Shape {
    /// Returns the local bounding box.
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        match self {
            Self::Box(b) => b.aabb(),
            Self::Tube(t) => t.aabb(),
        }
    }

    /// Returns the enclosed volume.
    #[must_use]
    pub fn volume(&self) -> f64 {
        match self {
            Self::Box(b) => b.volume(),
            Self::Tube(t) => t.volume(),
        }
    }

    /// Returns `true` if the local point lies inside or on the surface.
    #[must_use]
    pub fn contains_point(&self, point: &Point3) -> bool {
        match self {
            Self::Box(b) => b.contains_point(point),
            Self::Tube(t) => t.contains_point(point),
        }
    }
}

impl From<BoxShape> for Shape {
    fn from(b: BoxShape) -> Self {
        Self::Box(b)
    }
}

impl From<Tube> for Shape {
    fn from(t: Tube) -> Self {
        Self::Tube(t)
    }
}
