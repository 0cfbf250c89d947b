use crate::error::{GeometryError, Result};
use crate::math::{Aabb, Point3, Vector3, TOLERANCE};

/// An axis-aligned box centered on the local origin.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxShape {
    half_extents: Vector3,
}

impl BoxShape {
    /// Creates a box from its half extents.
    ///
    /// # Errors
    ///
    /// Returns an error if any half extent is not positive.
    pub fn new(half_x: f64, half_y: f64, half_z: f64) -> Result<Self> {
        for (parameter, value) in [("half_x", half_x), ("half_y", half_y), ("half_z", half_z)] {
            if !(value > TOLERANCE) {
                return Err(GeometryError::NonPositive { parameter, value }.into());
            }
        }
        Ok(Self {
            half_extents: Vector3::new(half_x, half_y, half_z),
        })
    }

    /// Creates a box from its full side lengths.
    ///
    /// # Errors
    ///
    /// Returns an error if any side is not positive.
    pub fn from_size(x: f64, y: f64, z: f64) -> Result<Self> {
        Self::new(x / 2.0, y / 2.0, z / 2.0)
    }

    /// Returns the half extents.
    #[must_use]
    pub fn half_extents(&self) -> &Vector3 {
        &self.half_extents
    }

    /// Returns the full side lengths.
    #[must_use]
    pub fn size(&self) -> Vector3 {
        self.half_extents * 2.0
    }

    #[must_use]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_half_extents(self.half_extents)
    }

    #[must_use]
    pub fn volume(&self) -> f64 {
        8.0 * self.half_extents.x * self.half_extents.y * self.half_extents.z
    }

    #[must_use]
    pub fn contains_point(&self, point: &Point3) -> bool {
        self.aabb().contains_point(point)
    }
}
