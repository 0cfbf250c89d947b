use std::f64::consts::PI;

use crate::error::{GeometryError, Result};
use crate::math::{Aabb, Point3, Vector3, TOLERANCE};

/// A full-circle cylindrical shell along the local z axis.
///
/// An inner radius of zero gives a solid cylinder.
#[derive(Debug, Clone, PartialEq)]
pub struct Tube {
    inner_radius: f64,
    outer_radius: f64,
    half_length: f64,
}

impl Tube {
    /// Creates a new tube.
    ///
    /// # Errors
    ///
    /// Returns an error if the outer radius or half length is not positive,
    /// or the inner radius is negative or not below the outer radius.
    pub fn new(inner_radius: f64, outer_radius: f64, half_length: f64) -> Result<Self> {
        if !(outer_radius > TOLERANCE) {
            return Err(GeometryError::NonPositive {
                parameter: "outer_radius",
                value: outer_radius,
            }
            .into());
        }
        if !(half_length > TOLERANCE) {
            return Err(GeometryError::NonPositive {
                parameter: "half_length",
                value: half_length,
            }
            .into());
        }
        if !(inner_radius >= 0.0 && inner_radius < outer_radius - TOLERANCE) {
            return Err(GeometryError::Degenerate(format!(
                "tube inner radius {inner_radius} must lie in [0, {outer_radius})"
            ))
            .into());
        }
        Ok(Self {
            inner_radius,
            outer_radius,
            half_length,
        })
    }

    #[must_use]
    pub fn inner_radius(&self) -> f64 {
        self.inner_radius
    }

    #[must_use]
    pub fn outer_radius(&self) -> f64 {
        self.outer_radius
    }

    #[must_use]
    pub fn half_length(&self) -> f64 {
        self.half_length
    }

    #[must_use]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_half_extents(Vector3::new(
            self.outer_radius,
            self.outer_radius,
            self.half_length,
        ))
    }

    #[must_use]
    pub fn volume(&self) -> f64 {
        PI * (self.outer_radius.powi(2) - self.inner_radius.powi(2)) * 2.0 * self.half_length
    }

    #[must_use]
    pub fn contains_point(&self, point: &Point3) -> bool {
        if point.z.abs() > self.half_length + TOLERANCE {
            return false;
        }
        let r = point.x.hypot(point.y);
        r >= self.inner_radius - TOLERANCE && r <= self.outer_radius + TOLERANCE
    }

    /// Returns `true` if two parallel tubes, with axes separated by `offset`
    /// in the transverse plane, share any interior volume.
    ///
    /// Concentric shells with disjoint radial bands do not intersect, and a
    /// tube sitting entirely inside the bore of another does not either.
    #[must_use]
    pub fn intersects(&self, other: &Self, offset: &Vector3) -> bool {
        let z_gap = offset.z.abs();
        if z_gap >= self.half_length + other.half_length - TOLERANCE {
            return false;
        }
        let d = offset.x.hypot(offset.y);
        if d >= self.outer_radius + other.outer_radius - TOLERANCE {
            return false;
        }
        if d + other.outer_radius <= self.inner_radius + TOLERANCE {
            return false;
        }
        d + self.outer_radius > other.inner_radius + TOLERANCE
    }
}
