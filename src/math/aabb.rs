use super::{Point3, Vector3, TOLERANCE};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Creates a bounding box from two corners.
    #[must_use]
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Creates a bounding box centered at the origin with the given half extents.
    #[must_use]
    pub fn from_half_extents(half: Vector3) -> Self {
        Self {
            min: Point3::from(-half),
            max: Point3::from(half),
        }
    }

    /// Returns the center point.
    #[must_use]
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Returns the half extents along each axis.
    #[must_use]
    pub fn half_extents(&self) -> Vector3 {
        (self.max - self.min) / 2.0
    }

    /// Returns the box moved by `offset`.
    #[must_use]
    pub fn translated(&self, offset: &Vector3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Returns the smallest box enclosing both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Returns `true` if the interiors of the two boxes intersect.
    ///
    /// Boxes that only share a face (within [`TOLERANCE`]) do not intersect.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        (0..3).all(|axis| {
            self.min[axis] < other.max[axis] - TOLERANCE
                && other.min[axis] < self.max[axis] - TOLERANCE
        })
    }

    /// Returns `true` if `other` lies inside `self` (within [`TOLERANCE`]).
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        (0..3).all(|axis| {
            other.min[axis] >= self.min[axis] - TOLERANCE
                && other.max[axis] <= self.max[axis] + TOLERANCE
        })
    }

    /// Returns `true` if the point lies inside or on the boundary.
    #[must_use]
    pub fn contains_point(&self, point: &Point3) -> bool {
        (0..3).all(|axis| {
            point[axis] >= self.min[axis] - TOLERANCE && point[axis] <= self.max[axis] + TOLERANCE
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bx(min: [f64; 3], max: [f64; 3]) -> Aabb {
        Aabb::new(Point3::from(min), Point3::from(max))
    }

    #[test]
    fn touching_boxes_do_not_intersect() {
        let a = bx([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let b = bx([1.0, 0.0, 0.0], [2.0, 1.0, 1.0]);
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn overlapping_boxes_intersect() {
        let a = bx([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let b = bx([0.5, 0.5, 0.5], [2.0, 2.0, 2.0]);
        assert!(a.intersects(&b));
    }

    #[test]
    fn union_and_contains() {
        let a = bx([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let b = bx([-1.0, 2.0, 0.0], [0.5, 3.0, 4.0]);
        let u = a.union(&b);
        assert_eq!(u, bx([-1.0, 0.0, 0.0], [1.0, 3.0, 4.0]));
        assert!(u.contains(&a));
        assert!(u.contains(&b));
        assert!(!a.contains(&u));
    }

    #[test]
    fn center_and_half_extents() {
        let a = bx([-2.0, 0.0, 1.0], [2.0, 4.0, 3.0]);
        assert_eq!(a.center(), Point3::new(0.0, 2.0, 2.0));
        assert_eq!(a.half_extents(), Vector3::new(2.0, 2.0, 1.0));
        let moved = a.translated(&Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(moved.center(), Point3::new(1.0, 2.0, 2.0));
    }
}
