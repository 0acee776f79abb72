//! Axis-aligned bounding boxes for scene nodes

use crate::foundation::math::{Affine3, Point3, Vector3, Vector3f};

/// Axis-Aligned Bounding Box in double precision
///
/// A box with `min > max` on any axis is empty. The default value is empty
/// and acts as the identity of [`BoundingBox::union`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner of the bounding box
    pub min: Vector3,
    /// Maximum corner of the bounding box
    pub max: Vector3,
}

impl BoundingBox {
    /// Create a new box from min and max points
    pub fn new(min: Vector3, max: Vector3) -> Self {
        Self { min, max }
    }

    /// The empty box
    pub fn empty() -> Self {
        Self {
            min: Vector3::repeat(f64::INFINITY),
            max: Vector3::repeat(f64::NEG_INFINITY),
        }
    }

    /// Create a box centered at a point with given extents
    pub fn from_center_extents(center: Vector3, extents: Vector3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Smallest box containing every point
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vector3f>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.expand_by_point(&p.cast::<f64>());
        }
        bbox
    }

    /// Whether the box contains no point
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Reset to the empty box
    pub fn clear(&mut self) {
        *self = Self::empty();
    }

    /// Get the center of the box
    pub fn center(&self) -> Vector3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the box
    pub fn extents(&self) -> Vector3 {
        (self.max - self.min) * 0.5
    }

    /// Get the full size of the box
    pub fn size(&self) -> Vector3 {
        self.max - self.min
    }

    /// Grow the box to include a point
    pub fn expand_by_point(&mut self, point: &Vector3) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// Grow the box to include another box
    pub fn expand_by(&mut self, other: &BoundingBox) {
        if other.is_empty() {
            return;
        }
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
    }

    /// Box containing both boxes
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut result = *self;
        result.expand_by(other);
        result
    }

    /// The eight corners of a non-empty box
    pub fn corners(&self) -> [Vector3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vector3::new(a.x, a.y, a.z),
            Vector3::new(b.x, a.y, a.z),
            Vector3::new(a.x, b.y, a.z),
            Vector3::new(b.x, b.y, a.z),
            Vector3::new(a.x, a.y, b.z),
            Vector3::new(b.x, a.y, b.z),
            Vector3::new(a.x, b.y, b.z),
            Vector3::new(b.x, b.y, b.z),
        ]
    }

    /// Axis-aligned box enclosing this box mapped through `transform`
    pub fn transformed(&self, transform: &Affine3) -> BoundingBox {
        if self.is_empty() {
            return *self;
        }
        let mut result = Self::empty();
        for corner in self.corners() {
            let p = transform.transform_point(&Point3::from(corner));
            result.expand_by_point(&p.coords);
        }
        result
    }

    /// Check if this box contains a point
    pub fn contains_point(&self, point: &Vector3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Check if this box intersects another box
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Test ray intersection with this box using the slab method
    ///
    /// Returns the distance to the entry point if the ray intersects, None otherwise
    pub fn intersect_ray(&self, ray_origin: &Vector3, ray_dir: &Vector3) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        let inv = |d: f64| if d != 0.0 { 1.0 / d } else { f64::INFINITY };
        let inv_dir = Vector3::new(inv(ray_dir.x), inv(ray_dir.y), inv(ray_dir.z));

        let t1 = (self.min.x - ray_origin.x) * inv_dir.x;
        let t2 = (self.max.x - ray_origin.x) * inv_dir.x;
        let t3 = (self.min.y - ray_origin.y) * inv_dir.y;
        let t4 = (self.max.y - ray_origin.y) * inv_dir.y;
        let t5 = (self.min.z - ray_origin.z) * inv_dir.z;
        let t6 = (self.max.z - ray_origin.z) * inv_dir.z;

        let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
        let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

        if tmax >= tmin && tmax >= 0.0 {
            // Zero when the origin is inside the box
            Some(tmin.max(0.0))
        } else {
            None
        }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{affine_from_isometry, affine_from_scale, constants, Isometry3};
    use approx::assert_relative_eq;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_default_is_empty() {
        let bbox = BoundingBox::default();
        assert!(bbox.is_empty());
        assert!(!bbox.contains_point(&Vector3::zeros()));
    }

    #[test]
    fn test_union_ignores_empty() {
        let a = BoundingBox::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(a.union(&BoundingBox::empty()), a);
        assert_eq!(BoundingBox::empty().union(&a), a);
    }

    #[test]
    fn test_union_of_disjoint_boxes() {
        let a = BoundingBox::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
        let b = BoundingBox::new(Vector3::new(2.0, -1.0, 0.5), Vector3::new(3.0, 0.5, 4.0));
        let u = a.union(&b);
        assert_eq!(u.min, Vector3::new(0.0, -1.0, 0.0));
        assert_eq!(u.max, Vector3::new(3.0, 1.0, 4.0));
    }

    #[test]
    fn test_from_points() {
        let points = [Vector3f::new(1.0, 2.0, 3.0), Vector3f::new(-1.0, 0.0, 5.0)];
        let bbox = BoundingBox::from_points(points.iter());
        assert_relative_eq!(bbox.min, Vector3::new(-1.0, 0.0, 3.0), epsilon = EPSILON);
        assert_relative_eq!(bbox.max, Vector3::new(1.0, 2.0, 5.0), epsilon = EPSILON);
    }

    #[test]
    fn test_transformed_by_translation() {
        let bbox = BoundingBox::from_center_extents(Vector3::zeros(), Vector3::new(1.0, 1.0, 1.0));
        let iso = Isometry3::translation(1.0, 0.0, 0.0);
        let moved = bbox.transformed(&affine_from_isometry(&iso));
        assert_relative_eq!(moved.min, Vector3::new(0.0, -1.0, -1.0), epsilon = EPSILON);
        assert_relative_eq!(moved.max, Vector3::new(2.0, 1.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_transformed_by_rotation_encloses_corners() {
        let bbox = BoundingBox::new(Vector3::zeros(), Vector3::new(2.0, 1.0, 1.0));
        let iso = Isometry3::rotation(Vector3::new(0.0, 0.0, constants::HALF_PI));
        let rotated = bbox.transformed(&affine_from_isometry(&iso));
        assert_relative_eq!(rotated.min, Vector3::new(-1.0, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(rotated.max, Vector3::new(0.0, 2.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_transformed_by_scale() {
        let bbox = BoundingBox::from_center_extents(Vector3::zeros(), Vector3::new(1.0, 1.0, 1.0));
        let scaled = bbox.transformed(&affine_from_scale(&Vector3::new(2.0, 1.0, 0.5)));
        assert_relative_eq!(scaled.max, Vector3::new(2.0, 1.0, 0.5), epsilon = EPSILON);
    }

    #[test]
    fn test_contains_and_intersects() {
        let a = BoundingBox::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(2.0, 2.0, 2.0));
        let b = BoundingBox::new(Vector3::new(1.0, 1.0, 1.0), Vector3::new(3.0, 3.0, 3.0));
        let c = BoundingBox::new(Vector3::new(5.0, 5.0, 5.0), Vector3::new(7.0, 7.0, 7.0));

        assert!(a.contains_point(&Vector3::new(0.5, 0.5, 0.5)));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_intersect_ray() {
        let bbox = BoundingBox::from_center_extents(Vector3::zeros(), Vector3::new(1.0, 1.0, 1.0));
        let hit = bbox.intersect_ray(&Vector3::new(-5.0, 0.0, 0.0), &Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(hit.unwrap_or(f64::NAN), 4.0, epsilon = EPSILON);

        let miss = bbox.intersect_ray(&Vector3::new(-5.0, 3.0, 0.0), &Vector3::new(1.0, 0.0, 0.0));
        assert!(miss.is_none());
    }
}
