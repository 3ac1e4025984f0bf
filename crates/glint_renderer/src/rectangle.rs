//! Finite plane in local XY, facing +Z.

use glint_math::{Aabb, Interval, Ray, Vec3};
use serde::{Deserialize, Serialize};

use crate::LocalHit;

/// Half-thickness given to a rectangle's bounding box so the slab test
/// never sees a zero-width box.
pub const RECTANGLE_THICKNESS: f32 = 1e-4;

/// A `width` x `height` rectangle centred on the local origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Intersect a local-space ray with the z = 0 plane, then bounds-check.
    ///
    /// The edges are inclusive. A ray parallel to the plane yields a
    /// non-finite `t` and misses; a NaN coordinate fails both comparisons
    /// and misses as well.
    pub fn hit_local(&self, ray: &Ray, ray_t: Interval) -> Option<LocalHit> {
        let t = -ray.origin().z / ray.direction().z;
        if !ray_t.surrounds(t) {
            return None;
        }

        let point = ray.at(t);
        let half_w = self.width * 0.5;
        let half_h = self.height * 0.5;
        let inside = point.x.abs() <= half_w && point.y.abs() <= half_h;
        if !inside {
            return None;
        }

        let u = if self.width > 0.0 { (point.x + half_w) / self.width } else { 0.5 };
        let v = if self.height > 0.0 { (point.y + half_h) / self.height } else { 0.5 };

        Some(LocalHit {
            t,
            point: Vec3::new(point.x, point.y, 0.0),
            outward_normal: Vec3::Z,
            u,
            v,
        })
    }

    pub fn local_bounds(&self) -> Aabb {
        Aabb::from_center(
            Vec3::ZERO,
            Vec3::new(self.width * 0.5, self.height * 0.5, RECTANGLE_THICKNESS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn any_t() -> Interval {
        Interval::new(0.001, f32::INFINITY)
    }

    #[test]
    fn test_rectangle_hit_centre() {
        let rect = Rectangle::new(2.0, 1.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 3.0), -Vec3::Z);

        let hit = rect.hit_local(&ray, any_t()).unwrap();
        assert!((hit.t - 3.0).abs() < 1e-6);
        assert_eq!(hit.outward_normal, Vec3::Z);
        assert!((hit.u - 0.5).abs() < 1e-6);
        assert!((hit.v - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_rectangle_uv_spans_extent() {
        let rect = Rectangle::new(2.0, 4.0);
        let ray = Ray::new(Vec3::new(-0.5, 1.0, 1.0), -Vec3::Z);

        let hit = rect.hit_local(&ray, any_t()).unwrap();
        assert!((hit.u - 0.25).abs() < 1e-6);
        assert!((hit.v - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_rectangle_miss_outside_extent() {
        let rect = Rectangle::new(1.0, 1.0);
        let ray = Ray::new(Vec3::new(0.6, 0.0, 1.0), -Vec3::Z);
        assert!(rect.hit_local(&ray, any_t()).is_none());
    }

    #[test]
    fn test_rectangle_parallel_ray_misses() {
        let rect = Rectangle::new(1.0, 1.0);
        let in_plane = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::X);
        let above = Ray::new(Vec3::new(-5.0, 0.0, 1.0), Vec3::X);
        assert!(rect.hit_local(&in_plane, any_t()).is_none());
        assert!(rect.hit_local(&above, any_t()).is_none());
    }

    #[test]
    fn test_rectangle_exact_corner_is_inclusive() {
        let rect = Rectangle::new(2.0, 2.0);
        let ray = Ray::new(Vec3::new(1.0, 1.0, 1.0), -Vec3::Z);

        let hit = rect.hit_local(&ray, any_t()).unwrap();
        assert!(hit.u.is_finite() && hit.v.is_finite());
        assert!((hit.u - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rectangle_bounds_have_thickness() {
        let bounds = Rectangle::new(2.0, 2.0).local_bounds();
        assert!(bounds.size().z > 0.0);
        assert!(!bounds.is_empty());
    }
}
