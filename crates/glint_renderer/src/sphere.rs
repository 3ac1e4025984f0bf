//! Sphere primitive for ray tracing.
//!
//! The sphere is centred on its local origin; position comes from the
//! owning primitive's transform.

use glint_math::{Aabb, Interval, Ray, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::LocalHit;

/// A sphere of the given radius around the local origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub radius: f32,
}

impl Sphere {
    pub fn new(radius: f32) -> Self {
        Self {
            radius: radius.max(0.0),
        }
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn get_sphere_uv(p: Vec3) -> (f32, f32) {
        // theta: angle down from +Y
        // phi: angle around Y axis from -X
        let theta = (-p.y).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        (phi / (2.0 * PI), theta / PI)
    }

    /// Nearest intersection with a local-space ray inside `ray_t`.
    pub fn hit_local(&self, ray: &Ray, ray_t: Interval) -> Option<LocalHit> {
        let oc = -ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 || a == 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root that lies in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let point = ray.at(root);
        let outward_normal = if self.radius > 0.0 {
            point / self.radius
        } else {
            Vec3::Y
        };
        let (u, v) = Self::get_sphere_uv(outward_normal);

        Some(LocalHit {
            t: root,
            point,
            outward_normal,
            u,
            v,
        })
    }

    pub fn local_bounds(&self) -> Aabb {
        Aabb::from_center(Vec3::ZERO, Vec3::splat(self.radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_hit_from_outside() {
        let sphere = Sphere::new(1.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);

        let hit = sphere.hit_local(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((hit.t - 4.0).abs() < 1e-5);
        assert!((hit.outward_normal - -Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_sphere_hit_from_inside_takes_far_root() {
        let sphere = Sphere::new(2.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        let hit = sphere.hit_local(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((hit.t - 2.0).abs() < 1e-5);
        assert!((hit.point - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(1.0);
        let ray = Ray::new(Vec3::new(0.0, 2.0, -5.0), Vec3::Z);
        assert!(sphere.hit_local(&ray, Interval::new(0.001, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_sphere_respects_interval() {
        let sphere = Sphere::new(1.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        assert!(sphere.hit_local(&ray, Interval::new(0.001, 3.0)).is_none());
    }

    #[test]
    fn test_sphere_uv_poles() {
        let (_, v_bottom) = Sphere::get_sphere_uv(-Vec3::Y);
        let (_, v_top) = Sphere::get_sphere_uv(Vec3::Y);
        assert!(v_bottom.abs() < 1e-6);
        assert!((v_top - 1.0).abs() < 1e-6);

        let (u, v) = Sphere::get_sphere_uv(Vec3::X);
        assert!((u - 0.5).abs() < 1e-6);
        assert!((v - 0.5).abs() < 1e-6);
    }
}
