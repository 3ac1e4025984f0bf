//! Axis-aligned box built from six rectangles.
//!
//! Each face is a [`Rectangle`] with its own box-local transform. The
//! owning primitive caches the faces and intersects each one
//! independently, keeping the nearest hit.

use glint_math::{Aabb, Interval, Mat4, Ray, Transform, Vec3};
use serde::{Deserialize, Serialize};

use crate::{LocalHit, Rectangle};

/// A box of the given full size, centred on the local origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cuboid {
    pub size: Vec3,
}

/// One face of a cuboid: the rectangle and where it sits in box space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CuboidFace {
    pub rectangle: Rectangle,
    pub transform: Transform,
}

impl Cuboid {
    pub fn new(size: Vec3) -> Self {
        Self {
            size: size.max(Vec3::ZERO),
        }
    }

    /// The six faces with outward normals +X, -X, +Y, -Y, +Z, -Z.
    ///
    /// Each face basis (a, b, n) is right-handed so the rectangle's local
    /// +Z lands on the outward normal n.
    pub fn faces(&self) -> [CuboidFace; 6] {
        let s = self.size;
        let face = |a: Vec3, b: Vec3, n: Vec3, width: f32, height: f32| {
            let offset = n * (n.abs().dot(s) * 0.5);
            CuboidFace {
                rectangle: Rectangle::new(width, height),
                transform: Transform::new(Mat4::from_cols(
                    a.extend(0.0),
                    b.extend(0.0),
                    n.extend(0.0),
                    offset.extend(1.0),
                )),
            }
        };

        [
            face(Vec3::Y, Vec3::Z, Vec3::X, s.y, s.z),
            face(Vec3::Z, Vec3::Y, -Vec3::X, s.z, s.y),
            face(Vec3::Z, Vec3::X, Vec3::Y, s.z, s.x),
            face(Vec3::X, Vec3::Z, -Vec3::Y, s.x, s.z),
            face(Vec3::X, Vec3::Y, Vec3::Z, s.x, s.y),
            face(Vec3::Y, Vec3::X, -Vec3::Z, s.y, s.x),
        ]
    }

    /// Nearest hit among `faces` for a box-local ray.
    pub fn hit_faces(faces: &[CuboidFace], ray: &Ray, ray_t: Interval) -> Option<LocalHit> {
        let mut closest: Option<LocalHit> = None;
        let mut interval = ray_t;

        for face in faces {
            let face_ray = face.transform.to_local(ray);
            if let Some(hit) = face.rectangle.hit_local(&face_ray, interval) {
                interval = interval.tightened(hit.t);
                closest = Some(LocalHit {
                    t: hit.t,
                    point: face.transform.point(hit.point),
                    outward_normal: face.transform.normal(hit.outward_normal),
                    u: hit.u,
                    v: hit.v,
                });
            }
        }

        closest
    }

    pub fn local_bounds(&self) -> Aabb {
        Aabb::from_center(Vec3::ZERO, self.size * 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faces_sit_on_box_surface() {
        let cuboid = Cuboid::new(Vec3::new(2.0, 4.0, 6.0));
        let half = cuboid.size * 0.5;

        for face in cuboid.faces() {
            let centre = face.transform.point(Vec3::ZERO);
            let normal = face.transform.normal(Vec3::Z);
            // Face centre lies on the plane the normal points out of
            assert!((centre.dot(normal) - half.dot(normal.abs())).abs() < 1e-5);
            assert!((normal.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_faces_cover_each_side() {
        let cuboid = Cuboid::new(Vec3::ONE);
        let normals: Vec<Vec3> = cuboid
            .faces()
            .iter()
            .map(|f| f.transform.normal(Vec3::Z))
            .collect();

        for axis in [Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, Vec3::Z, -Vec3::Z] {
            assert!(normals.iter().any(|n| (*n - axis).length() < 1e-5));
        }
    }

    #[test]
    fn test_box_hit_takes_nearest_face() {
        let cuboid = Cuboid::new(Vec3::new(2.0, 2.0, 2.0));
        let faces = cuboid.faces();
        let ray = Ray::new(Vec3::new(0.2, 0.3, -5.0), Vec3::Z);

        let hit = Cuboid::hit_faces(&faces, &ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((hit.t - 4.0).abs() < 1e-5);
        assert!((hit.outward_normal - -Vec3::Z).length() < 1e-5);
        assert!((hit.point.z + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_box_hit_from_inside() {
        let cuboid = Cuboid::new(Vec3::new(2.0, 2.0, 2.0));
        let faces = cuboid.faces();
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);

        let hit = Cuboid::hit_faces(&faces, &ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((hit.t - 1.0).abs() < 1e-5);
        assert!((hit.outward_normal - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_box_miss() {
        let cuboid = Cuboid::new(Vec3::ONE);
        let faces = cuboid.faces();
        let ray = Ray::new(Vec3::new(3.0, 0.0, -5.0), Vec3::Z);
        assert!(Cuboid::hit_faces(&faces, &ray, Interval::new(0.001, f32::INFINITY)).is_none());
    }
}
