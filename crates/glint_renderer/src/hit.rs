//! Ray-object intersection records.

use glint_math::{Direction3, Point3, Ray};

use crate::{MaterialId, PrimitiveId};

/// Record of a ray-object intersection, returned by value from every
/// intersection query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    /// Distance along the ray
    pub t: f32,
    /// World-space point of intersection
    pub point: Point3,
    /// Surface normal at intersection (always points against the ray)
    pub normal: Direction3,
    /// Whether the ray hit the side the outward normal points toward
    pub front_face: bool,
    /// UV texture coordinates
    pub u: f32,
    pub v: f32,
    /// Material at the intersection point
    pub material: MaterialId,
    /// The primitive that was hit
    pub primitive: PrimitiveId,
}

/// Intersection found in a shape's local space, before promotion to world
/// space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalHit {
    pub t: f32,
    pub point: Point3,
    /// Geometric normal pointing out of the surface
    pub outward_normal: Direction3,
    pub u: f32,
    pub v: f32,
}

/// Which side of a surface was hit, and the normal facing the ray.
///
/// If the ray and the outward normal point the same way we're inside.
#[inline]
pub fn face_normal(ray: &Ray, outward_normal: Direction3) -> (bool, Direction3) {
    let front_face = ray.direction().dot(outward_normal) < 0.0;
    let normal = if front_face {
        outward_normal
    } else {
        -outward_normal
    };
    (front_face, normal)
}
