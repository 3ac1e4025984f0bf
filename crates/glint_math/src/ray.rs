use crate::{Direction3, Mat4, Point3, Vec3};

/// A ray in 3D space with origin, direction and the component-wise
/// reciprocal of the direction.
///
/// The reciprocal is computed once here so slab tests against bounding
/// boxes are three multiplies per axis. Rays are immutable after
/// construction.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    origin: Point3,
    direction: Direction3,
    inv_direction: Vec3,
}

impl Ray {
    /// Create a new ray with a normalized direction.
    ///
    /// A zero-length direction falls back to +Z rather than producing NaN.
    pub fn new(origin: Point3, direction: Direction3) -> Self {
        Self::from_parts(origin, direction.try_normalize().unwrap_or(Vec3::Z))
    }

    /// Create a ray keeping the direction exactly as given.
    ///
    /// Used for rays moved into a primitive's local space, where the
    /// direction length must stay tied to the world-space ray so that
    /// hit distances mean the same thing in both spaces.
    pub fn from_parts(origin: Point3, direction: Direction3) -> Self {
        Self {
            origin,
            direction,
            inv_direction: direction.recip(),
        }
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    /// Get the direction vector of the ray.
    #[inline]
    pub fn direction(&self) -> Direction3 {
        self.direction
    }

    /// Get the precomputed reciprocal of the direction.
    #[inline]
    pub fn inv_direction(&self) -> Vec3 {
        self.inv_direction
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Point3 {
        self.origin + self.direction * t
    }

    /// Apply an affine matrix: the origin as a point, the direction as a
    /// vector. The direction is not renormalized.
    pub fn transformed(&self, matrix: &Mat4) -> Ray {
        Ray::from_parts(
            matrix.transform_point3(self.origin),
            matrix.transform_vector3(self.direction),
        )
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self::from_parts(Vec3::ZERO, Vec3::Z)
    }
}
