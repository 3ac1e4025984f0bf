use crate::{Mat4, Point3, Ray, Vec3};

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// Invariant: `min <= max` component-wise, except for [`Aabb::EMPTY`]
/// (`min = +inf`, `max = -inf`), which is the identity for
/// [`Aabb::surrounding`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb {
    /// The empty box. Contains nothing, surrounds into anything unchanged.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
        max: Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
    };

    /// Create an AABB from its minimum and maximum corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at `center` reaching `extent` along each axis.
    pub fn from_center(center: Point3, extent: Vec3) -> Self {
        let extent = extent.abs();
        Self {
            min: center - extent,
            max: center + extent,
        }
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            min: box0.min.min(box1.min),
            max: box0.max.max(box1.max),
        }
    }

    /// Grow the box so that it contains `p`.
    pub fn encapsulate(&mut self, p: Point3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Grow every face outward by `margin`. The empty box stays empty.
    pub fn padded(&self, margin: f32) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        Self {
            min: self.min - Vec3::splat(margin),
            max: self.max + Vec3::splat(margin),
        }
    }

    /// True for the canonical empty box (or any inverted box).
    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    /// Test if a ray intersects this AABB within `[t_min, t_max]`.
    ///
    /// Slab method using the ray's precomputed inverse direction. A NaN
    /// slab distance (ray origin exactly on a slab plane with a zero
    /// direction component) leaves the current bounds untouched.
    pub fn hit(&self, ray: &Ray, mut t_min: f32, mut t_max: f32) -> bool {
        let origin = ray.origin();
        let inv_dir = ray.inv_direction();

        for axis in 0..3 {
            let mut t0 = (self.min[axis] - origin[axis]) * inv_dir[axis];
            let mut t1 = (self.max[axis] - origin[axis]) * inv_dir[axis];
            if inv_dir[axis] < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = if t0 > t_min { t0 } else { t_min };
            t_max = if t1 < t_max { t1 } else { t_max };
            if t_max <= t_min {
                return false;
            }
        }

        true
    }

    /// Resample the box through an affine transform.
    ///
    /// Computes the bounding box of all 8 transformed corners, since a
    /// rotated box is no longer axis-aligned.
    pub fn transformed(&self, matrix: &Mat4) -> Aabb {
        if self.is_empty() {
            return *self;
        }

        let mut result = Aabb::EMPTY;
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            result.encapsulate(matrix.transform_point3(corner));
        }
        result
    }

    /// Full size along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Point3 {
        (self.min + self.max) * 0.5
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    #[test]
    fn test_aabb_from_center() {
        let aabb = Aabb::from_center(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, -0.5, 2.0));
        assert_eq!(aabb.min, Vec3::new(0.0, 1.5, 1.0));
        assert_eq!(aabb.max, Vec3::new(2.0, 2.5, 5.0));
    }

    #[test]
    fn test_aabb_surrounding_with_empty_is_identity() {
        let aabb = unit_box();
        assert_eq!(Aabb::surrounding(&Aabb::EMPTY, &aabb), aabb);
        assert_eq!(Aabb::surrounding(&aabb, &Aabb::EMPTY), aabb);
        assert!(Aabb::EMPTY.is_empty());
        assert!(!aabb.is_empty());
    }

    #[test]
    fn test_aabb_surrounding() {
        let box1 = Aabb::new(Vec3::ZERO, Vec3::splat(5.0));
        let box2 = Aabb::new(Vec3::splat(3.0), Vec3::splat(10.0));
        let surrounding = Aabb::surrounding(&box1, &box2);

        assert_eq!(surrounding.min, Vec3::ZERO);
        assert_eq!(surrounding.max, Vec3::splat(10.0));
    }

    #[test]
    fn test_aabb_padded() {
        let padded = unit_box().padded(0.5);
        assert_eq!(padded.min, Vec3::splat(-1.5));
        assert_eq!(padded.max, Vec3::splat(1.5));
        assert!(Aabb::EMPTY.padded(1.0).is_empty());
    }

    #[test]
    fn test_aabb_encapsulate() {
        let mut aabb = Aabb::EMPTY;
        aabb.encapsulate(Vec3::new(1.0, -2.0, 0.0));
        aabb.encapsulate(Vec3::new(-1.0, 2.0, 0.5));
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 0.5));
    }

    #[test]
    fn test_aabb_hit() {
        let aabb = unit_box();

        // Ray pointing at center
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        assert!(aabb.hit(&ray, 0.0, 100.0));

        // Ray pointing away
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), -Vec3::Z);
        assert!(!aabb.hit(&ray, 0.0, 100.0));

        // Ray missing the box
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::Z);
        assert!(!aabb.hit(&ray, 0.0, 100.0));

        // Box beyond t_max
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        assert!(!aabb.hit(&ray, 0.0, 3.0));
    }

    #[test]
    fn test_aabb_hit_symmetric_in_direction() {
        let aabb = Aabb::new(Vec3::new(-1.0, -2.0, -0.5), Vec3::new(3.0, 1.0, 0.5));
        let directions = [
            Vec3::new(1.0, 0.3, 0.1),
            Vec3::new(0.2, 1.0, -0.4),
            Vec3::new(-0.7, 0.1, 1.0),
        ];

        for dir in directions {
            // Crossing the box in either direction must agree
            let a = Vec3::new(1.0, -0.5, 0.0) - dir * 10.0;
            let b = Vec3::new(1.0, -0.5, 0.0) + dir * 10.0;
            let forward = Ray::new(a, b - a);
            let backward = Ray::new(b, a - b);
            let len = (b - a).length();
            assert!(aabb.hit(&forward, 0.0, len));
            assert!(aabb.hit(&backward, 0.0, len));
        }
    }

    #[test]
    fn test_aabb_hit_axis_parallel_on_slab_plane() {
        // Origin exactly on the x = 1 plane with zero x direction produces
        // 0 * inf = NaN for that slab; a grazing ray counts as a hit
        let aabb = unit_box();
        let grazing = Ray::new(Vec3::new(1.0, 0.0, -5.0), Vec3::Z);
        assert!(aabb.hit(&grazing, 0.0, 100.0));
        let inside = Ray::new(Vec3::new(0.5, 0.0, -5.0), Vec3::Z);
        assert!(aabb.hit(&inside, 0.0, 100.0));
    }

    #[test]
    fn test_aabb_transformed_rotation_grows_box() {
        let aabb = unit_box();
        let rotated = aabb.transformed(&Mat4::from_rotation_y(std::f32::consts::FRAC_PI_4));
        let expected = 2.0_f32.sqrt();
        assert!((rotated.max.x - expected).abs() < 1e-5);
        assert!((rotated.max.z - expected).abs() < 1e-5);
        assert!((rotated.max.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_aabb_transformed_translation() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let moved = aabb.transformed(&Mat4::from_translation(Vec3::splat(5.0)));
        assert!((moved.min - Vec3::splat(5.0)).length() < 1e-5);
        assert!((moved.max - Vec3::splat(6.0)).length() < 1e-5);
    }

    #[test]
    fn test_aabb_transformed_empty_stays_empty() {
        let moved = Aabb::EMPTY.transformed(&Mat4::from_translation(Vec3::ONE));
        assert!(moved.is_empty());
    }

    #[test]
    fn test_aabb_centroid() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::splat(10.0));
        assert_eq!(aabb.centroid(), Vec3::splat(5.0));
        assert_eq!(aabb.size(), Vec3::splat(10.0));
    }
}
