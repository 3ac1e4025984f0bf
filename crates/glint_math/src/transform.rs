// Affine transform with a cached inverse.
//
// Every primitive owns one. The forward matrix is private so the inverse
// can never go stale: the only way to change the matrix is `set_matrix`,
// which recomputes both derived matrices.

use glam::{Mat3, Mat4, Quat, Vec3};

use crate::{Aabb, Direction3, Point3, Ray};

/// A 4x4 affine local-to-world transform plus its cached inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    matrix: Mat4,
    inverse: Mat4,
    normal_matrix: Mat3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        matrix: Mat4::IDENTITY,
        inverse: Mat4::IDENTITY,
        normal_matrix: Mat3::IDENTITY,
    };

    /// Create a transform from a local-to-world matrix.
    pub fn new(matrix: Mat4) -> Self {
        let mut transform = Self::IDENTITY;
        transform.set_matrix(matrix);
        transform
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(Mat4::from_translation(translation))
    }

    pub fn from_scale_rotation_translation(scale: Vec3, rotation: Quat, translation: Vec3) -> Self {
        Self::new(Mat4::from_scale_rotation_translation(scale, rotation, translation))
    }

    /// Rotation from XYZ euler angles in degrees, then translation.
    pub fn from_euler_degrees(rotation: Vec3, translation: Vec3) -> Self {
        let rotation = Quat::from_euler(
            glam::EulerRot::XYZ,
            rotation.x.to_radians(),
            rotation.y.to_radians(),
            rotation.z.to_radians(),
        );
        Self::from_scale_rotation_translation(Vec3::ONE, rotation, translation)
    }

    /// Replace the forward matrix and refresh the cached inverse.
    pub fn set_matrix(&mut self, matrix: Mat4) {
        self.matrix = matrix;
        self.inverse = matrix.inverse();
        self.normal_matrix = Mat3::from_mat4(self.inverse).transpose();
    }

    /// The local-to-world matrix.
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    /// The cached world-to-local matrix.
    pub fn inverse(&self) -> Mat4 {
        self.inverse
    }

    /// Local position of the transform's origin in world space.
    pub fn translation(&self) -> Vec3 {
        self.matrix.w_axis.truncate()
    }

    /// Transform a point (w = 1) from local to world space.
    #[inline]
    pub fn point(&self, p: Point3) -> Point3 {
        self.matrix.transform_point3(p)
    }

    /// Transform a surface normal from local to world space.
    ///
    /// Uses the inverse-transpose so normals stay perpendicular under
    /// non-uniform scale, then renormalizes.
    #[inline]
    pub fn normal(&self, n: Direction3) -> Direction3 {
        (self.normal_matrix * n).normalize_or_zero()
    }

    /// Move a world-space ray into local space.
    #[inline]
    pub fn to_local(&self, ray: &Ray) -> Ray {
        ray.transformed(&self.inverse)
    }

    /// World-space bounding box of a local-space box.
    pub fn aabb(&self, local: &Aabb) -> Aabb {
        local.transformed(&self.matrix)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Mat4> for Transform {
    fn from(matrix: Mat4) -> Self {
        Self::new(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_point_translation() {
        let transform = Transform::from_translation(Vec3::new(10.0, 20.0, 30.0));
        let point = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(transform.point(point), Vec3::new(11.0, 22.0, 33.0));
    }

    #[test]
    fn test_inverse_refreshed_on_set() {
        let mut transform = Transform::from_translation(Vec3::X);
        transform.set_matrix(Mat4::from_rotation_y(PI / 4.0));

        let point = Vec3::new(5.0, 3.0, 2.0);
        let back = transform.inverse().transform_point3(transform.point(point));
        assert!((back - point).length() < 0.001);
    }

    #[test]
    fn test_normal_under_non_uniform_scale() {
        // A 45 degree slope squashed along y: the normal must stay
        // perpendicular to the transformed surface tangent
        let transform = Transform::new(Mat4::from_scale(Vec3::new(1.0, 0.25, 1.0)));
        let tangent = Vec3::new(1.0, -1.0, 0.0).normalize();
        let normal = Vec3::new(1.0, 1.0, 0.0).normalize();

        let world_tangent = transform.matrix().transform_vector3(tangent);
        let world_normal = transform.normal(normal);
        assert!(world_tangent.dot(world_normal).abs() < 1e-5);
        assert!((world_normal.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_normal_matches_rotation() {
        let transform = Transform::from_euler_degrees(Vec3::new(0.0, 90.0, 0.0), Vec3::ONE);
        let n = transform.normal(Vec3::Z);
        let v = transform.matrix().transform_vector3(Vec3::Z);
        assert!((n - v).length() < 1e-5);
    }

    #[test]
    fn test_to_local_ray() {
        let transform = Transform::from_translation(Vec3::new(0.0, 0.0, 10.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let local = transform.to_local(&ray);
        assert!((local.origin() - Vec3::new(0.0, 0.0, -10.0)).length() < 1e-6);
        assert_eq!(local.direction(), Vec3::Z);
    }
}
