// Re-export glam for convenience
pub use glam::*;

// Glint math types
mod aabb;
mod interval;
mod ray;
mod transform;
mod vector;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use transform::Transform;
pub use vector::{Direction3, Point3, Vec3Ext, NEAR_ZERO};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_and_direction_share_representation() {
        let p: Point3 = Vec3::new(1.0, 2.0, 3.0);
        let d: Direction3 = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(p + d, Vec3::new(1.0, 3.0, 3.0));
    }
}
